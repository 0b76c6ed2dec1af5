//! Audience description builder
//!
//! Renders an [`Audience`] as a single `" | "`-delimited line of labelled
//! segments for prompt construction. Segment order is fixed; absent fields
//! contribute nothing, so an audience with only a name renders as
//! `Name: <name>`.

use adgen_common::audience::{AgeRange, Audience, ALL_GENDERS};

const SEGMENT_DELIMITER: &str = " | ";

/// Build the human-readable audience summary
pub fn build_audience_description(audience: &Audience) -> String {
    let demo = &audience.demographics;
    let mut parts: Vec<String> = Vec::with_capacity(16);

    parts.push(format!("Name: {}", audience.name));

    if let Some(age) = demo.age_range.as_ref().and_then(format_age) {
        parts.push(format!("Age: {}", age));
    }

    if let Some(gender) = &demo.gender {
        if !gender.iter().any(|g| g == ALL_GENDERS) {
            push_list(&mut parts, "Gender", Some(gender));
        }
    }

    if let Some(location) = &demo.location {
        if let Some(location_type) = location.location_type {
            parts.push(format!("Location: {} areas", location_type));
        }
        push_list(&mut parts, "Regions", location.regions.as_ref());
    }

    push_list(&mut parts, "Education", demo.education.as_ref());
    push_list(&mut parts, "Income", demo.income_level.as_ref());

    // Interests and lifestyle
    push_list(&mut parts, "Interests", demo.interests.as_ref());
    push_list(&mut parts, "Hobbies", demo.hobbies.as_ref());
    push_list(&mut parts, "Favorite Brands", demo.brands_they_love.as_ref());

    // Behavior
    push_list(&mut parts, "Shopping Behavior", demo.shopping_behavior.as_ref());
    push_list(&mut parts, "Media Consumption", demo.media_consumption.as_ref());
    push_list(&mut parts, "Technology Usage", demo.tech_usage.as_ref());

    // Psychology
    push_list(&mut parts, "Pain Points", demo.pain_points.as_ref());
    push_list(&mut parts, "Goals/Aspirations", demo.aspirations.as_ref());

    if let Some(notes) = demo.additional_notes.as_deref().filter(|n| !n.is_empty()) {
        parts.push(format!("Additional Notes: {}", notes));
    }

    parts.join(SEGMENT_DELIMITER)
}

fn format_age(range: &AgeRange) -> Option<String> {
    match (range.min, range.max) {
        (Some(min), Some(max)) => Some(format!("{}-{} years old", min, max)),
        (Some(min), None) => Some(format!("{}+ years old", min)),
        (None, Some(max)) => Some(format!("under {} years old", max)),
        (None, None) => None,
    }
}

fn push_list(parts: &mut Vec<String>, label: &str, values: Option<&Vec<String>>) {
    if let Some(values) = values.filter(|v| !v.is_empty()) {
        parts.push(format!("{}: {}", label, values.join(", ")));
    }
}
