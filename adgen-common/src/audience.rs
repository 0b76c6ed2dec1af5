//! Audience records
//!
//! An audience is a named, entirely optional bag of demographic and
//! psychographic fields. Stores and request payloads carry the demographics as
//! loosely typed JSON; [`Demographics::from_value`] coerces that JSON into the
//! typed record so downstream code never sees a malformed field.
//!
//! Invariant: every list field is either `None` or non-empty, and every string
//! field is either `None` or non-blank.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Gender value meaning "no gender filter"
pub const ALL_GENDERS: &str = "All genders";

/// Audience record as consumed by concept generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audience {
    /// Opaque audience identifier (owned by the audience store)
    pub id: String,
    /// Short display name
    pub name: String,
    /// Demographic/psychographic profile
    #[serde(default)]
    pub demographics: Demographics,
}

impl Audience {
    /// Create an audience with an empty demographics bag
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            demographics: Demographics::default(),
        }
    }

    /// Replace the demographics bag
    pub fn with_demographics(mut self, demographics: Demographics) -> Self {
        self.demographics = demographics;
        self
    }
}

/// Age bounds; either or both may be absent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl AgeRange {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Settlement type of an audience's location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Urban,
    Suburban,
    Rural,
    Mixed,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Urban => "urban",
            LocationType::Suburban => "suburban",
            LocationType::Rural => "rural",
            LocationType::Mixed => "mixed",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "urban" => Ok(LocationType::Urban),
            "suburban" => Ok(LocationType::Suburban),
            "rural" => Ok(LocationType::Rural),
            "mixed" => Ok(LocationType::Mixed),
            other => Err(format!("unknown location type: {}", other)),
        }
    }
}

/// Location details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<LocationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    /// Carried for snapshots; not rendered into prompts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<String>>,
}

impl Location {
    pub fn is_empty(&self) -> bool {
        self.location_type.is_none() && self.regions.is_none() && self.countries.is_none()
    }
}

/// Demographics bag. All fields independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<AgeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_level: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hobbies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brands_they_love: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shopping_behavior: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_consumption: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_usage: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain_points: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspirations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

impl Demographics {
    /// Coerce loosely typed JSON into a typed demographics record
    ///
    /// Never fails. Fields of the wrong type are dropped, list entries that are
    /// not non-blank strings are dropped, empty lists and blank strings become
    /// `None`, and unknown location types are ignored. A non-object value
    /// (including `null`) yields an empty record.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            age_range: coerce_age_range(obj.get("age_range")),
            gender: string_list(obj, "gender"),
            location: coerce_location(obj.get("location")),
            education: string_list(obj, "education"),
            income_level: string_list(obj, "income_level"),
            interests: string_list(obj, "interests"),
            hobbies: string_list(obj, "hobbies"),
            brands_they_love: string_list(obj, "brands_they_love"),
            shopping_behavior: string_list(obj, "shopping_behavior"),
            media_consumption: string_list(obj, "media_consumption"),
            tech_usage: string_list(obj, "tech_usage"),
            pain_points: string_list(obj, "pain_points"),
            aspirations: string_list(obj, "aspirations"),
            additional_notes: obj.get("additional_notes").and_then(non_blank_string),
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn non_blank_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn coerce_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items: Vec<String> = match value? {
        Value::Array(items) => items.iter().filter_map(non_blank_string).collect(),
        // A bare string is treated as a one-element list
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => return None,
    };

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    coerce_list(obj.get(key))
}

fn coerce_integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_age_range(value: Option<&Value>) -> Option<AgeRange> {
    let obj = value?.as_object()?;
    let range = AgeRange {
        min: coerce_integer(obj.get("min")),
        max: coerce_integer(obj.get("max")),
    };

    if range.is_empty() {
        None
    } else {
        Some(range)
    }
}

fn coerce_location(value: Option<&Value>) -> Option<Location> {
    let obj = value?.as_object()?;
    let location = Location {
        location_type: obj
            .get("type")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok()),
        regions: string_list(obj, "regions"),
        countries: string_list(obj, "countries"),
    };

    if location.is_empty() {
        None
    } else {
        Some(location)
    }
}
