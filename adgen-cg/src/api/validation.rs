//! Request body validation
//!
//! Bodies arrive as loosely typed JSON. Validation walks the value, collects
//! every problem as a [`FieldError`] keyed by JSON path, and only on a clean
//! pass produces the typed request the generator consumes. Demographics are
//! coerced rather than validated (see [`Demographics::from_value`]).

use adgen_common::audience::{Audience, Demographics};
use adgen_common::concept::{CampaignParameters, GeneratedConcept, RemixParameters};
use serde_json::{Map, Value};

use crate::error::FieldError;
use crate::services::{GenerationRequest, RemixRequest};

type Object = Map<String, Value>;

/// Parse a raw body into a JSON object
pub fn parse_body(bytes: &[u8]) -> Result<Object, Vec<FieldError>> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(obj)) => Ok(obj),
        Ok(_) => Err(vec![FieldError::new("body", "must be a JSON object")]),
        Err(e) => Err(vec![FieldError::new("body", format!("invalid JSON: {}", e))]),
    }
}

/// Validate a `POST /api/generate-concept` body
pub fn validate_generate(body: &Object) -> Result<GenerationRequest, Vec<FieldError>> {
    let mut errors = Vec::new();

    let audience = required_audience(body, "audience", &mut errors);

    let mut additional = Vec::new();
    match body.get("additionalAudiences") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                let path = format!("additionalAudiences[{}]", i);
                if let Some(audience) = audience_at(item, &path, &mut errors) {
                    additional.push(audience);
                }
            }
        }
        Some(_) => errors.push(FieldError::new("additionalAudiences", "must be an array")),
    }

    let campaign_type = optional_string(body, "campaignType", &mut errors);
    let tone = optional_string(body, "tone", &mut errors);
    let additional_context = optional_string(body, "additionalContext", &mut errors);

    match audience {
        Some(audience) if errors.is_empty() => {
            let mut request = GenerationRequest::new(
                audience,
                CampaignParameters::new(campaign_type, tone, additional_context),
            );
            request.additional_audiences = additional;
            Ok(request)
        }
        _ => Err(errors),
    }
}

/// Validate a `POST /api/remix-concept` body
pub fn validate_remix(body: &Object) -> Result<RemixRequest, Vec<FieldError>> {
    let mut errors = Vec::new();

    let original = match body.get("originalConcept") {
        Some(Value::Object(concept)) => {
            let title = required_string(concept, "title", "originalConcept.title", &mut errors);
            let description =
                required_string(concept, "description", "originalConcept.description", &mut errors);
            title.zip(description).map(|(t, d)| GeneratedConcept::new(t, d))
        }
        None | Some(Value::Null) => {
            errors.push(FieldError::new("originalConcept", "is required"));
            None
        }
        Some(_) => {
            errors.push(FieldError::new("originalConcept", "must be an object"));
            None
        }
    };

    let audience = required_audience(body, "audience", &mut errors);
    let instructions = optional_string(body, "remixInstructions", &mut errors);

    match (original, audience) {
        (Some(original), Some(audience)) if errors.is_empty() => Ok(RemixRequest {
            audience,
            remix: RemixParameters::new(original, instructions),
        }),
        _ => Err(errors),
    }
}

fn required_audience(body: &Object, key: &str, errors: &mut Vec<FieldError>) -> Option<Audience> {
    match body.get(key) {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(key, "is required"));
            None
        }
        Some(value) => audience_at(value, key, errors),
    }
}

fn audience_at(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<Audience> {
    let Value::Object(obj) = value else {
        errors.push(FieldError::new(path, "must be an object"));
        return None;
    };

    let id = required_string(obj, "id", &format!("{}.id", path), errors);
    let name = required_string(obj, "name", &format!("{}.name", path), errors);

    let demographics = obj
        .get("demographics")
        .map(Demographics::from_value)
        .unwrap_or_default();

    Some(Audience::new(id?, name?).with_demographics(demographics))
}

/// Non-blank string, kept verbatim
fn required_string(
    obj: &Object,
    key: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::String(_)) => {
            errors.push(FieldError::new(path, "must not be empty"));
            None
        }
        None | Some(Value::Null) => {
            errors.push(FieldError::new(path, "is required"));
            None
        }
        Some(_) => {
            errors.push(FieldError::new(path, "must be a string"));
            None
        }
    }
}

/// Absent, null, and blank all mean "use the default"
fn optional_string(obj: &Object, key: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(key, "must be a string"));
            None
        }
    }
}
