//! Marketing concept and campaign parameter types

use serde::{Deserialize, Serialize};

pub const DEFAULT_CAMPAIGN_TYPE: &str = "general marketing campaign";
pub const DEFAULT_TONE: &str = "engaging and persuasive";
pub const DEFAULT_REMIX_INSTRUCTIONS: &str = "Create a variation with a fresh perspective";

/// Generated (or original) concept payload: the unit the concept store persists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedConcept {
    /// Intended to stay within 60 characters; not enforced after generation
    pub title: String,
    pub description: String,
}

impl GeneratedConcept {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Per-request campaign parameters for generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignParameters {
    pub campaign_type: String,
    pub tone: String,
    /// Empty means "no additional context"
    pub additional_context: String,
}

impl CampaignParameters {
    /// Build parameters, substituting defaults for absent values
    pub fn new(
        campaign_type: Option<String>,
        tone: Option<String>,
        additional_context: Option<String>,
    ) -> Self {
        Self {
            campaign_type: campaign_type.unwrap_or_else(|| DEFAULT_CAMPAIGN_TYPE.to_string()),
            tone: tone.unwrap_or_else(|| DEFAULT_TONE.to_string()),
            additional_context: additional_context.unwrap_or_default(),
        }
    }
}

impl Default for CampaignParameters {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

/// Per-request remix parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemixParameters {
    pub original: GeneratedConcept,
    pub instructions: String,
}

impl RemixParameters {
    pub fn new(original: GeneratedConcept, instructions: Option<String>) -> Self {
        Self {
            original,
            instructions: instructions
                .unwrap_or_else(|| DEFAULT_REMIX_INSTRUCTIONS.to_string()),
        }
    }
}
