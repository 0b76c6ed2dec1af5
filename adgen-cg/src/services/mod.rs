//! Business logic services for adgen-cg

pub mod audience_description;
pub mod collaborators;
pub mod concept_generator;
pub mod prompt_builder;
pub mod response_normalizer;
pub mod usage;

pub use audience_description::build_audience_description;
pub use collaborators::{AudienceOwnership, IdentityProvider, SqliteAudienceOwnership, SqliteIdentityProvider};
pub use concept_generator::{
    ConceptGenerator, GenerationOutcome, GenerationRequest, GenerationSettings, RemixRequest,
};
pub use prompt_builder::PromptVariant;
pub use response_normalizer::{normalize_response, ParseStrategy};
pub use usage::{record_usage, recorder_for, SqliteUsageRecorder, TracingUsageRecorder, UsageEvent, UsageRecorder};
