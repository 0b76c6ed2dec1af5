//! Concept generation service
//!
//! Orchestrates one generation or remix: describe the audience, build the
//! prompt, make a single model call with a bounded wait, normalize the reply.
//! Any invocation failure (network, timeout, non-2xx, empty completion) is
//! absorbed here and replaced with a deterministic fallback concept, so
//! [`ConceptGenerator::generate`] and [`ConceptGenerator::remix`] never fail.
//! There are no retries: one attempt, then fallback.
//!
//! Ownership of the audience is a precondition checked by the caller.

use adgen_common::audience::Audience;
use adgen_common::concept::{CampaignParameters, GeneratedConcept, RemixParameters};
use adgen_common::config::LlmConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::audience_description::build_audience_description;
use super::prompt_builder::{build_generation_prompt, build_remix_prompt, PromptVariant, SYSTEM_ROLE};
use super::response_normalizer::{normalize_response, ParseStrategy};
use crate::llm::{CompletionClient, CompletionRequest, LlmError};

const REMIX_FALLBACK_NOTE: &str =
    "This is a remixed version incorporating fresh ideas and approaches for the target audience.";

/// Sampling and budget settings, fixed at construction time
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub generation_temperature: f32,
    pub remix_temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on one model invocation
    pub request_timeout: Duration,
}

impl GenerationSettings {
    pub fn from_llm_config(config: &LlmConfig) -> Self {
        Self {
            generation_temperature: config.generation_temperature,
            remix_temperature: config.remix_temperature,
            max_tokens: config.max_tokens,
            request_timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn temperature(&self, variant: PromptVariant) -> f32 {
        match variant {
            PromptVariant::Generate => self.generation_temperature,
            PromptVariant::Remix => self.remix_temperature,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from_llm_config(&LlmConfig::default())
    }
}

/// Input for a fresh concept
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Audience the prompt is built from
    pub audience: Audience,
    /// Further audiences the concept should also target
    pub additional_audiences: Vec<Audience>,
    pub campaign: CampaignParameters,
}

impl GenerationRequest {
    pub fn new(audience: Audience, campaign: CampaignParameters) -> Self {
        Self {
            audience,
            additional_audiences: Vec::new(),
            campaign,
        }
    }

    /// Primary audience first, then the additional ones
    pub fn audiences(&self) -> impl Iterator<Item = &Audience> {
        std::iter::once(&self.audience).chain(self.additional_audiences.iter())
    }

    /// Additional context including the multi-audience note when relevant
    fn effective_context(&self) -> String {
        let context = self.campaign.additional_context.trim();
        if self.additional_audiences.is_empty() {
            return context.to_string();
        }

        let names: Vec<&str> = self.audiences().map(|a| a.name.as_str()).collect();
        let note = format!("Target multiple audiences: {}", names.join(", "));
        if context.is_empty() {
            note
        } else {
            format!("{}\n\n{}", context, note)
        }
    }
}

/// Input for a remix
#[derive(Debug, Clone)]
pub struct RemixRequest {
    pub audience: Audience,
    pub remix: RemixParameters,
}

/// Result of one generation or remix
///
/// Only `concept` is part of the external contract; the rest is diagnostic
/// and snapshot material for the caller.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub concept: GeneratedConcept,
    pub variant: PromptVariant,
    /// True when the fallback concept was substituted
    pub degraded: bool,
    /// Cascade tier used; `None` for fallback concepts
    pub strategy: Option<ParseStrategy>,
    /// Audience records used, for building immutable snapshots
    pub audiences: Vec<Audience>,
}

/// Concept generation service
pub struct ConceptGenerator {
    client: Arc<dyn CompletionClient>,
    settings: GenerationSettings,
}

impl ConceptGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, settings: GenerationSettings) -> Self {
        Self { client, settings }
    }

    /// Generate a concept for the request's audiences
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let description = build_audience_description(&request.audience);
        let prompt = build_generation_prompt(
            &description,
            &request.campaign.campaign_type,
            &request.campaign.tone,
            &request.effective_context(),
        );

        let audiences: Vec<Audience> = request.audiences().cloned().collect();

        match self.invoke(PromptVariant::Generate, prompt).await {
            Ok(raw) => Self::normalized(PromptVariant::Generate, &raw, audiences),
            Err(e) => {
                warn!(
                    audience_id = %request.audience.id,
                    error = %e,
                    "Concept generation failed, returning fallback concept"
                );
                GenerationOutcome {
                    concept: generation_fallback(&request.audience, &description),
                    variant: PromptVariant::Generate,
                    degraded: true,
                    strategy: None,
                    audiences,
                }
            }
        }
    }

    /// Produce a variation of an existing concept
    pub async fn remix(&self, request: &RemixRequest) -> GenerationOutcome {
        let description = build_audience_description(&request.audience);
        let prompt = build_remix_prompt(
            &request.remix.original,
            &description,
            &request.remix.instructions,
        );

        let audiences = vec![request.audience.clone()];

        match self.invoke(PromptVariant::Remix, prompt).await {
            Ok(raw) => Self::normalized(PromptVariant::Remix, &raw, audiences),
            Err(e) => {
                warn!(
                    audience_id = %request.audience.id,
                    error = %e,
                    "Concept remix failed, returning fallback concept"
                );
                GenerationOutcome {
                    concept: remix_fallback(&request.remix.original),
                    variant: PromptVariant::Remix,
                    degraded: true,
                    strategy: None,
                    audiences,
                }
            }
        }
    }

    async fn invoke(&self, variant: PromptVariant, prompt: String) -> Result<String, LlmError> {
        let request = CompletionRequest {
            system: SYSTEM_ROLE.to_string(),
            prompt,
            temperature: self.settings.temperature(variant),
            max_tokens: self.settings.max_tokens,
        };

        let started = Instant::now();
        let result = tokio::time::timeout(self.settings.request_timeout, self.client.complete(&request))
            .await
            .map_err(|_| LlmError::Timeout(self.settings.request_timeout))?;

        info!(
            variant = %variant,
            model = self.client.model(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "Model invocation finished"
        );

        result
    }

    fn normalized(variant: PromptVariant, raw: &str, audiences: Vec<Audience>) -> GenerationOutcome {
        let (concept, strategy) = normalize_response(raw);
        if strategy != ParseStrategy::Direct {
            info!(variant = %variant, strategy = %strategy, "Model response needed repair");
        }

        GenerationOutcome {
            concept,
            variant,
            degraded: false,
            strategy: Some(strategy),
            audiences,
        }
    }
}

/// Deterministic fallback for a failed generation
pub fn generation_fallback(audience: &Audience, audience_description: &str) -> GeneratedConcept {
    GeneratedConcept {
        title: format!("Campaign for {}", audience.name),
        description: format!(
            "A targeted marketing campaign designed for {}. This concept focuses on reaching the audience through their preferred channels and addressing their specific interests and pain points.",
            audience_description
        ),
    }
}

/// Deterministic fallback for a failed remix
pub fn remix_fallback(original: &GeneratedConcept) -> GeneratedConcept {
    GeneratedConcept {
        title: format!("{} - Remix", original.title),
        description: format!("{}\n\n{}", original.description, REMIX_FALLBACK_NOTE),
    }
}
