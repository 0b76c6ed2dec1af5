//! Prompt templates for concept generation and remixing
//!
//! Both variants share the system role and the JSON-only output contract so
//! the response normalizer sees the same shape regardless of variant.

use adgen_common::concept::GeneratedConcept;
use std::fmt;

/// System role shared by both prompt variants
pub const SYSTEM_ROLE: &str = "You are an expert marketing strategist. You must respond ONLY with valid JSON containing 'title' and 'description' fields. No other text, explanations, or formatting allowed. Always start with { and end with }.";

/// Maximum title length requested from the model
pub const TITLE_MAX_CHARS: usize = 60;

/// Which pipeline a prompt belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptVariant {
    Generate,
    Remix,
}

impl PromptVariant {
    /// Operation name used in usage logs
    pub fn operation(&self) -> &'static str {
        match self {
            PromptVariant::Generate => "concept_generation",
            PromptVariant::Remix => "concept_remix",
        }
    }
}

impl fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptVariant::Generate => f.write_str("generate"),
            PromptVariant::Remix => f.write_str("remix"),
        }
    }
}

fn output_contract(variant: PromptVariant) -> String {
    let (title, description) = match variant {
        PromptVariant::Generate => ("Your title here", "Your detailed description here"),
        PromptVariant::Remix => ("Your new title here", "Your new detailed description here"),
    };

    format!(
        "IMPORTANT: You must respond with ONLY valid JSON in this exact format:\n\
         {{\n  \"title\": \"{}\",\n  \"description\": \"{}\"\n}}\n\n\
         Do not include any other text, explanations, or markdown formatting. Only return the JSON object.",
        title, description
    )
}

/// Build the instruction for a fresh concept
pub fn build_generation_prompt(
    audience_description: &str,
    campaign_type: &str,
    tone: &str,
    additional_context: &str,
) -> String {
    let mut prompt = format!(
        "Generate a marketing concept for {} with a {} tone.\n\nTarget Audience: {}\n\n",
        campaign_type, tone, audience_description
    );

    if !additional_context.trim().is_empty() {
        prompt.push_str(&format!("Additional Context: {}\n\n", additional_context));
    }

    prompt.push_str(&format!(
        "Please provide:\n\
         1. A catchy, memorable title for the marketing concept (max {} characters)\n\
         2. A detailed description of the marketing concept including:\n\
         \x20  - Key messaging strategy\n\
         \x20  - Recommended channels/platforms\n\
         \x20  - Creative direction suggestions\n\
         \x20  - Call-to-action recommendations\n\
         \x20  - Why this concept resonates with the target audience\n\n",
        TITLE_MAX_CHARS
    ));

    prompt.push_str(&output_contract(PromptVariant::Generate));
    prompt
}

/// Build the instruction for remixing an existing concept
pub fn build_remix_prompt(
    original: &GeneratedConcept,
    audience_description: &str,
    remix_instructions: &str,
) -> String {
    format!(
        "Remix and improve this existing marketing concept:\n\n\
         Original Title: {}\n\
         Original Description: {}\n\n\
         Target Audience: {}\n\
         Remix Instructions: {}\n\n\
         Create a new variation that:\n\
         - Maintains the core appeal but offers a fresh angle\n\
         - Better resonates with the target audience\n\
         - Incorporates new creative elements or approaches\n\n\
         {}",
        original.title,
        original.description,
        audience_description,
        remix_instructions,
        output_contract(PromptVariant::Remix)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_prompt_contents() {
        let prompt = build_generation_prompt(
            "Name: Gamers | Age: 18-25 years old",
            "product launch",
            "playful",
            "",
        );

        assert!(prompt.starts_with("Generate a marketing concept for product launch with a playful tone."));
        assert!(prompt.contains("Target Audience: Name: Gamers | Age: 18-25 years old"));
        assert!(!prompt.contains("Additional Context"));
        assert!(prompt.contains("(max 60 characters)"));
        for expectation in [
            "Key messaging strategy",
            "Recommended channels/platforms",
            "Creative direction suggestions",
            "Call-to-action recommendations",
            "Why this concept resonates with the target audience",
        ] {
            assert!(prompt.contains(expectation), "missing: {}", expectation);
        }
        assert!(prompt.contains("\"title\": \"Your title here\""));
        assert!(prompt.contains("Do not include any other text, explanations, or markdown formatting."));
    }

    #[test]
    fn test_generation_prompt_additional_context_block() {
        let prompt = build_generation_prompt("Name: X", "c", "t", "Holiday season push");
        assert!(prompt.contains("Additional Context: Holiday season push\n\n"));

        let blank = build_generation_prompt("Name: X", "c", "t", "   ");
        assert!(!blank.contains("Additional Context"));
    }

    #[test]
    fn test_remix_prompt_contents() {
        let original = GeneratedConcept::new("Level Up Your Weekend", "A gaming-night campaign.");
        let prompt = build_remix_prompt(&original, "Name: Gamers", "Make it retro");

        assert!(prompt.contains("Original Title: Level Up Your Weekend"));
        assert!(prompt.contains("Original Description: A gaming-night campaign."));
        assert!(prompt.contains("Target Audience: Name: Gamers"));
        assert!(prompt.contains("Remix Instructions: Make it retro"));
        assert!(prompt.contains("- Maintains the core appeal but offers a fresh angle"));
        assert!(prompt.contains("- Better resonates with the target audience"));
        assert!(prompt.contains("- Incorporates new creative elements or approaches"));
        assert!(prompt.contains("\"title\": \"Your new title here\""));
        assert!(prompt.ends_with("Only return the JSON object."));
    }

    #[test]
    fn test_system_role_demands_bare_json() {
        assert!(SYSTEM_ROLE.contains("expert marketing strategist"));
        assert!(SYSTEM_ROLE.contains("'title' and 'description'"));
        assert!(SYSTEM_ROLE.contains("Always start with { and end with }"));
    }

    #[test]
    fn test_variant_operation_names() {
        assert_eq!(PromptVariant::Generate.operation(), "concept_generation");
        assert_eq!(PromptVariant::Remix.operation(), "concept_remix");
        assert_eq!(PromptVariant::Remix.to_string(), "remix");
    }
}
