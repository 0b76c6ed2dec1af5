//! Response normalizer
//!
//! Turns raw model output into a [`GeneratedConcept`]. Models asked for bare
//! JSON still wrap it in prose, fence it, or emit something almost-JSON, so
//! the parse runs as a cascade where the first strategy that succeeds wins:
//!
//! 1. **Direct**: the trimmed text is a JSON object with a `title` or `description` string
//! 2. **Embedded**: the greedy span from the first `{` to the last `}` is such an object
//! 3. **Field patterns**: quoted `title` and `description` values found by regex (both required)
//! 4. **Heuristic**: first line becomes the title, the remaining lines the description
//!
//! The heuristic tier always succeeds, and [`normalize_response`] then
//! substitutes placeholders for anything still empty, so normalization is a
//! total function.

use adgen_common::concept::GeneratedConcept;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;

use super::prompt_builder::TITLE_MAX_CHARS;

/// Title used when nothing usable was extracted
pub const PLACEHOLDER_TITLE: &str = "Generated Marketing Concept";
/// Description used when nothing usable was extracted
pub const PLACEHOLDER_DESCRIPTION: &str = "No description provided.";

static TITLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)title["']*\s*:\s*["'](.*?)["']"#).expect("valid title regex"));

static DESCRIPTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)description["']*\s*:\s*["'](.*?)["']\s*[,}]"#)
        .expect("valid description regex")
});

/// Cascade tier that produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    Direct,
    Embedded,
    FieldPattern,
    Heuristic,
}

impl fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseStrategy::Direct => "direct",
            ParseStrategy::Embedded => "embedded",
            ParseStrategy::FieldPattern => "field_pattern",
            ParseStrategy::Heuristic => "heuristic",
        };
        f.write_str(name)
    }
}

/// Cascade output before placeholder substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCandidate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub strategy: ParseStrategy,
}

impl ParsedCandidate {
    /// Apply the final placeholder substitution
    pub fn into_concept(self) -> GeneratedConcept {
        GeneratedConcept {
            title: non_empty(self.title).unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
            description: non_empty(self.description)
                .unwrap_or_else(|| PLACEHOLDER_DESCRIPTION.to_string()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Normalize raw model output. Never fails; both fields are always non-empty.
pub fn normalize_response(raw: &str) -> (GeneratedConcept, ParseStrategy) {
    let candidate = parse_candidate(raw);
    let strategy = candidate.strategy;
    (candidate.into_concept(), strategy)
}

/// Run the parse cascade
pub fn parse_candidate(raw: &str) -> ParsedCandidate {
    if let Some((title, description)) = parse_json_object(raw.trim()) {
        return ParsedCandidate {
            title,
            description,
            strategy: ParseStrategy::Direct,
        };
    }

    tracing::debug!("Direct JSON parse failed, trying embedded object");

    if let Some((title, description)) = embedded_object_span(raw).and_then(parse_json_object) {
        return ParsedCandidate {
            title,
            description,
            strategy: ParseStrategy::Embedded,
        };
    }

    if let Some((title, description)) = match_field_patterns(raw) {
        return ParsedCandidate {
            title: Some(title),
            description: Some(description),
            strategy: ParseStrategy::FieldPattern,
        };
    }

    tracing::warn!(
        raw_len = raw.len(),
        "Could not extract title and description from model response, using heuristic"
    );

    let (title, description) = heuristic_fields(raw);
    ParsedCandidate {
        title: Some(title),
        description: Some(description),
        strategy: ParseStrategy::Heuristic,
    }
}

/// Parse `text` as a JSON object with string `title`/`description` fields
///
/// The object counts only when at least one of the two is a non-empty string;
/// otherwise the later tiers get a chance at it. A missing partner field is
/// left for placeholder substitution.
fn parse_json_object(text: &str) -> Option<(Option<String>, Option<String>)> {
    let value: Value = serde_json::from_str(text).ok()?;
    let obj = value.as_object()?;

    let field = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string)
    };
    let (title, description) = (field("title"), field("description"));
    (title.is_some() || description.is_some()).then_some((title, description))
}

fn embedded_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

fn match_field_patterns(raw: &str) -> Option<(String, String)> {
    let title = TITLE_PATTERN.captures(raw)?.get(1)?.as_str().trim().to_string();
    let description = DESCRIPTION_PATTERN
        .captures(raw)?
        .get(1)?
        .as_str()
        .trim()
        .to_string();
    Some((title, description))
}

fn heuristic_fields(raw: &str) -> (String, String) {
    let lines: Vec<&str> = raw.lines().filter(|line| !line.trim().is_empty()).collect();

    let title: String = lines
        .first()
        .map(|line| strip_chars(line, &['{', '}', '"', '\'', ':', ',']))
        .map(|line| line.trim().chars().take(TITLE_MAX_CHARS).collect())
        .unwrap_or_default();
    let title = if title.trim().is_empty() {
        PLACEHOLDER_TITLE.to_string()
    } else {
        title
    };

    let rest = lines.iter().skip(1).copied().collect::<Vec<_>>().join(" ");
    let description = strip_chars(&rest, &['{', '}', '"', '\'']).trim().to_string();
    let description = if description.is_empty() {
        raw.trim().to_string()
    } else {
        description
    };

    (title, description)
}

fn strip_chars(text: &str, chars: &[char]) -> String {
    text.chars().filter(|c| !chars.contains(c)).collect()
}
