//! Locates and parses the summary record embedded in the calculator's answer.
//!
//! Two strategies exist. [`ParseStrategy::DelimiterTagged`] reads the text
//! between `<JSON_OUTPUT>` and `</JSON_OUTPUT>` and is the default.
//! [`ParseStrategy::LegacyBraceMatch`] takes everything from the first `{` to
//! the last `}`; any brace in the surrounding commentary corrupts the candidate,
//! so it is kept only for answers produced with the older prompt.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    core::errors::{AppError, AppResult},
    tax::summary::TaxSummary,
};

pub const JSON_OUTPUT_START: &str = "<JSON_OUTPUT>";
pub const JSON_OUTPUT_END: &str = "</JSON_OUTPUT>";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    #[default]
    DelimiterTagged,
    /// Deprecated: kept only to read answers produced with the older prompt.
    LegacyBraceMatch,
}

impl ParseStrategy {
    pub fn from_config(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "delimited" | "delimiter" | "delimiter_tagged" | "tagged" => Some(Self::DelimiterTagged),
            "legacy" | "brace" | "legacy_brace_match" => Some(Self::LegacyBraceMatch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DelimiterTagged => "delimited",
            Self::LegacyBraceMatch => "legacy",
        }
    }
}

/// Candidate record text, or `None` when the strategy finds no region.
pub fn locate_candidate(text: &str, strategy: ParseStrategy) -> Option<&str> {
    match strategy {
        ParseStrategy::DelimiterTagged => delimited_candidate(text),
        ParseStrategy::LegacyBraceMatch => brace_candidate(text),
    }
}

fn delimited_candidate(text: &str) -> Option<&str> {
    let start = text.find(JSON_OUTPUT_START)? + JSON_OUTPUT_START.len();
    let rest = &text[start..];
    let end = rest.find(JSON_OUTPUT_END)?;
    Some(rest[..end].trim())
}

fn brace_candidate(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_tax_summary(text: &str, strategy: ParseStrategy) -> AppResult<TaxSummary> {
    let candidate = locate_candidate(text, strategy).ok_or_else(|| {
        summary_error(
            format!(
                "no structured block found using the {} strategy",
                strategy.as_str()
            ),
            text,
        )
    })?;
    debug!(
        strategy = strategy.as_str(),
        candidate_len = candidate.len(),
        "located summary candidate"
    );

    let value: Value = serde_json::from_str(candidate)
        .map_err(|err| summary_error(format!("candidate is not valid JSON: {err}"), text))?;
    if !value.is_object() {
        return Err(summary_error(
            "candidate is not a JSON object".to_string(),
            text,
        ));
    }
    serde_json::from_value(value)
        .map_err(|err| summary_error(format!("unexpected summary shape: {err}"), text))
}

fn summary_error(reason: String, raw: &str) -> AppError {
    AppError::SummaryParse {
        reason,
        raw_response: raw.to_string(),
    }
}
