//! The model's JSON answer and the accept/reject decision built from it.

use granthub_core::{extract_deadline, parse_deadline, Deadline, RawListing};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::amount::parse_amount;
use crate::error::FilterError;

/// Highest score the model is asked to give.
pub const MAX_SCORE: i32 = 5;

/// The JSON object the model is instructed to return.
///
/// Free-text fields also accept numbers and lists; booleans read as absent.
/// `score` also accepts a quoted number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelAssessment {
    pub relevant: bool,
    #[serde(deserialize_with = "lenient_score")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub deadline: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub eligibility: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub funder: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reason: Option<String>,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        // `false` is how models sometimes say "none".
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(scalar_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        other => scalar_text(other),
    })
}

fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom(format!("score {n} is not representable"))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("score {s:?} is not a number"))),
        other => Err(de::Error::custom(format!("score must be a number, got {other}"))),
    }
}

/// Structured fields pulled out of an accepted listing. Every field is
/// best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedFields {
    pub deadline: Deadline,
    pub amount_text: Option<String>,
    pub amount_value: Option<Decimal>,
    pub eligibility: Option<String>,
    /// Funder named by the model; `None` leaves the listing's own hint in place.
    pub funder: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted { fields: ExtractedFields, score: i32 },
    Rejected { reason: String },
}

impl Verdict {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}

/// Parse the model's text into a [`ModelAssessment`].
///
/// Tolerates Markdown code fences and prose around the object.
///
/// # Errors
///
/// Returns [`FilterError::MalformedResponse`] when no JSON object with the
/// required fields can be found.
pub fn parse_model_text(text: &str) -> Result<ModelAssessment, FilterError> {
    let stripped = strip_code_fence(text);

    if let Ok(parsed) = serde_json::from_str::<ModelAssessment>(stripped) {
        return Ok(parsed);
    }

    let (Some(start), Some(end)) = (stripped.find('{'), stripped.rfind('}')) else {
        return Err(FilterError::MalformedResponse(format!(
            "no JSON object in model output: {}",
            preview(text)
        )));
    };
    if end < start {
        return Err(FilterError::MalformedResponse(format!(
            "no JSON object in model output: {}",
            preview(text)
        )));
    }

    serde_json::from_str::<ModelAssessment>(&stripped[start..=end]).map_err(|e| {
        FilterError::MalformedResponse(format!("{e}; model output: {}", preview(text)))
    })
}

/// Turn an assessment into a verdict.
///
/// Accepts only when the model says relevant and the score reaches
/// `threshold`. Deadlines the model could not supply fall back to the
/// listing's deadline hint, then its snippet.
#[must_use]
pub fn decide(assessment: &ModelAssessment, listing: &RawListing, threshold: i32) -> Verdict {
    let score = clamp_score(assessment.score);

    if !assessment.relevant {
        let reason = non_empty(assessment.reason.as_deref())
            .unwrap_or_else(|| "not relevant".to_string());
        return Verdict::Rejected { reason };
    }

    if score < threshold {
        return Verdict::Rejected {
            reason: format!("score {score} below threshold {threshold}"),
        };
    }

    let deadline = match assessment.deadline.as_deref().map(parse_deadline) {
        Some(known @ Deadline::Known(_)) => known,
        _ => fallback_deadline(listing),
    };

    let amount_text = non_empty(assessment.amount.as_deref());
    let amount_value = amount_text.as_deref().and_then(parse_amount);

    Verdict::Accepted {
        fields: ExtractedFields {
            deadline,
            amount_text,
            amount_value,
            eligibility: non_empty(assessment.eligibility.as_deref()),
            funder: non_empty(assessment.funder.as_deref()),
            reason: non_empty(assessment.reason.as_deref()),
        },
        score,
    }
}

fn fallback_deadline(listing: &RawListing) -> Deadline {
    match listing.deadline_hint.as_deref().map(parse_deadline) {
        Some(known @ Deadline::Known(_)) => known,
        _ => extract_deadline(&listing.snippet),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn clamp_score(raw: f64) -> i32 {
    if raw.is_nan() {
        return 0;
    }
    // Clamped first, so the cast cannot overflow.
    raw.round().clamp(0.0, f64::from(MAX_SCORE)) as i32
}

/// Trimmed text, or `None` for blanks and the placeholders models use for "no value".
fn non_empty(value: Option<&str>) -> Option<String> {
    let v = value?.trim();
    if v.is_empty()
        || ["null", "none", "unknown", "n/a", "not specified"]
            .iter()
            .any(|p| v.eq_ignore_ascii_case(p))
    {
        None
    } else {
        Some(v.to_string())
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().trim_end_matches("```").trim()
}

fn preview(text: &str) -> String {
    const MAX: usize = 120;
    let mut out: String = text.chars().take(MAX).collect();
    if text.chars().count() > MAX {
        out.push('…');
    }
    out
}

#[cfg(test)]
#[path = "verdict_test.rs"]
mod tests;
