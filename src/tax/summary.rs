use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tax::{
    amount::{lenient_number, lenient_text},
    document::DeductionEntry,
    lenient::{scalar_text, Lenient},
};

/// Collapses runs of whitespace and lowercases, for label comparison.
fn normalized_label(raw: &Value) -> Option<String> {
    scalar_text(raw).map(|text| {
        text.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase()
    })
}

/// Display text of a label the model produced, whatever its JSON type.
fn label_text(raw: &Value) -> String {
    scalar_text(raw).unwrap_or_else(|| raw.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Regime {
    Old,
    New,
    /// Any other label, kept exactly as the model sent it.
    Other(Value),
}

impl Regime {
    pub fn label(&self) -> String {
        match self {
            Self::Old => "Old".to_string(),
            Self::New => "New".to_string(),
            Self::Other(raw) => label_text(raw),
        }
    }
}

impl From<Value> for Regime {
    fn from(raw: Value) -> Self {
        match normalized_label(&raw).as_deref() {
            Some("old" | "old regime") => Self::Old,
            Some("new" | "new regime") => Self::New,
            _ => Self::Other(raw),
        }
    }
}

impl From<Regime> for Value {
    fn from(regime: Regime) -> Self {
        match regime {
            Regime::Other(raw) => raw,
            known => Value::String(known.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum FilingStatus {
    TaxDue,
    RefundDue,
    Other(Value),
}

impl FilingStatus {
    pub fn label(&self) -> String {
        match self {
            Self::TaxDue => "Tax Due".to_string(),
            Self::RefundDue => "Refund Due".to_string(),
            Self::Other(raw) => label_text(raw),
        }
    }
}

impl From<Value> for FilingStatus {
    fn from(raw: Value) -> Self {
        match normalized_label(&raw).as_deref() {
            Some("tax due") => Self::TaxDue,
            Some("refund due") => Self::RefundDue,
            _ => Self::Other(raw),
        }
    }
}

impl From<FilingStatus> for Value {
    fn from(status: FilingStatus) -> Self {
        match status {
            FilingStatus::Other(raw) => raw,
            known => Value::String(known.label()),
        }
    }
}

/// Result record embedded in the calculator's free-text answer.
///
/// Every model-provided field is optional. `assessment_year` and
/// `deductions_claimed` are never produced by the model; they are attached by
/// [`TaxSummary::with_context`] after parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxSummary {
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub gross_total_income: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub total_taxes_paid: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub old_regime_tax_liability: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub new_regime_tax_liability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_regime: Option<Regime>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub tax_saving_with_recommendation: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub final_amount_due_under_recommendation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FilingStatus>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub assessment_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deductions_claimed: Option<Lenient<Vec<DeductionEntry>>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What the user has to do once the recommended regime is applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FinalPosition {
    TaxDue { amount: Option<f64> },
    Refund { amount: Option<f64> },
    Settled,
    Undetermined { label: Option<String> },
}

impl TaxSummary {
    pub fn with_context(
        mut self,
        assessment_year: Option<String>,
        deductions: impl IntoIterator<Item = impl Into<DeductionEntry>>,
    ) -> Self {
        self.assessment_year = assessment_year;
        self.deductions_claimed = Some(Lenient::Known(
            deductions.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// The attached deduction list, when one was attached and is a list.
    pub fn deduction_entries(&self) -> Option<&[DeductionEntry]> {
        match &self.deductions_claimed {
            Some(Lenient::Known(entries)) => Some(entries),
            _ => None,
        }
    }

    /// The sign of the final amount decides; the status label is only
    /// consulted when the amount is missing.
    pub fn final_position(&self) -> FinalPosition {
        match self.final_amount_due_under_recommendation {
            Some(amount) if amount < 0.0 => FinalPosition::Refund {
                amount: Some(amount.abs()),
            },
            Some(amount) if amount > 0.0 => FinalPosition::TaxDue {
                amount: Some(amount),
            },
            Some(_) => FinalPosition::Settled,
            None => match &self.status {
                Some(FilingStatus::TaxDue) => FinalPosition::TaxDue { amount: None },
                Some(FilingStatus::RefundDue) => FinalPosition::Refund { amount: None },
                Some(other @ FilingStatus::Other(_)) => FinalPosition::Undetermined {
                    label: Some(other.label()),
                },
                None => FinalPosition::Undetermined { label: None },
            },
        }
    }

    /// True when the label and the sign of the final amount tell the same story.
    pub fn status_agrees_with_amount(&self) -> bool {
        match (&self.status, self.final_amount_due_under_recommendation) {
            (Some(FilingStatus::TaxDue), Some(amount)) => amount > 0.0,
            (Some(FilingStatus::RefundDue), Some(amount)) => amount < 0.0,
            _ => true,
        }
    }
}
