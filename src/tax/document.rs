use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tax::{
    amount::Amount,
    lenient::{text_of, Lenient},
};

/// One entry of a deductions list. Entries that are not objects stay raw.
pub type DeductionEntry = Lenient<DeductionClaim>;

/// Structured record extracted from one uploaded financial document.
///
/// Every field the document does not state is `None`; nothing is filled in.
/// Keys the model returns beyond the known shape are kept in `extra`, and any
/// known field whose value has the wrong shape is kept raw, so the record can
/// be forwarded to the calculator unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    #[serde(default)]
    pub personal_info: Option<Lenient<PersonalInfo>>,
    #[serde(default)]
    pub income_sources: Option<Lenient<Vec<Lenient<IncomeSource>>>>,
    #[serde(default)]
    pub deductions_claimed: Option<Lenient<Vec<DeductionEntry>>>,
    #[serde(default)]
    pub taxes_paid: Option<Lenient<TaxesPaid>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: Option<Lenient<String>>,
    #[serde(default)]
    pub pan_number: Option<Lenient<String>>,
    #[serde(default)]
    pub assessment_year: Option<Lenient<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PersonalInfo {
    pub fn name(&self) -> Option<String> {
        text_of(&self.name)
    }

    pub fn pan_number(&self) -> Option<String> {
        text_of(&self.pan_number)
    }

    pub fn assessment_year(&self) -> Option<String> {
        text_of(&self.assessment_year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSource {
    #[serde(rename = "type", default)]
    pub kind: Option<Lenient<String>>,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionClaim {
    #[serde(default)]
    pub section: Option<Lenient<String>>,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeductionClaim {
    pub fn new(section: impl Into<String>, amount: f64) -> Self {
        Self {
            section: Some(Lenient::Known(section.into())),
            amount: Some(Amount::Number(amount)),
            extra: Map::new(),
        }
    }

    pub fn section(&self) -> Option<String> {
        text_of(&self.section)
    }

    pub fn is_section(&self, code: &str) -> bool {
        self.section()
            .is_some_and(|section| same_section(&section, code))
    }

    /// Numeric amount for arithmetic; absent or unreadable counts as zero.
    pub fn amount_value(&self) -> f64 {
        self.amount.as_ref().map(Amount::value).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxesPaid {
    #[serde(default)]
    pub tds: Option<Amount>,
    #[serde(default)]
    pub advance_tax: Option<Amount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExtractedDocument {
    pub fn personal_info(&self) -> Option<&PersonalInfo> {
        self.personal_info.as_ref().and_then(Lenient::known)
    }

    pub fn assessment_year(&self) -> Option<String> {
        self.personal_info().and_then(PersonalInfo::assessment_year)
    }

    /// Deduction entries as listed; empty when the list is absent or not a list.
    pub fn deduction_entries(&self) -> &[DeductionEntry] {
        match &self.deductions_claimed {
            Some(Lenient::Known(entries)) => entries,
            _ => &[],
        }
    }

    /// Well-formed deduction claims only.
    pub fn deductions(&self) -> impl Iterator<Item = &DeductionClaim> + '_ {
        claims(self.deduction_entries())
    }

    pub fn income_sources(&self) -> impl Iterator<Item = &IncomeSource> + '_ {
        let entries: &[Lenient<IncomeSource>] = match &self.income_sources {
            Some(Lenient::Known(entries)) => entries,
            _ => &[],
        };
        entries.iter().filter_map(Lenient::known)
    }
}

/// Skips raw entries; they are carried along but never used in arithmetic.
pub fn claims(entries: &[DeductionEntry]) -> impl Iterator<Item = &DeductionClaim> + '_ {
    entries.iter().filter_map(Lenient::known)
}

/// Section codes compare case-insensitively and ignore surrounding spaces.
pub fn same_section(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}
