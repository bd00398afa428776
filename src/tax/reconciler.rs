//! Merges tracked deductions into the extracted document before calculation.
//!
//! Section 80D is user-authoritative: the override entered by the user replaces
//! whatever the document states and tracked 80D entries are ignored. Every
//! other tracked section is added on top of the document amount, because a
//! document-stated and a separately tracked component can both be real.
//!
//! Entries the model did not return as objects are carried through untouched
//! and never match a section.
//!
//! [`merge_tracked`] is additive and therefore not idempotent. [`reconcile`]
//! always starts from a fresh copy of the document, so callers run it once per
//! calculation request against one snapshot of the tracked totals.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::SectionTotal,
    },
    tax::{
        amount::{parse_numeric, Amount},
        document::{same_section, DeductionClaim, DeductionEntry, ExtractedDocument},
        lenient::Lenient,
    },
};

pub const USER_AUTHORITATIVE_SECTION: &str = "80D";
pub const PROFESSIONAL_TAX_FIELD: &str = "professional_tax";

/// Document copy sent to the calculator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledInput {
    #[serde(flatten)]
    pub document: ExtractedDocument,
    pub professional_tax: f64,
}

impl ReconciledInput {
    pub fn deductions(&self) -> &[DeductionEntry] {
        self.document.deduction_entries()
    }
}

/// Annual professional tax by state, looked up case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfessionalTaxTable {
    rates: BTreeMap<String, f64>,
}

impl Default for ProfessionalTaxTable {
    fn default() -> Self {
        let rates = [
            ("andhra pradesh", 2400.0),
            ("assam", 2500.0),
            ("gujarat", 2400.0),
            ("karnataka", 2400.0),
            ("kerala", 2500.0),
            ("madhya pradesh", 2500.0),
            ("maharashtra", 2500.0),
            ("odisha", 2500.0),
            ("tamil nadu", 2500.0),
            ("telangana", 2400.0),
            ("west bengal", 2500.0),
        ]
        .into_iter()
        .map(|(state, rate)| (state.to_string(), rate))
        .collect();
        Self { rates }
    }
}

impl ProfessionalTaxTable {
    /// Parses `State=amount,State=amount` and layers it over the defaults.
    pub fn with_overrides(mut self, raw: &str) -> AppResult<Self> {
        for pair in raw.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
            let (state, amount) = pair.split_once('=').ok_or_else(|| {
                AppError::Config(format!("professional tax entry `{pair}` is not State=amount"))
            })?;
            let amount = parse_numeric(amount).ok_or_else(|| {
                AppError::Config(format!("professional tax amount in `{pair}` is not a number"))
            })?;
            self.rates.insert(normalize_jurisdiction(state), amount);
        }
        Ok(self)
    }

    pub fn lookup(&self, jurisdiction: Option<&str>) -> f64 {
        jurisdiction
            .map(normalize_jurisdiction)
            .and_then(|key| self.rates.get(&key).copied())
            .unwrap_or(0.0)
    }
}

fn normalize_jurisdiction(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Applies the user's 80D figure. A non-positive override leaves the list as is.
pub fn upsert_user_section(deductions: &mut Vec<DeductionEntry>, override_amount: f64) {
    if !(override_amount > 0.0) {
        return;
    }
    match find_section(deductions, USER_AUTHORITATIVE_SECTION) {
        Some(existing) => existing.amount = Some(Amount::Number(override_amount)),
        None => deductions.push(
            DeductionClaim::new(USER_AUTHORITATIVE_SECTION, override_amount).into(),
        ),
    }
}

/// Adds tracked totals for every section except 80D.
pub fn merge_tracked(deductions: &mut Vec<DeductionEntry>, totals: &[SectionTotal]) {
    for total in totals {
        if same_section(&total.section, USER_AUTHORITATIVE_SECTION) {
            continue;
        }
        match find_section(deductions, &total.section) {
            Some(existing) => {
                let merged = existing.amount_value() + total.total_amount;
                existing.amount = Some(Amount::Number(merged));
            }
            None => deductions
                .push(DeductionClaim::new(total.section.clone(), total.total_amount).into()),
        }
    }
}

fn find_section<'a>(
    deductions: &'a mut [DeductionEntry],
    section: &str,
) -> Option<&'a mut DeductionClaim> {
    deductions
        .iter_mut()
        .filter_map(Lenient::known_mut)
        .find(|claim| claim.is_section(section))
}

pub fn reconcile(
    document: &ExtractedDocument,
    totals: &[SectionTotal],
    user_80d: f64,
    professional_tax: f64,
) -> ReconciledInput {
    let mut deductions = document.deduction_entries().to_vec();
    upsert_user_section(&mut deductions, user_80d);
    merge_tracked(&mut deductions, totals);
    debug!(
        document_entries = document.deduction_entries().len(),
        tracked_sections = totals.len(),
        reconciled_entries = deductions.len(),
        "reconciled deductions"
    );

    let mut copy = document.clone();
    copy.extra.remove(PROFESSIONAL_TAX_FIELD);
    let unreadable_list = matches!(document.deductions_claimed, Some(Lenient::Raw(_)));
    if unreadable_list && !deductions.is_empty() {
        warn!("document deductions are not a list; sending only the added entries");
    }
    // A non-list with nothing to add is forwarded exactly as extracted.
    if !(unreadable_list && deductions.is_empty()) {
        copy.deductions_claimed = Some(Lenient::Known(deductions));
    }
    ReconciledInput {
        document: copy,
        professional_tax,
    }
}
