//! One-page regime comparison report.
//!
//! The report is built as plain data first so the same content can be served
//! as Markdown or handed to any other renderer.

use serde::Serialize;

use crate::tax::{
    amount::Amount,
    currency::{format_currency, safe_str, DEFAULT_TEXT_PLACEHOLDER},
    document::{claims, ExtractedDocument},
    summary::{FinalPosition, Regime, TaxSummary},
};

pub const REPORT_TITLE: &str = "TaxBuddy - Dual Regime Tax Summary";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLine {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub metric: String,
    pub old_regime: String,
    pub new_regime: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub title: String,
    pub general: Vec<ReportLine>,
    pub income: Vec<ReportLine>,
    pub deductions: Vec<ReportLine>,
    pub comparison: Vec<ComparisonRow>,
    pub recommendation: ReportLine,
    pub final_position: Vec<ReportLine>,
}

fn line(label: impl Into<String>, value: impl Into<String>) -> ReportLine {
    ReportLine {
        label: label.into(),
        value: value.into(),
    }
}

impl Report {
    pub fn build(document: &ExtractedDocument, summary: &TaxSummary, placeholder: &str) -> Self {
        let money = |value: Option<f64>| format_currency(value, placeholder);
        let info = document.personal_info().cloned().unwrap_or_default();
        let assessment_year = summary
            .assessment_year
            .clone()
            .or_else(|| info.assessment_year());

        let general = vec![
            line("Name:", safe_str(info.name().as_deref(), DEFAULT_TEXT_PLACEHOLDER)),
            line("PAN:", safe_str(info.pan_number().as_deref(), DEFAULT_TEXT_PLACEHOLDER)),
            line(
                "Assessment Year:",
                safe_str(assessment_year.as_deref(), DEFAULT_TEXT_PLACEHOLDER),
            ),
        ];

        let income = vec![
            line("Gross Total Income:", money(summary.gross_total_income)),
            line(
                "Total Taxes Paid (TDS/Advance Tax):",
                money(summary.total_taxes_paid),
            ),
        ];

        let entries = summary
            .deduction_entries()
            .unwrap_or_else(|| document.deduction_entries());
        let deductions = claims(entries)
            .map(|claim| {
                line(
                    format!(
                        "Sec {}:",
                        safe_str(claim.section().as_deref(), DEFAULT_TEXT_PLACEHOLDER)
                    ),
                    money(claim.amount.as_ref().and_then(Amount::as_number)),
                )
            })
            .collect();

        let comparison = vec![ComparisonRow {
            metric: "Total Tax Liability".to_string(),
            old_regime: money(summary.old_regime_tax_liability),
            new_regime: money(summary.new_regime_tax_liability),
        }];

        let recommendation = match &summary.recommended_regime {
            Some(regime @ (Regime::Old | Regime::New)) => line(
                format!("RECOMMENDED REGIME: {} (Best Choice)", regime.label()),
                format!("Tax Savings: {}", money(summary.tax_saving_with_recommendation)),
            ),
            _ => line("RECOMMENDED REGIME:", "Could not determine best option."),
        };

        let final_position = match summary.final_position() {
            FinalPosition::TaxDue { amount } => vec![
                line("FINAL ACTION REQUIRED:", "TAX PAYMENT DUE"),
                line("Amount Payable:", money(amount)),
            ],
            FinalPosition::Refund { amount } => vec![
                line("FINAL ACTION REQUIRED:", "REFUND ELIGIBLE"),
                line("Refund Amount:", money(amount)),
            ],
            FinalPosition::Settled => vec![
                line("FINAL ACTION REQUIRED:", "NO TAX DUE/REFUND"),
                line("Final Amount:", money(Some(0.0))),
            ],
            FinalPosition::Undetermined { label } => vec![
                line("Final Status:", safe_str(label.as_deref(), "Error")),
                line("Final Amount:", money(None)),
            ],
        };

        Self {
            title: REPORT_TITLE.to_string(),
            general,
            income,
            deductions,
            comparison,
            recommendation,
            final_position,
        }
    }

    pub fn to_markdown(&self) -> String {
        let mut text = String::new();
        text.push_str(&format!("# {}\n\n", self.title));

        text.push_str("## 1. General Information\n\n");
        push_lines(&mut text, &self.general);

        text.push_str("\n## 2. Income and Deductions\n\n");
        push_lines(&mut text, &self.income);
        text.push_str("\nDeductions Extracted/Added:\n\n");
        if self.deductions.is_empty() {
            text.push_str("- none\n");
        }
        for item in &self.deductions {
            text.push_str(&format!("- {} {}\n", item.label, item.value));
        }

        text.push_str("\n## 3. Tax Regime Comparison\n\n");
        text.push_str("| Metric | Old Regime | New Regime |\n");
        text.push_str("| --- | ---: | ---: |\n");
        for row in &self.comparison {
            text.push_str(&format!(
                "| {} | {} | {} |\n",
                row.metric, row.old_regime, row.new_regime
            ));
        }
        text.push_str(&format!(
            "\n**{}** {}\n",
            self.recommendation.label, self.recommendation.value
        ));

        text.push_str("\n## 4. Final Tax Position (Recommended Regime)\n\n");
        push_lines(&mut text, &self.final_position);
        text
    }
}

fn push_lines(text: &mut String, lines: &[ReportLine]) {
    for item in lines {
        text.push_str(&format!("**{}** {}  \n", item.label, item.value));
    }
}
