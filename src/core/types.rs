use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    assistant::session::{ChatMessage, ModelTier},
    tax::{
        document::{DeductionEntry, ExtractedDocument},
        report::Report,
        summary::{FinalPosition, TaxSummary},
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SetProviderKeyResponse {
    pub stored: bool,
}

// Stored records

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeductionRecord {
    pub id: i64,
    pub owner: String,
    pub section: String,
    pub description: Option<String>,
    pub amount: f64,
    pub date_added: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDeduction {
    pub section: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub date_added: Option<String>,
}

/// Sum of tracked deductions for one section code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionTotal {
    pub section: String,
    pub total_amount: f64,
}

impl SectionTotal {
    pub fn new(section: impl Into<String>, total_amount: f64) -> Self {
        Self {
            section: section.into(),
            total_amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRecord {
    pub id: i64,
    pub owner: String,
    pub assessment_year: Option<String>,
    pub gross_income: Option<f64>,
    pub recommended_regime: Option<String>,
    pub tax_saving: Option<f64>,
    pub final_amount_due: Option<f64>,
    pub summary: TaxSummary,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserEvent {
    pub id: i64,
    pub owner: String,
    pub title: String,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub start_date: String,
}

// Requests

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetModelTierRequest {
    pub tier: ModelTier,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    #[serde(default, alias = "user_80d")]
    pub user80d: Option<f64>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskAdvisorRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetProviderKeyRequest {
    pub provider: Option<Provider>,
    pub api_key: String,
}

// Responses

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub owner: String,
    pub file_name: Option<String>,
    pub extracted: Option<ExtractedDocument>,
    pub calculation_response: Option<String>,
    pub summary: Option<TaxSummary>,
    pub user80d: f64,
    pub calculation_tier: ModelTier,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub owner: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetModelTierResponse {
    pub tier: ModelTier,
    pub model: String,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDocumentResponse {
    pub file_name: String,
    pub fingerprint: String,
    pub cached: bool,
    pub document: ExtractedDocument,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    pub summary: TaxSummary,
    pub final_position: FinalPosition,
    pub status_agrees_with_amount: bool,
    pub reconciled_deductions: Vec<DeductionEntry>,
    pub professional_tax: f64,
    pub model: String,
    pub raw_response: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCalculationResponse {
    pub calculation: CalculationRecord,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCalculationsResponse {
    pub calculations: Vec<CalculationRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDeductionResponse {
    pub deduction: DeductionRecord,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDeductionsResponse {
    pub deductions: Vec<DeductionRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionSummaryResponse {
    pub sections: Vec<SectionTotal>,
    pub total_tracked: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEventResponse {
    pub event: UserEvent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsResponse {
    pub events: Vec<UserEvent>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecordResponse {
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorStatus {
    Relevant,
    Irrelevant,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorReply {
    pub reply: String,
    pub status: AdvisorStatus,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub report: Report,
    pub markdown: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationPoint {
    pub created_at: DateTime<Utc>,
    pub assessment_year: Option<String>,
    pub gross_income: Option<f64>,
    pub final_amount_due: Option<f64>,
    pub recommended_regime: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub sections: Vec<SectionTotal>,
    pub total_tracked: f64,
    pub history: Vec<CalculationPoint>,
    pub events: Vec<UserEvent>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileExport {
    pub owner: String,
    pub exported_at: DateTime<Utc>,
    pub deductions: Vec<DeductionRecord>,
    pub calculations: Vec<CalculationRecord>,
    pub events: Vec<UserEvent>,
}
