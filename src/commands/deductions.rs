use chrono::Utc;
use tracing::info;

use crate::{
    commands::{non_negative_amount, parse_date, required_text, session_owner},
    core::{
        errors::AppResult,
        types::{
            AddDeductionResponse, DeleteRecordResponse, DeductionSummaryResponse,
            ListDeductionsResponse, NewDeduction,
        },
    },
    db::repositories::deductions,
    AppState,
};

/// Section codes are stored trimmed and upper-cased so `80c` and `80C` group together.
fn normalized_section(section: &str) -> AppResult<String> {
    Ok(required_text(section, "section")?.to_ascii_uppercase())
}

pub async fn add_deduction(
    state: &AppState,
    session_id: &str,
    request: NewDeduction,
) -> AppResult<AddDeductionResponse> {
    let section = normalized_section(&request.section)?;
    let amount = non_negative_amount(request.amount, "amount")?;
    let description = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let date_added = match request.date_added.as_deref() {
        Some(raw) if !raw.trim().is_empty() => parse_date(raw, "dateAdded")?,
        _ => Utc::now().date_naive(),
    };

    let owner = session_owner(state, session_id).await?;
    let deduction = deductions::insert_deduction(
        state.db.pool(),
        &owner,
        &section,
        description,
        amount,
        date_added,
    )
    .await?;
    info!(deduction_id = deduction.id, section = %deduction.section, "deduction tracked");
    Ok(AddDeductionResponse { deduction })
}

pub async fn list_deductions(
    state: &AppState,
    session_id: &str,
) -> AppResult<ListDeductionsResponse> {
    let owner = session_owner(state, session_id).await?;
    let deductions = deductions::list_deductions(state.db.pool(), &owner).await?;
    Ok(ListDeductionsResponse { deductions })
}

pub async fn delete_deduction(
    state: &AppState,
    session_id: &str,
    deduction_id: i64,
) -> AppResult<DeleteRecordResponse> {
    let owner = session_owner(state, session_id).await?;
    let deleted = deductions::delete_deduction(state.db.pool(), &owner, deduction_id).await?;
    Ok(DeleteRecordResponse { deleted })
}

pub async fn deduction_summary(
    state: &AppState,
    session_id: &str,
) -> AppResult<DeductionSummaryResponse> {
    let owner = session_owner(state, session_id).await?;
    let sections = deductions::section_totals(state.db.pool(), &owner).await?;
    let total_tracked = sections.iter().map(|total| total.total_amount).sum();
    Ok(DeductionSummaryResponse {
        sections,
        total_tracked,
    })
}
