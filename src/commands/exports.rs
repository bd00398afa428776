use chrono::Utc;

use crate::{
    commands::session_owner,
    core::{
        errors::AppResult,
        types::{CalculationPoint, DashboardResponse, ProfileExport, ReportResponse},
    },
    db::repositories::{calculations, deductions, events},
    tax::report::Report,
    AppState,
};

/// The current summary as pretty JSON, unknown keys included.
pub async fn summary_json(state: &AppState, session_id: &str) -> AppResult<String> {
    let session = state.sessions.get(session_id).await?;
    let session = session.lock().await;
    let summary = session.require_summary()?;
    Ok(serde_json::to_string_pretty(summary)?)
}

pub async fn build_report(state: &AppState, session_id: &str) -> AppResult<ReportResponse> {
    let session = state.sessions.get(session_id).await?;
    let session = session.lock().await;
    let summary = session.require_summary()?;
    let document = session.require_document()?;
    let report = Report::build(document, summary, &state.config.currency_placeholder);
    let markdown = report.to_markdown();
    Ok(ReportResponse { report, markdown })
}

pub async fn dashboard(state: &AppState, session_id: &str) -> AppResult<DashboardResponse> {
    let owner = session_owner(state, session_id).await?;
    let sections = deductions::section_totals(state.db.pool(), &owner).await?;
    let total_tracked = sections.iter().map(|total| total.total_amount).sum();
    let history = calculations::list_calculations(state.db.pool(), &owner)
        .await?
        .into_iter()
        .rev()
        .map(|record| CalculationPoint {
            created_at: record.created_at,
            assessment_year: record.assessment_year,
            gross_income: record.gross_income,
            final_amount_due: record.final_amount_due,
            recommended_regime: record.recommended_regime,
        })
        .collect();
    let events = events::list_events(state.db.pool(), &owner).await?;
    Ok(DashboardResponse {
        sections,
        total_tracked,
        history,
        events,
    })
}

pub async fn export_profile(state: &AppState, session_id: &str) -> AppResult<ProfileExport> {
    let owner = session_owner(state, session_id).await?;
    let deductions = deductions::list_deductions(state.db.pool(), &owner).await?;
    let calculations = calculations::list_calculations(state.db.pool(), &owner).await?;
    let events = events::list_events(state.db.pool(), &owner).await?;
    Ok(ProfileExport {
        owner,
        exported_at: Utc::now(),
        deductions,
        calculations,
        events,
    })
}
