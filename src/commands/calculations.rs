use tracing::info;

use crate::{
    assistant::calculator::run_calculation,
    commands::{non_negative_amount, session_owner},
    core::{
        errors::AppResult,
        types::{
            CalculateRequest, CalculateResponse, ListCalculationsResponse,
            SaveCalculationResponse,
        },
    },
    db::repositories::{calculations, deductions},
    AppState,
};

pub async fn calculate(
    state: &AppState,
    session_id: &str,
    request: CalculateRequest,
) -> AppResult<CalculateResponse> {
    let session = state.sessions.get(session_id).await?;
    let mut session = session.lock().await;
    session.require_document()?;

    if let Some(user_80d) = request.user80d {
        session.user_80d = non_negative_amount(user_80d, "80D amount")?;
    }
    let totals = deductions::section_totals(state.db.pool(), &session.owner).await?;
    let professional_tax = state
        .config
        .professional_tax
        .lookup(request.jurisdiction.as_deref());
    let model = session.calculation_tier.model_name(&state.config).to_string();
    info!(
        session_id,
        model = %model,
        tracked_sections = totals.len(),
        professional_tax,
        "calculating tax"
    );

    let outcome = run_calculation(
        state.model.as_ref(),
        &model,
        state.config.summary_strategy,
        &mut session,
        &totals,
        professional_tax,
    )
    .await?;

    Ok(CalculateResponse {
        final_position: outcome.summary.final_position(),
        status_agrees_with_amount: outcome.summary.status_agrees_with_amount(),
        reconciled_deductions: outcome.input.deductions().to_vec(),
        professional_tax: outcome.input.professional_tax,
        summary: outcome.summary,
        model,
        raw_response: outcome.raw_response,
    })
}

/// Persists the session's current summary for its owner.
pub async fn save_calculation(
    state: &AppState,
    session_id: &str,
) -> AppResult<SaveCalculationResponse> {
    let session = state.sessions.get(session_id).await?;
    let session = session.lock().await;
    let summary = session.require_summary()?;
    let calculation =
        calculations::insert_calculation(state.db.pool(), &session.owner, summary).await?;
    info!(session_id, calculation_id = calculation.id, "calculation saved");
    Ok(SaveCalculationResponse { calculation })
}

pub async fn list_calculations(
    state: &AppState,
    session_id: &str,
) -> AppResult<ListCalculationsResponse> {
    let owner = session_owner(state, session_id).await?;
    let calculations = calculations::list_calculations(state.db.pool(), &owner).await?;
    Ok(ListCalculationsResponse { calculations })
}
