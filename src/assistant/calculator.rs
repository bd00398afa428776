use tracing::{info, warn};

use crate::{
    assistant::{
        prompts,
        session::{ChatMessage, SessionContext},
    },
    core::{
        errors::{AppError, AppResult},
        types::SectionTotal,
    },
    providers::{LanguageModel, ModelRequest},
    tax::{
        parser::{parse_tax_summary, ParseStrategy},
        reconciler::{reconcile, ReconciledInput},
        summary::TaxSummary,
    },
};

pub struct CalculationOutcome {
    pub input: ReconciledInput,
    pub summary: TaxSummary,
    pub raw_response: String,
}

/// Runs one calculation against the session's extracted document.
///
/// Any earlier answer and summary are cleared before the model is called, so a
/// failed attempt never leaves a summary that belongs to different inputs. The
/// raw answer is stored before parsing and stays available when parsing fails.
pub async fn run_calculation(
    model: &dyn LanguageModel,
    model_name: &str,
    strategy: ParseStrategy,
    session: &mut SessionContext,
    totals: &[SectionTotal],
    professional_tax: f64,
) -> AppResult<CalculationOutcome> {
    let document = session.require_document()?;
    let input = reconcile(document, totals, session.user_80d, professional_tax);
    let input_json = serde_json::to_string_pretty(&input)
        .map_err(|err| AppError::Internal(format!("serialize calculator input: {err}")))?;
    let assessment_year = document.assessment_year();

    let request = ModelRequest::text(
        model_name,
        prompts::calculation_prompt(strategy, &input_json),
    );
    session.calculation_response = None;
    session.summary = None;
    let raw_response = model.generate(request).await?;
    if raw_response.trim().is_empty() {
        warn!(model = model_name, "calculator returned an empty response");
        return Err(AppError::ProviderInvalidResponse(
            "the calculator returned an empty response".to_string(),
        ));
    }

    session.calculation_response = Some(raw_response.clone());

    let summary = parse_tax_summary(&raw_response, strategy)?
        .with_context(assessment_year, input.deductions().to_vec());
    info!(
        model = model_name,
        strategy = strategy.as_str(),
        status_agrees = summary.status_agrees_with_amount(),
        "tax summary parsed"
    );
    if !summary.status_agrees_with_amount() {
        warn!("status label disagrees with the sign of the final amount; using the sign");
    }

    session.summary = Some(summary.clone());
    if session.messages.is_empty() {
        session
            .messages
            .push(ChatMessage::assistant(prompts::ADVISOR_GREETING));
    }

    Ok(CalculationOutcome {
        input,
        summary,
        raw_response,
    })
}
