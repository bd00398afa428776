use tracing::{debug, warn};

use crate::{
    assistant::{
        prompts,
        session::{ChatMessage, SessionContext},
    },
    core::{
        errors::{AppError, AppResult},
        types::AdvisorStatus,
    },
    providers::{LanguageModel, ModelRequest},
};

pub fn is_relevant(classification: &str) -> bool {
    classification
        .trim()
        .to_uppercase()
        .contains(prompts::RELEVANCE_MARKER)
}

async fn answer(
    model: &dyn LanguageModel,
    model_name: &str,
    context: &str,
    history: &[ChatMessage],
    question: &str,
) -> AppResult<(String, AdvisorStatus)> {
    let classification = model
        .generate(ModelRequest::text(
            model_name,
            prompts::relevance_prompt(question),
        ))
        .await?;
    if !is_relevant(&classification) {
        debug!("advisor question classified as irrelevant");
        return Ok((prompts::IRRELEVANT_REPLY.to_string(), AdvisorStatus::Irrelevant));
    }

    let reply = model
        .generate(ModelRequest::text(
            model_name,
            prompts::advisor_prompt(context, history, question),
        ))
        .await?;
    Ok((reply, AdvisorStatus::Relevant))
}

/// Answers one question. The question is always recorded; a failed model call
/// yields a fixed apology that is not added to the history.
pub async fn ask(
    model: &dyn LanguageModel,
    model_name: &str,
    session: &mut SessionContext,
    question: &str,
) -> AppResult<(String, AdvisorStatus)> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::InvalidInput("question cannot be empty".to_string()));
    }
    let summary = session.require_summary()?;
    let document = session.require_document()?;
    let context = prompts::advisor_context(
        &serde_json::to_string_pretty(document)?,
        &serde_json::to_string_pretty(summary)?,
    );

    let history = session.messages.clone();
    session.messages.push(ChatMessage::user(question));

    match answer(model, model_name, &context, &history, question).await {
        Ok((reply, status)) => {
            session.messages.push(ChatMessage::assistant(reply.clone()));
            Ok((reply, status))
        }
        Err(err) => {
            warn!(error = %err, code = err.code(), "advisor call failed");
            Ok((prompts::ADVISOR_APOLOGY.to_string(), AdvisorStatus::Error))
        }
    }
}
