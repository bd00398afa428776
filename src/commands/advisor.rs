use crate::{
    assistant::advisor,
    core::{
        errors::AppResult,
        types::{AdvisorReply, AskAdvisorRequest},
    },
    AppState,
};

pub async fn ask_advisor(
    state: &AppState,
    session_id: &str,
    request: AskAdvisorRequest,
) -> AppResult<AdvisorReply> {
    let session = state.sessions.get(session_id).await?;
    let mut session = session.lock().await;
    let (reply, status) = advisor::ask(
        state.model.as_ref(),
        &state.config.flash_model,
        &mut session,
        &request.question,
    )
    .await?;
    Ok(AdvisorReply {
        reply,
        status,
        messages: session.messages.clone(),
    })
}
