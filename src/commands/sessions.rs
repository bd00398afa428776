use tracing::{info, warn};

use crate::{
    core::{
        errors::AppResult,
        types::{
            CreateSessionRequest, CreateSessionResponse, DeleteRecordResponse, SessionSnapshot,
            SetModelTierRequest, SetModelTierResponse,
        },
    },
    AppState,
};

pub async fn create_session(
    state: &AppState,
    request: CreateSessionRequest,
) -> AppResult<CreateSessionResponse> {
    let session = state.sessions.create(&request.owner).await?;
    info!(session_id = %session.id, "session created");
    Ok(CreateSessionResponse {
        session_id: session.id,
        owner: session.owner,
    })
}

pub async fn get_session(state: &AppState, session_id: &str) -> AppResult<SessionSnapshot> {
    let session = state.sessions.get(session_id).await?;
    let snapshot = session.lock().await.snapshot();
    Ok(snapshot)
}

pub async fn delete_session(
    state: &AppState,
    session_id: &str,
) -> AppResult<DeleteRecordResponse> {
    state.sessions.remove(session_id).await?;
    info!(session_id, "session closed");
    Ok(DeleteRecordResponse { deleted: true })
}

pub async fn set_model_tier(
    state: &AppState,
    session_id: &str,
    request: SetModelTierRequest,
) -> AppResult<SetModelTierResponse> {
    let session = state.sessions.get(session_id).await?;
    let mut session = session.lock().await;
    session.calculation_tier = request.tier;

    let model = request.tier.model_name(&state.config).to_string();
    let warning = request.tier.warning().map(str::to_string);
    if warning.is_some() {
        warn!(session_id, model = %model, "quota-limited calculation model selected");
    }
    Ok(SetModelTierResponse {
        tier: request.tier,
        model,
        warning,
    })
}
