use crate::{
    commands::{parse_date, required_text, session_owner},
    core::{
        errors::AppResult,
        types::{AddEventResponse, DeleteRecordResponse, ListEventsResponse, NewEvent},
    },
    db::repositories::events,
    AppState,
};

pub async fn add_event(
    state: &AppState,
    session_id: &str,
    request: NewEvent,
) -> AppResult<AddEventResponse> {
    let title = required_text(&request.title, "title")?;
    let start_date = parse_date(&request.start_date, "startDate")?;
    let owner = session_owner(state, session_id).await?;
    let event = events::insert_event(state.db.pool(), &owner, &title, start_date).await?;
    Ok(AddEventResponse { event })
}

pub async fn list_events(state: &AppState, session_id: &str) -> AppResult<ListEventsResponse> {
    let owner = session_owner(state, session_id).await?;
    let events = events::list_events(state.db.pool(), &owner).await?;
    Ok(ListEventsResponse { events })
}

pub async fn delete_event(
    state: &AppState,
    session_id: &str,
    event_id: i64,
) -> AppResult<DeleteRecordResponse> {
    let owner = session_owner(state, session_id).await?;
    let deleted = events::delete_event(state.db.pool(), &owner, event_id).await?;
    Ok(DeleteRecordResponse { deleted })
}
