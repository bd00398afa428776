pub mod advisor;
pub mod calculations;
pub mod deductions;
pub mod documents;
pub mod events;
pub mod exports;
pub mod sessions;
pub mod settings;

use chrono::NaiveDate;

use crate::{
    core::errors::{AppError, AppResult},
    db::repositories::DATE_FORMAT,
    AppState,
};

/// Owner of a live session; storage commands are scoped to it.
async fn session_owner(state: &AppState, session_id: &str) -> AppResult<String> {
    let session = state.sessions.get(session_id).await?;
    let owner = session.lock().await.owner.clone();
    Ok(owner)
}

fn required_text(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn parse_date(value: &str, field: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        AppError::InvalidInput(format!("{field} must be a YYYY-MM-DD date, got `{value}`"))
    })
}

fn non_negative_amount(value: f64, field: &str) -> AppResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::InvalidInput(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(value)
}
