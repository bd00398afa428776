//! JSON HTTP surface. Every route maps onto one command.

use axum::{
    async_trait,
    body::Bytes,
    extract::{
        multipart::MultipartRejection, DefaultBodyLimit, FromRequest, FromRequestParts,
        Multipart, Path, Request, State,
    },
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};

use crate::{
    commands,
    core::{
        errors::{AppError, AppResult},
        types::{
            AddDeductionResponse, AddEventResponse, AdvisorReply, AskAdvisorRequest,
            CalculateRequest, CalculateResponse, CreateSessionRequest, CreateSessionResponse,
            DashboardResponse, DeductionSummaryResponse, DeleteRecordResponse,
            ListCalculationsResponse, ListDeductionsResponse, ListEventsResponse, NewDeduction,
            NewEvent, ProfileExport, ReportResponse, SaveCalculationResponse, SessionSnapshot,
            SetModelTierRequest, SetModelTierResponse, SetProviderKeyRequest,
            SetProviderKeyResponse, UploadDocumentResponse,
        },
    },
    AppState,
};

const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ProviderQuotaExceeded { .. } | Self::ProviderRateLimited => {
                StatusCode::TOO_MANY_REQUESTS
            }
            Self::ProviderTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::ProviderAuth
            | Self::ProviderInvalidResponse(_)
            | Self::Network(_)
            | Self::ExtractionFormat(_) => StatusCode::BAD_GATEWAY,
            Self::SummaryParse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) | Self::Io(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retryable = self.retryable();
        if status.is_server_error() {
            error!(code = self.code(), retryable, error = %self, "request failed");
        } else {
            warn!(code = self.code(), retryable, error = %self, "request rejected");
        }
        (status, Json(self)).into_response()
    }
}

/// JSON request body; any rejection is reported as `INVALID_INPUT`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// JSON request body that may be left out entirely. A blank body reads as
/// `None`; anything else must be valid JSON of the expected shape.
pub struct OptionalJsonBody<T>(pub Option<T>);

#[async_trait]
impl<T, S> FromRequest<S> for OptionalJsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }
        let value = serde_json::from_slice(&bytes)
            .map_err(|err| AppError::InvalidInput(format!("invalid JSON body: {err}")))?;
        Ok(Self(Some(value)))
    }
}

/// Path parameters; a malformed segment is reported as `INVALID_INPUT`.
pub struct PathParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
        Ok(Self(value))
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    Router::new()
        .route("/health", get(health))
        .route("/settings/provider-key", put(set_provider_key))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/sessions/:id/model", put(set_model_tier))
        .route("/sessions/:id/document", post(upload_document))
        .route("/sessions/:id/calculate", post(calculate))
        .route(
            "/sessions/:id/calculations",
            get(list_calculations).post(save_calculation),
        )
        .route("/sessions/:id/summary.json", get(summary_json))
        .route("/sessions/:id/report", get(report))
        .route("/sessions/:id/advisor", post(ask_advisor))
        .route(
            "/sessions/:id/deductions",
            get(list_deductions).post(add_deduction),
        )
        .route("/sessions/:id/deductions/summary", get(deduction_summary))
        .route("/sessions/:id/deductions/:rid", delete(delete_deduction))
        .route("/sessions/:id/events", get(list_events).post(add_event))
        .route("/sessions/:id/events/:rid", delete(delete_event))
        .route("/sessions/:id/dashboard", get(dashboard))
        .route("/sessions/:id/profile.json", get(export_profile))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn set_provider_key(
    JsonBody(request): JsonBody<SetProviderKeyRequest>,
) -> AppResult<Json<SetProviderKeyResponse>> {
    commands::settings::set_provider_key(request).await.map(Json)
}

async fn create_session(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<CreateSessionResponse>)> {
    let created = commands::sessions::create_session(&state, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_session(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> AppResult<Json<SessionSnapshot>> {
    commands::sessions::get_session(&state, &id).await.map(Json)
}

async fn delete_session(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> AppResult<Json<DeleteRecordResponse>> {
    commands::sessions::delete_session(&state, &id).await.map(Json)
}

async fn set_model_tier(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
    JsonBody(request): JsonBody<SetModelTierRequest>,
) -> AppResult<Json<SetModelTierResponse>> {
    commands::sessions::set_model_tier(&state, &id, request)
        .await
        .map(Json)
}

async fn upload_document(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadDocumentResponse>> {
    let mut multipart =
        multipart.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::InvalidInput(format!("multipart error: {err}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("document").to_string();
        let declared_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::InvalidInput(format!("failed to read upload: {err}")))?;
        return commands::documents::upload_document(
            &state,
            &id,
            &file_name,
            declared_type.as_deref(),
            bytes.to_vec(),
        )
        .await
        .map(Json);
    }
    Err(AppError::InvalidInput(
        "multipart field `file` is missing".to_string(),
    ))
}

async fn calculate(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
    OptionalJsonBody(request): OptionalJsonBody<CalculateRequest>,
) -> AppResult<Json<CalculateResponse>> {
    let request = request.unwrap_or_default();
    commands::calculations::calculate(&state, &id, request)
        .await
        .map(Json)
}

async fn save_calculation(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> AppResult<(StatusCode, Json<SaveCalculationResponse>)> {
    let saved = commands::calculations::save_calculation(&state, &id).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn list_calculations(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> AppResult<Json<ListCalculationsResponse>> {
    commands::calculations::list_calculations(&state, &id)
        .await
        .map(Json)
}

async fn summary_json(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> AppResult<Response> {
    let body = commands::exports::summary_json(&state, &id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"tax_summary.json\"",
            ),
        ],
        body,
    )
        .into_response())
}

async fn report(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> AppResult<Json<ReportResponse>> {
    commands::exports::build_report(&state, &id).await.map(Json)
}

async fn ask_advisor(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
    JsonBody(request): JsonBody<AskAdvisorRequest>,
) -> AppResult<Json<AdvisorReply>> {
    commands::advisor::ask_advisor(&state, &id, request)
        .await
        .map(Json)
}

async fn add_deduction(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
    JsonBody(request): JsonBody<NewDeduction>,
) -> AppResult<(StatusCode, Json<AddDeductionResponse>)> {
    let added = commands::deductions::add_deduction(&state, &id, request).await?;
    Ok((StatusCode::CREATED, Json(added)))
}

async fn list_deductions(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> AppResult<Json<ListDeductionsResponse>> {
    commands::deductions::list_deductions(&state, &id)
        .await
        .map(Json)
}

async fn delete_deduction(
    State(state): State<AppState>,
    PathParams((id, rid)): PathParams<(String, i64)>,
) -> AppResult<Json<DeleteRecordResponse>> {
    commands::deductions::delete_deduction(&state, &id, rid)
        .await
        .map(Json)
}

async fn deduction_summary(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> AppResult<Json<DeductionSummaryResponse>> {
    commands::deductions::deduction_summary(&state, &id)
        .await
        .map(Json)
}

async fn add_event(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
    JsonBody(request): JsonBody<NewEvent>,
) -> AppResult<(StatusCode, Json<AddEventResponse>)> {
    let added = commands::events::add_event(&state, &id, request).await?;
    Ok((StatusCode::CREATED, Json(added)))
}

async fn list_events(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> AppResult<Json<ListEventsResponse>> {
    commands::events::list_events(&state, &id).await.map(Json)
}

async fn delete_event(
    State(state): State<AppState>,
    PathParams((id, rid)): PathParams<(String, i64)>,
) -> AppResult<Json<DeleteRecordResponse>> {
    commands::events::delete_event(&state, &id, rid)
        .await
        .map(Json)
}

async fn dashboard(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> AppResult<Json<DashboardResponse>> {
    commands::exports::dashboard(&state, &id).await.map(Json)
}

async fn export_profile(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> AppResult<Json<ProfileExport>> {
    commands::exports::export_profile(&state, &id).await.map(Json)
}
