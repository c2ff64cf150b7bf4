//! HTTP routes: the landing page and the chat widget API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{assets, landing};
use crate::widget::{Reply, WidgetError, WidgetSnapshot};
use crate::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
}

/// Error body returned by the widget API
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub struct ApiError(WidgetError);

impl From<WidgetError> for ApiError {
    fn from(err: WidgetError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            WidgetError::NotFound(_) => StatusCode::NOT_FOUND,
            WidgetError::Capacity(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(landing::render(&state.site))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn open_widget(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<WidgetSnapshot>), ApiError> {
    let snapshot = state.widgets.open().await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

async fn get_widget(
    State(state): State<AppState>,
    Path(widget_id): Path<Uuid>,
) -> Result<Json<WidgetSnapshot>, ApiError> {
    Ok(Json(state.widgets.snapshot(widget_id).await?))
}

async fn submit_message(
    State(state): State<AppState>,
    Path(widget_id): Path<Uuid>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<Reply>, ApiError> {
    Ok(Json(state.widgets.submit(widget_id, &request.text).await?))
}

async fn close_widget(
    State(state): State<AppState>,
    Path(widget_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.widgets.close(widget_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/assets/*path", get(assets::serve))
        .route("/v1/widgets", post(open_widget))
        .route("/v1/widgets/:widget_id", get(get_widget).delete(close_widget))
        .route("/v1/widgets/:widget_id/messages", post(submit_message))
}
