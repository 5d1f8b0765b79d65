//! Axum Handlers for the Webhook API
//!
//! The fulfillment endpoint loads the caller's session, hands the turn to the
//! core dispatcher, stores the updated session and serializes the reply.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use holiday_chill_core::dispatcher::Turn;
use std::{any::Any, sync::Arc};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::{
    models::{ErrorResponse, WebhookRequest, WebhookResponse},
    state::AppState,
};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

/// Renders a caught handler panic with the same JSON body as any other internal error.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::InternalServerError(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

/// Fulfill one conversational turn.
#[utoipa::path(
    post,
    path = "/webhook",
    request_body = WebhookRequest,
    responses(
        (status = 200, description = "Reply for the platform to render", body = WebhookResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(
    name = "webhook_turn",
    skip_all,
    fields(request_id = %Uuid::new_v4(), session_id, intent)
)]
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<WebhookRequest>, JsonRejection>,
) -> Result<Json<WebhookResponse>, ApiError> {
    debug!(?headers, "Request headers");
    let Json(payload) = payload.map_err(|rejection| {
        info!(status = %rejection.status(), "Rejected webhook body");
        ApiError::BadRequest(rejection.body_text())
    })?;
    debug!(?payload, "Request body");

    let session_id = payload
        .session_id()
        .ok_or_else(|| ApiError::BadRequest("sessionId is required".to_string()))?;
    let span = tracing::Span::current();
    span.record("session_id", session_id);
    span.record("intent", payload.action());

    let mut session = state.sessions.load(session_id).await?;

    let turn = Turn {
        intent: payload.action(),
        category: payload.category(),
        raw_input: payload.raw_input(),
        surface: payload.surface(),
    };
    let reply = {
        let mut rng = rand::rng();
        state.dispatcher.dispatch(&turn, &mut session, &mut rng)
    };

    if reply.expect_user_response {
        state.sessions.save(session_id, session).await?;
    } else {
        state.sessions.remove(session_id).await?;
        info!("Conversation closed by the action");
    }

    Ok(Json(WebhookResponse::from(&reply)))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
