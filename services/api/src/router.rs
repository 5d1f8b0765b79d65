//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the fulfillment webhook and the OpenAPI documentation.

use crate::{
    handlers,
    models::{
        BasicCard, Button, CardImage, Capability, ErrorResponse, GoogleInput, GooglePayload,
        GoogleRequest, OpenUrlAction, OriginalRequest, QueryResult, RawInput, ResponseData,
        RichResponse, RichResponseItem, SimpleResponse, Suggestion, SurfaceInfo, WebhookRequest,
        WebhookResponse,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::webhook, handlers::health),
    components(
        schemas(
            WebhookRequest, QueryResult, OriginalRequest, GoogleRequest, SurfaceInfo, Capability,
            GoogleInput, RawInput, WebhookResponse, ResponseData, GooglePayload, SimpleResponse,
            RichResponse, RichResponseItem, BasicCard, CardImage, Button, OpenUrlAction,
            Suggestion, ErrorResponse
        )
    ),
    tags(
        (
            name = "Holiday Chill",
            description = "Fulfillment webhook for the Holiday Chill voice action"
        )
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/webhook", post(handlers::webhook))
        .route("/health", get(handlers::health))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(TraceLayer::new_for_http())
}
