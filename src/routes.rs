use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::{CONTENT_TYPE, InvalidHeaderValue}, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{event, Level};

use crate::{
    cqrs::{CommandHandler, CreateCheckoutCommand},
    dtos::{ApiError, CreateCheckoutResponse, InternalApiError},
    errors::CheckoutError,
    state::AppState,
};

const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/create-checkout", post(create_checkout))
        .with_state(state)
}

/// Only `origin` may call the relay from a browser.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]))
}

pub async fn index() -> &'static str {
    "Checkout relay is running"
}

pub async fn create_checkout(state: State<Arc<AppState>>, payload: Result<Json<CreateCheckoutCommand>, JsonRejection>) -> Response {
    let create_checkout_command = match payload {
        Ok(Json(command)) => command,
        Err(rejection) => {
            return (StatusCode::BAD_REQUEST, Json(json!(ApiError{error: rejection.body_text()}))).into_response();
        }
    };

    match state.create_checkout_command_handler.handle(&create_checkout_command).await {
        Ok(CreateCheckoutResponse::Created(session)) => (StatusCode::OK, Json(json!(session))).into_response(),
        Ok(CreateCheckoutResponse::Relayed { status, content_type, body }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            let content_type = content_type.unwrap_or_else(|| String::from(PLAIN_TEXT));
            (status, [(CONTENT_TYPE, content_type)], body).into_response()
        },
        Err(CheckoutError::Validation(message)) => (StatusCode::BAD_REQUEST, Json(json!(ApiError{error: message}))).into_response(),
        Err(e) => {
            event!(Level::ERROR, "checkout creation failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!(InternalApiError{
                error: String::from("Failed to create checkout"),
                details: e.to_string(),
            }))).into_response()
        }
    }
}
