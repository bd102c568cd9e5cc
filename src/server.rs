use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{debug, error, info, warn};

use crate::platform::MessageEvent;
use crate::rooms::provision_case_room;
use crate::state::{BotState, ConfigSnapshot, Session};

pub const NOT_READY: &str = "Spark Bot not ready.";
pub const HEALTHY: &str = "Up and healthy";
const MISSING_CREDENTIALS: &str =
    "Error: POST Requires both 'SPARK_BOT_TOKEN' and 'SPARK_BOT_EMAIL' to be provided.";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Spark Bot not ready.")]
    NotReady,
    #[error("{0}")]
    BadRequest(String),
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(e) => error!("Request failed: {:#}", e),
            ApiError::NotReady => warn!("{}", NOT_READY),
            ApiError::BadRequest(reason) => warn!("Bad request: {}", reason),
        }
        (self.status(), self.to_string()).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    data: MessageEvent,
}

#[derive(Debug, Deserialize)]
struct ConfigUpdate {
    #[serde(rename = "SPARK_BOT_TOKEN")]
    token: Option<String>,
    #[serde(rename = "SPARK_BOT_EMAIL")]
    email: Option<String>,
}

pub fn router(state: Arc<BotState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("key"),
        ]);

    Router::new()
        .route("/", post(process_webhook))
        .route("/config", get(read_config).post(update_config))
        .route("/hello/{email}", get(hello))
        .route("/health", get(health))
        .route("/create/{case_number}/{email}", get(create_room))
        .with_state(state)
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type,Authorization,Key"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET,PUT,POST,DELETE,OPTIONS"),
        ))
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: Arc<BotState>, host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;
    Ok(())
}

async fn ready(state: &BotState) -> Result<Arc<Session>, ApiError> {
    state.session().await.ok_or(ApiError::NotReady)
}

fn parse_body<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {}", e)))
}

async fn process_webhook(
    State(state): State<Arc<BotState>>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let session = ready(&state).await?;
    let payload: WebhookPayload = parse_body(&body)?;
    debug!(
        "Webhook {} delivered message {}",
        session.webhook_id, payload.data.id
    );

    state
        .dispatcher()
        .handle(session.platform.as_ref(), &payload.data)
        .await?;
    Ok("")
}

async fn read_config(State(state): State<Arc<BotState>>) -> Json<ConfigSnapshot> {
    Json(state.snapshot().await)
}

async fn update_config(
    State(state): State<Arc<BotState>>,
    body: Bytes,
) -> Result<Json<ConfigSnapshot>, ApiError> {
    let update: ConfigUpdate = parse_body(&body)?;
    let (Some(token), Some(email)) = (update.token, update.email) else {
        return Err(ApiError::BadRequest(MISSING_CREDENTIALS.to_string()));
    };

    Ok(Json(state.configure(&email, &token).await?))
}

async fn hello(
    State(state): State<Arc<BotState>>,
    Path(email): Path<String>,
) -> Result<String, ApiError> {
    let session = ready(&state).await?;
    session.platform.send_to_email(&email, "Hello!").await?;
    Ok(format!("Message sent to {}", email))
}

async fn health() -> &'static str {
    HEALTHY
}

async fn create_room(
    State(state): State<Arc<BotState>>,
    Path((case_number, email)): Path<(String, String)>,
) -> Result<String, ApiError> {
    let session = ready(&state).await?;
    Ok(provision_case_room(session.platform.as_ref(), &case_number, &email).await?)
}
