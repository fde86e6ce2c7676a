//! HTTP front end for a [`ScaleReader`].
//!
//! Routes mirror the scale's operations one to one:
//!
//! - `GET /` lists the endpoints
//! - `GET /read` returns the weight (or timeout/error text) as plain text
//! - `GET /get_settings` returns the port settings as JSON
//! - `GET|POST /update_settings` applies query or form parameters and
//!   returns `{"errors": ..., "settings": ...}`
//!
//! All handlers share one lock around the reader and run on the blocking
//! pool.

use crate::error::ScaleError;
use crate::scale::ScaleReader;
use crate::types::{PortSettings, SettingsReport, SettingsUpdate};
use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::error;
use std::sync::{Arc, Mutex};
use thiserror::Error;

const INDEX_HTML: &str = "Access a serial port scale via http: <ul>\
<li><a href='/read'>'/read'</a> to read scale response</li>\
<li><a href='/get_settings'>'/get_settings'</a> to view scale settings</li>\
<li><a href='/update_settings'>'/update_settings'</a> to change scale settings via GET or POST</li> </ul>";

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    scale: Arc<Mutex<ScaleReader>>,
}

impl AppState {
    pub fn new(reader: ScaleReader) -> Self {
        Self {
            scale: Arc::new(Mutex::new(reader)),
        }
    }

    /// Run `f` with exclusive access to the reader on the blocking pool
    async fn with_scale<T, F>(&self, f: F) -> Result<T, ServerError>
    where
        T: Send + 'static,
        F: FnOnce(&mut ScaleReader) -> crate::Result<T> + Send + 'static,
    {
        let scale = Arc::clone(&self.scale);
        tokio::task::spawn_blocking(move || {
            let mut reader = scale.lock().map_err(|_| ScaleError::LockPoisoned)?;
            f(&mut *reader)
        })
        .await?
        .map_err(ServerError::from)
    }
}

/// Failures that end a request with a generic 500
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Scale(#[from] ScaleError),

    #[error("Scale task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Build the router for `state`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/read", get(read))
        .route("/get_settings", get(get_settings))
        .route(
            "/update_settings",
            get(update_settings_query).post(update_settings_form),
        )
        .with_state(state)
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /read
pub async fn read(State(state): State<AppState>) -> Result<String, ServerError> {
    state.with_scale(|scale| scale.read_weight()).await
}

/// GET /get_settings
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<PortSettings>, ServerError> {
    state
        .with_scale(|scale| Ok(scale.get_settings()))
        .await
        .map(Json)
}

/// GET /update_settings?port=...&baud_rate=...
pub async fn update_settings_query(
    State(state): State<AppState>,
    Query(update): Query<SettingsUpdate>,
) -> Result<Json<SettingsReport>, ServerError> {
    update_settings(state, update).await
}

/// POST /update_settings with a form body
pub async fn update_settings_form(
    State(state): State<AppState>,
    Form(update): Form<SettingsUpdate>,
) -> Result<Json<SettingsReport>, ServerError> {
    update_settings(state, update).await
}

async fn update_settings(
    state: AppState,
    update: SettingsUpdate,
) -> Result<Json<SettingsReport>, ServerError> {
    state
        .with_scale(move |scale| Ok(scale.update_and_get_settings(&update)))
        .await
        .map(Json)
}
