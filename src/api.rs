//! JSON API: `POST /weather` and `GET /health`

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, error, warn};

use crate::models::{CoordinateValue, LocationQuery, WeatherResult};
use crate::web::AppState;
use crate::{LookupError, VERSION};

/// Body of `POST /weather`
#[derive(Debug, Default, Deserialize)]
pub struct WeatherRequest {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<CoordinateValue>,
    #[serde(default)]
    pub longitude: Option<CoordinateValue>,
}

impl WeatherRequest {
    pub fn to_query(&self) -> crate::Result<LocationQuery> {
        LocationQuery::parse(
            self.location.as_deref(),
            self.latitude.as_ref(),
            self.longitude.as_ref(),
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// An error on its way to becoming an HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// HTTP status for each lookup failure
#[must_use]
pub fn status_for(err: &LookupError) -> StatusCode {
    match err {
        LookupError::MissingInput
        | LookupError::InvalidCoordinateFormat { .. }
        | LookupError::CoordinateMismatch { .. } => StatusCode::BAD_REQUEST,
        LookupError::LocationNotFound { .. } | LookupError::WeatherProvider { .. } => {
            StatusCode::NOT_FOUND
        }
        LookupError::WeatherServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        LookupError::Config { .. } | LookupError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Log a failed lookup at a level matching who is at fault
pub(crate) fn log_failure(err: &LookupError) {
    let status = status_for(err);
    if status.is_server_error() {
        error!("Lookup failed: {}", err);
    } else if err.is_client_error() {
        debug!("Rejected lookup: {}", err);
    } else {
        warn!("Lookup failed: {}", err);
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        log_failure(&err);
        Self::new(status_for(&err), err.user_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/weather", post(post_weather))
        .route("/health", get(health))
}

async fn post_weather(
    State(state): State<AppState>,
    payload: Result<Json<WeatherRequest>, JsonRejection>,
) -> Result<Json<WeatherResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!("Rejected request body: {}", rejection.body_text());
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", rejection.body_text()),
        )
    })?;

    let query = request.to_query()?;
    let result = state.service.lookup(&query).await?;
    Ok(Json(result))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": VERSION }))
}
