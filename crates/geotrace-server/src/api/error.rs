//! Mapping of engine failures to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use geotrace_core::EngineError;

use crate::state::EngineRequestError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineRequestError),
    #[error("{0}")]
    Invalid(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Engine(EngineRequestError::Engine(err))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Engine(EngineRequestError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Engine(EngineRequestError::Engine(err)) => match err {
                EngineError::UnknownObject(_) => StatusCode::NOT_FOUND,
                EngineError::DuplicateId(_) | EngineError::NoGroundReference(_) => StatusCode::CONFLICT,
                EngineError::RouteLengthMismatch { .. }
                | EngineError::EmptyRoute
                | EngineError::UnsupportedForStation(_)
                | EngineError::SelfPointing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
