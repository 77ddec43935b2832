//! Core error type for the Fiora backend.
//!
//! `AutomatorError` is used throughout the core domain (engine, stores,
//! CUA client). When the `axum` feature is enabled, it also implements
//! `IntoResponse` so it can be used directly as an axum handler error type.

#[derive(Debug, thiserror::Error)]
pub enum AutomatorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to create CUA agent: {0}")]
    AgentCreation(String),

    #[error("Action failed: {0}")]
    ActionExecution(String),

    #[error("Failed to get screenshot: {0}")]
    Screenshot(String),

    #[error("Unknown step type: {0}")]
    UnknownStepType(String),

    #[error("Unknown action type: {0}")]
    UnknownAction(String),

    #[error("Invalid step config: {0}")]
    InvalidStepConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// axum integration (opt-in via feature flag)
// ---------------------------------------------------------------------------

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AutomatorError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            AutomatorError::NotFound(_) => StatusCode::NOT_FOUND,
            AutomatorError::InvalidStepConfig(_)
            | AutomatorError::UnknownStepType(_)
            | AutomatorError::UnknownAction(_) => StatusCode::BAD_REQUEST,
            AutomatorError::Config(_)
            | AutomatorError::AgentCreation(_)
            | AutomatorError::ActionExecution(_)
            | AutomatorError::Screenshot(_)
            | AutomatorError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({ "detail": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
