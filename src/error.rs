use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API key not found: set {0}")]
    MissingApiKey(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Too many sessions (limit {0})")]
    SessionLimit(usize),
}

impl BotError {
    /// Text shown to the user when a turn fails.
    pub fn friendly_message(&self) -> String {
        format!("🐻❌ 出错啦: {}\n输入'help'查看可用命令", self)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            BotError::BadRequest(_) => StatusCode::BAD_REQUEST,
            BotError::SessionLimit(_) => StatusCode::TOO_MANY_REQUESTS,
            BotError::Api { .. } | BotError::Http(_) | BotError::EmptyResponse => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BotError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
