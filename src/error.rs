use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmartTaskError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Store API error (HTTP {status}): {body}")]
    StoreApi { status: u16, body: String },

    #[error("Auth API error (HTTP {status}): {body}")]
    AuthApi { status: u16, body: String },

    #[error("Generation API error (HTTP {status}): {body}")]
    GenerationApi { status: u16, body: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl SmartTaskError {
    pub fn to_error_code(&self) -> &'static str {
        match self {
            SmartTaskError::Http(_) => "HTTP_ERROR",
            SmartTaskError::Io(_) => "IO_ERROR",
            SmartTaskError::TaskNotFound(_) => "TASK_NOT_FOUND",
            SmartTaskError::InvalidInput(_) => "INVALID_INPUT",
            SmartTaskError::NotSignedIn => "NOT_SIGNED_IN",
            SmartTaskError::StoreApi { .. } => "STORE_API_ERROR",
            SmartTaskError::AuthApi { .. } => "AUTH_API_ERROR",
            SmartTaskError::GenerationApi { .. } => "GENERATION_API_ERROR",
            SmartTaskError::Json(_) => "JSON_ERROR",
            SmartTaskError::Prompt(_) => "PROMPT_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.to_error_code().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SmartTaskError>;
