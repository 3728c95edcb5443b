use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::models::ErrorResponse;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Gemini API key not configured")]
    ApiKeyNotConfigured,

    #[error("No file provided. Please upload a PDF or image file.")]
    MissingFile,

    #[error("Invalid multipart request: {0}")]
    InvalidUpload(String),

    #[error("Unsupported file type. Please upload a PDF or image file.")]
    UnsupportedFileType(String),

    #[error("Failed to generate analysis")]
    EmptyCompletion,

    #[error("{0}")]
    Provider(String),

    #[error("Provider returned invalid output: {0}")]
    InvalidProviderOutput(String),
}

impl AnalysisError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::MissingFile
            | AnalysisError::InvalidUpload(_)
            | AnalysisError::UnsupportedFileType(_) => StatusCode::BAD_REQUEST,
            AnalysisError::ApiKeyNotConfigured
            | AnalysisError::EmptyCompletion
            | AnalysisError::Provider(_)
            | AnalysisError::InvalidProviderOutput(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::Provider(format!("Provider request failed: {}", err))
    }
}

impl From<axum::extract::multipart::MultipartError> for AnalysisError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AnalysisError::InvalidUpload(err.body_text())
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
