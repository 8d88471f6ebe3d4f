// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Failed to fetch data from GHN API, status code: {status}")]
    ProviderUnavailable { url: String, status: u16 },

    #[error("No valid data returned from GHN API: {0}")]
    ProviderBadResponse(String),

    #[error("Error while calling GHN API: {0}")]
    ProviderCallFailed(String),

    #[error("Mã xác thực không hợp lệ")]
    InvalidToken,

    #[error("Mã xác thực đã hết hạn")]
    ExpiredToken,

    #[error("Email error: {0}")]
    Email(String),

    #[error("Password hashing error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    // Every business error leaves through the same 400 envelope; the raw
    // error text is the user-visible message.
    fn into_response(self) -> Response {
        let body = Json(json!({
            "message": self.to_string(),
            "isError": true,
        }));

        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON parsing error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
