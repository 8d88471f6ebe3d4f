use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::state::AppState;

// Request DTOs
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Email không đúng định dạng"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, max = 6, message = "Mã xác thực phải gồm 6 chữ số"))]
    pub token: String,
    #[validate(length(min = 6, message = "Mật khẩu phải có ít nhất 6 ký tự"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

fn message_response(status: StatusCode, message: impl Into<String>, is_error: bool) -> Response {
    (
        status,
        Json(MessageResponse {
            message: message.into(),
            is_error,
        }),
    )
        .into_response()
}

// 1. Request a reset code by email
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Response {
    if let Err(errors) = req.validate() {
        return message_response(
            StatusCode::BAD_REQUEST,
            format!("Validation error: {}", errors),
            true,
        );
    }

    match state.password_reset.generate_reset_token(&req.email).await {
        Ok(()) => message_response(
            StatusCode::OK,
            "Mã xác nhận đã được gửi đến email của bạn.",
            false,
        ),
        Err(e) => message_response(StatusCode::BAD_REQUEST, e.to_string(), true),
    }
}

// 2. Check a code without consuming it
pub async fn verify_code(
    State(state): State<AppState>,
    Json(req): Json<VerifyCodeRequest>,
) -> Response {
    match state.password_reset.find_by_token(&req.token).await {
        Ok(Some(_)) => message_response(StatusCode::OK, "Mã xác thực hợp lệ.", false),
        Ok(None) => message_response(
            StatusCode::BAD_REQUEST,
            "Mã xác thực không hợp lệ",
            true,
        ),
        Err(e) => message_response(StatusCode::BAD_REQUEST, e.to_string(), true),
    }
}

// 3. Consume the code and set the new password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Response {
    if let Err(errors) = req.validate() {
        return message_response(
            StatusCode::BAD_REQUEST,
            format!("Validation error: {}", errors),
            true,
        );
    }

    match state
        .password_reset
        .reset_password(&req.token, &req.new_password)
        .await
    {
        Ok(()) => message_response(
            StatusCode::OK,
            "Mật khẩu đã được đặt lại thành công.",
            false,
        ),
        Err(e) => message_response(StatusCode::BAD_REQUEST, e.to_string(), true),
    }
}

// 4. Discard an outstanding code; removing an unknown code is a no-op
pub async fn cancel_reset(State(state): State<AppState>, Path(code): Path<String>) -> Response {
    match state.password_reset.delete_by_token(&code).await {
        Ok(()) => message_response(StatusCode::OK, "Mã xác thực đã được xóa.", false),
        Err(e) => message_response(StatusCode::BAD_REQUEST, e.to_string(), true),
    }
}
