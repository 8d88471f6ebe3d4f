use axum::{
    routing::{delete, post},
    Router,
};

use crate::handlers::password_reset;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Request a reset code by email
        .route("/forgot-password", post(password_reset::forgot_password))
        // Check a code without consuming it
        .route("/verify-code", post(password_reset::verify_code))
        // Reset the password with a verified code
        .route("/reset-password", post(password_reset::reset_password))
        // Discard an outstanding code
        .route("/reset-token/:code", delete(password_reset::cancel_reset))
}
