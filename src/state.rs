use std::sync::Arc;

use mongodb::Database;

use crate::services::ghn_service::GhnService;
use crate::services::password_reset_service::PasswordResetService;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub ghn: Arc<GhnService>,
    pub password_reset: Arc<PasswordResetService>,
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(
        db: Database,
        ghn: Arc<GhnService>,
        password_reset: Arc<PasswordResetService>,
        jwt_secret: String,
    ) -> Self {
        AppState {
            db,
            ghn,
            password_reset,
            jwt_secret,
        }
    }
}
