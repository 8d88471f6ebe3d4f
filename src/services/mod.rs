pub mod email_service;
pub mod ghn_service;
pub mod password_reset_service;
