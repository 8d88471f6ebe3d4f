// config.rs
use std::env;

pub const GHN_BASE_URL: &str = "https://online-gateway.ghn.vn/shiip/public-api/master-data";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ghn_api_key: String,
    pub ghn_base_url: String,
    pub jwt_secret: String,
    pub database_url: String,
    pub database_name: String,
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from: String,
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            ghn_api_key: env::var("GHN_API_KEY")
                .expect("GHN_API_KEY must be set"),
            ghn_base_url: env::var("GHN_BASE_URL")
                .unwrap_or_else(|_| GHN_BASE_URL.to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set"),
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set"),
            database_name: env::var("DATABASE_NAME")
                .unwrap_or_else(|_| "shopvn".to_string()),
            smtp_host: env::var("SMTP_HOST")
                .expect("SMTP_HOST must be set"),
            smtp_username: env::var("SMTP_USERNAME")
                .expect("SMTP_USERNAME must be set"),
            smtp_password: env::var("SMTP_PASSWORD")
                .expect("SMTP_PASSWORD must be set"),
            smtp_from: env::var("SMTP_FROM")
                .unwrap_or_else(|_| "no-reply@shopvn.local".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a number"),
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
        }
    }
}
