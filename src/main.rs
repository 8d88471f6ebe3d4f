use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::{http::Method, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod config;
mod database;
mod errors;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use config::AppConfig;
use database::connection::get_db_client;
use services::email_service::EmailService;
use services::ghn_service::GhnService;
use services::password_reset_service::PasswordResetService;
use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env();
    let db = get_db_client(&config).await;
    let app_state = initialize_app_state(db, &config);

    let app = build_router(app_state);
    start_server(app, &config).await;
}

fn initialize_app_state(db: mongodb::Database, config: &AppConfig) -> AppState {
    // The division cache lives inside GhnService for the whole process:
    // initialized empty, populated on first use, never invalidated.
    let ghn = Arc::new(GhnService::new(
        config.ghn_base_url.clone(),
        config.ghn_api_key.clone(),
    ));

    let email = match EmailService::new(config) {
        Ok(service) => {
            tracing::info!("Email service initialized");
            service
        }
        Err(e) => {
            tracing::error!("Failed to initialize email service: {}", e);
            panic!("Failed to initialize email service: {}", e);
        }
    };

    let password_reset = Arc::new(PasswordResetService::new(db.clone(), email));

    AppState::new(db, ghn, password_reset, config.jwt_secret.clone())
}

fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/addresses", routes::address::routes(app_state.clone()))
        .nest("/api/auth", routes::auth::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn start_server(app: Router, config: &AppConfig) {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("HOST/PORT must form a valid socket address");

    tracing::info!("Server starting on {}", addr);

    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            axum::serve(listener, app).await.expect("server error");
        }
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    }
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    use mongodb::bson::doc;

    let db_status = match state.db.run_command(doc! {"ping": 1}).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Json(json!({
        "status": "healthy",
        "database": db_status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
