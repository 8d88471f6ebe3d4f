use mongodb::{Client, Database};
use tracing::{error, info};

use crate::config::AppConfig;

pub async fn get_db_client(config: &AppConfig) -> Database {
    let client = Client::with_uri_str(&config.database_url)
        .await
        .expect("Failed to connect to MongoDB");

    let db = client.database(&config.database_name);

    // Verify the database is reachable by listing collections
    match db.list_collection_names().await {
        Ok(collections) => {
            info!("Connected to database: {}", config.database_name);
            info!("Collections found: {:?}", collections);
        }
        Err(e) => {
            error!(
                "Database '{}' may not exist or is inaccessible: {}",
                config.database_name, e
            );
        }
    }

    db
}
