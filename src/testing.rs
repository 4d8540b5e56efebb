//! Shared fixtures for in-crate tests.

use crate::services::OrderService;
use crate::utils::AesGcmCipher;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;

/// Fresh in-memory SQLite with the schema applied. One connection, so every
/// query (and every transaction) sees the same database.
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn setup_service() -> (OrderService, DatabaseConnection) {
    let db = setup_db().await;
    let cipher = Arc::new(AesGcmCipher::new("order-service-tests").unwrap());
    (OrderService::new(db.clone(), cipher), db)
}
