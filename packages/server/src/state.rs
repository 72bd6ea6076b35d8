use std::sync::Arc;

use common::storage::BlobStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::utils::jwt::JwtKeys;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub blob_store: Arc<dyn BlobStore>,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig, blob_store: Arc<dyn BlobStore>) -> Self {
        let jwt = Arc::new(JwtKeys::new(
            &config.auth.jwt_secret,
            config.auth.access_ttl_secs,
            config.auth.refresh_ttl_secs,
        ));
        Self {
            db,
            config,
            blob_store,
            jwt,
        }
    }
}
