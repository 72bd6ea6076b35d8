use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use common::config::{
    FilesystemStorageConfig, S3StorageConfig, StorageBackend, StorageConfig,
};

/// Minimum HMAC secret length in bytes (256 bits).
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub max_body_bytes: usize,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    /// Adds the `Secure` attribute to the refresh cookie.
    pub secure_cookie: bool,
    /// Shared secret the identity gateway presents on the handshake endpoint.
    pub identity_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("server.max_body_bytes", 32 * 1024 * 1024)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.max_connections", 20)?
            .set_default("database.connect_timeout_secs", 8)?
            .set_default("auth.access_ttl_secs", 3600)?
            .set_default("auth.refresh_ttl_secs", 86400)?
            .set_default("auth.secure_cookie", false)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., BIDBUY__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("BIDBUY").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "auth.jwt_secret must be at least {MIN_JWT_SECRET_LEN} bytes"
            )));
        }
        if self.auth.identity_secret.is_empty() {
            return Err(ConfigError::Message(
                "auth.identity_secret must not be empty".into(),
            ));
        }
        if self.auth.access_ttl_secs <= 0 || self.auth.refresh_ttl_secs <= 0 {
            return Err(ConfigError::Message("token TTLs must be positive".into()));
        }
        if let Some(bad) = self
            .server
            .cors
            .allow_origins
            .iter()
            .find(|o| o.as_str() == "*" || axum::http::HeaderValue::from_str(o).is_err())
        {
            return Err(ConfigError::Message(format!(
                "server.cors.allow_origins: '{bad}' is not a usable origin"
            )));
        }
        Ok(())
    }
}
