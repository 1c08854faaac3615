//! Application configuration module
//!
//! Configuration is assembled from three layers, later layers winning:
//!
//! 1. Built-in defaults suitable for local development
//! 2. An optional TOML file (`ECOFINDS_CONFIG`, default `ecofinds.toml`)
//! 3. Environment variables (after `.env` has been loaded by the binary)
//!
//! # Environment Variables
//!
//! - `SERVER_PORT` / `PORT` - Listen port (default 5000)
//! - `DATABASE_URL` - PostgreSQL URL; unset means the in-memory store
//! - `JWT_SECRET` - Token signing secret
//! - `TOKEN_TTL_DAYS` - Token lifetime (default 30)
//! - `FRONTEND_URL` - Allowed CORS origin (default `http://localhost:5173`)
//! - `APP_ENV` - `development` exposes internal error details
//! - `IMAGE_SERVICE_URL`, `IMAGE_SERVICE_KEY`, `IMAGE_SERVICE_FOLDER`
//! - `STATIC_DIR` - Directory served under `/static` (default `public`)
//! - `BCRYPT_COST` - Password hashing work factor (default 12)

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Secret used when none is configured. Only acceptable for local runs.
pub const DEV_JWT_SECRET: &str = "ecofinds-dev-secret-change-me";

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;
const DEFAULT_IMAGE_FOLDER: &str = "ecofinds";

/// bcrypt work factor for new password hashes
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// External image storage/transformation service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageServiceConfig {
    /// Upload endpoint, receives a multipart POST
    pub url: String,
    /// Optional bearer key sent with each upload
    #[serde(default)]
    pub api_key: Option<String>,
    /// Folder the service should store images under
    #[serde(default = "default_image_folder")]
    pub folder: String,
}

fn default_image_folder() -> String {
    DEFAULT_IMAGE_FOLDER.to_string()
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub frontend_url: String,
    pub development: bool,
    pub image_service: Option<ImageServiceConfig>,
    pub static_dir: String,
    pub bcrypt_cost: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_days: DEFAULT_TOKEN_TTL_DAYS,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            development: false,
            image_service: None,
            static_dir: "public".to_string(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

/// Shape of the optional TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub token_ttl_days: Option<i64>,
    pub frontend_url: Option<String>,
    pub development: Option<bool>,
    pub static_dir: Option<String>,
    pub bcrypt_cost: Option<u32>,
    pub image_service: Option<ImageServiceConfig>,
}

impl FileConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load from the optional TOML file and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("ECOFINDS_CONFIG").unwrap_or_else(|_| "ecofinds.toml".to_string());
        let file = if Path::new(&path).exists() {
            tracing::info!("[Config] Reading configuration file {}", path);
            FileConfig::from_path(&path)?
        } else {
            FileConfig::default()
        };
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge a file layer with an environment lookup
    pub fn from_sources(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();

        if let Some(port) = file.port {
            builder = builder.port(port);
        }
        if let Some(url) = file.database_url {
            builder = builder.database_url(url);
        }
        if let Some(secret) = file.jwt_secret {
            builder = builder.jwt_secret(secret);
        }
        if let Some(days) = file.token_ttl_days {
            builder = builder.token_ttl_days(days);
        }
        if let Some(url) = file.frontend_url {
            builder = builder.frontend_url(url);
        }
        if let Some(dev) = file.development {
            builder = builder.development(dev);
        }
        if let Some(dir) = file.static_dir {
            builder = builder.static_dir(dir);
        }
        if let Some(cost) = file.bcrypt_cost {
            builder = builder.bcrypt_cost(cost);
        }
        if let Some(images) = file.image_service {
            builder = builder.image_service(images);
        }

        if let Some(port) = env("SERVER_PORT").or_else(|| env("PORT")) {
            let port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT", port.clone()))?;
            builder = builder.port(port);
        }
        if let Some(url) = env("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            builder = builder.database_url(url);
        }
        if let Some(secret) = env("JWT_SECRET") {
            builder = builder.jwt_secret(secret);
        }
        if let Some(days) = env("TOKEN_TTL_DAYS") {
            let days = days
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TOKEN_TTL_DAYS", days.clone()))?;
            builder = builder.token_ttl_days(days);
        }
        if let Some(url) = env("FRONTEND_URL") {
            builder = builder.frontend_url(url);
        }
        if let Some(app_env) = env("APP_ENV") {
            builder = builder.development(app_env.eq_ignore_ascii_case("development"));
        }
        if let Some(url) = env("IMAGE_SERVICE_URL").filter(|v| !v.trim().is_empty()) {
            builder = builder.image_service(ImageServiceConfig {
                url,
                api_key: env("IMAGE_SERVICE_KEY"),
                folder: env("IMAGE_SERVICE_FOLDER").unwrap_or_else(default_image_folder),
            });
        }
        if let Some(dir) = env("STATIC_DIR") {
            builder = builder.static_dir(dir);
        }
        if let Some(cost) = env("BCRYPT_COST") {
            let cost = cost
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BCRYPT_COST", cost.clone()))?;
            builder = builder.bcrypt_cost(cost);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("port", "0".to_string()));
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingValue("jwt_secret"));
        }
        if self.token_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "token_ttl_days",
                self.token_ttl_days.to_string(),
            ));
        }
        // bcrypt accepts work factors 4 through 31
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue(
                "bcrypt_cost",
                self.bcrypt_cost.to_string(),
            ));
        }
        if let Some(images) = &self.image_service {
            if !(images.url.starts_with("http://") || images.url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(images.url.clone()));
            }
        }
        Ok(())
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    port: Option<u16>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    token_ttl_days: Option<i64>,
    frontend_url: Option<String>,
    development: Option<bool>,
    image_service: Option<ImageServiceConfig>,
    static_dir: Option<String>,
    bcrypt_cost: Option<u32>,
}

impl AppConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn token_ttl_days(mut self, days: i64) -> Self {
        self.token_ttl_days = Some(days);
        self
    }

    pub fn frontend_url(mut self, url: impl Into<String>) -> Self {
        self.frontend_url = Some(url.into());
        self
    }

    pub fn development(mut self, development: bool) -> Self {
        self.development = Some(development);
        self
    }

    pub fn image_service(mut self, images: ImageServiceConfig) -> Self {
        self.image_service = Some(images);
        self
    }

    pub fn static_dir(mut self, dir: impl Into<String>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = Some(cost);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            port: self.port.unwrap_or(defaults.port),
            database_url: self.database_url,
            jwt_secret: self.jwt_secret.unwrap_or(defaults.jwt_secret),
            token_ttl_days: self.token_ttl_days.unwrap_or(defaults.token_ttl_days),
            frontend_url: self.frontend_url.unwrap_or(defaults.frontend_url),
            development: self.development.unwrap_or(defaults.development),
            image_service: self.image_service,
            static_dir: self.static_dir.unwrap_or(defaults.static_dir),
            bcrypt_cost: self.bcrypt_cost.unwrap_or(defaults.bcrypt_cost),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("failed to read config file {0}")]
    Io(String),
    #[error("failed to parse config file: {0}")]
    Parse(String),
}
