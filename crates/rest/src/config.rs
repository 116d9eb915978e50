//! Server configuration for the patient records API.
//!
//! This module provides configuration types for the REST server, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HOSPITAL_PORT` | 8080 | Server port |
//! | `HOSPITAL_HOST` | 127.0.0.1 | Host to bind |
//! | `HOSPITAL_LOG_LEVEL` | info | Log level |
//! | `HOSPITAL_MAX_BODY_SIZE` | 10485760 | Max request body (bytes) |
//! | `HOSPITAL_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `HOSPITAL_ENABLE_CORS` | true | Enable CORS |
//! | `HOSPITAL_CORS_ORIGINS` | * | Allowed origins |
//! | `HOSPITAL_CORS_METHODS` | GET,POST,PUT,DELETE,OPTIONS | Allowed methods |
//! | `HOSPITAL_CORS_HEADERS` | Content-Type,Authorization,Accept,X-Request-Id | Allowed headers |
//! | `HOSPITAL_BASE_URL` | http://localhost:8080 | Server base URL |
//! | `HOSPITAL_DATABASE_URL` | (hospital.db) | SQLite path or `:memory:` |
//! | `HOSPITAL_ENABLE_REQUEST_ID` | true | Assign and echo `x-request-id` |
//! | `HOSPITAL_DEFAULT_PAGE_SIZE` | 10 | Default `limit` for list endpoints |
//! | `HOSPITAL_MAX_PAGE_SIZE` | (unset) | Upper bound applied to `limit` |
//!
//! # Example
//!
//! ```rust
//! use hospital_rest::ServerConfig;
//!
//! // Create from environment
//! let config = ServerConfig::from_env();
//!
//! // Or create programmatically
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     enable_cors: true,
//!     ..Default::default()
//! };
//! ```

use clap::Parser;
use url::Url;

/// Server configuration for the patient records API.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "hospital")]
#[command(about = "Hospital patient records REST server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "HOSPITAL_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "HOSPITAL_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "HOSPITAL_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "HOSPITAL_MAX_BODY_SIZE", default_value = "10485760")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "HOSPITAL_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "HOSPITAL_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "HOSPITAL_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(
        long,
        env = "HOSPITAL_CORS_METHODS",
        default_value = "GET,POST,PUT,DELETE,OPTIONS"
    )]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "HOSPITAL_CORS_HEADERS",
        default_value = "Content-Type,Authorization,Accept,X-Request-Id"
    )]
    pub cors_headers: String,

    /// Base URL for the server (used in Location headers).
    #[arg(long, env = "HOSPITAL_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Database path. `:memory:` selects an in-memory database.
    #[arg(long, env = "HOSPITAL_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Enable request ID tracking.
    #[arg(long, env = "HOSPITAL_ENABLE_REQUEST_ID", default_value = "true")]
    pub enable_request_id: bool,

    /// Default page size for list endpoints.
    #[arg(long, env = "HOSPITAL_DEFAULT_PAGE_SIZE", default_value = "10")]
    pub default_page_size: usize,

    /// Maximum page size for list endpoints. Unbounded when unset.
    #[arg(long, env = "HOSPITAL_MAX_PAGE_SIZE")]
    pub max_page_size: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 10 * 1024 * 1024, // 10MB
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,PUT,DELETE,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,Accept,X-Request-Id".to_string(),
            base_url: "http://localhost:8080".to_string(),
            database_url: None,
            enable_request_id: true,
            default_page_size: 10,
            max_page_size: None,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        // Try to parse from environment, falling back to defaults
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Clamps a requested page size to the configured maximum.
    pub fn clamp_page_size(&self, limit: usize) -> usize {
        match self.max_page_size {
            Some(max) => limit.min(max),
            None => limit,
        }
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if let Some(max) = self.max_page_size {
            if max == 0 {
                errors.push("Max page size cannot be 0".to_string());
            }
            if self.default_page_size > max {
                errors.push("Default page size cannot exceed max page size".to_string());
            }
        }

        if let Err(e) = Url::parse(&self.base_url) {
            errors.push(format!("Invalid base URL '{}': {}", self.base_url, e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0 and disables features that might interfere
    /// with tests.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            max_body_size: 1024 * 1024,
            request_timeout: 5, // Shorter timeout for tests
            enable_cors: false,
            cors_origins: "*".to_string(),
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            base_url: "http://localhost:8080".to_string(),
            database_url: Some(":memory:".to_string()),
            enable_request_id: false,
            default_page_size: 10,
            max_page_size: Some(100),
        }
    }
}
