// Configuration module entry point
// Loads the immutable process configuration and builds shared application state

mod state;
mod types;

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, ServerConfig, StoreConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Errors that abort startup before the listener is bound
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("database not found: {}", .0.display())]
    MissingStore(PathBuf),
    #[error("server.workers must be at least 1")]
    ZeroWorkers,
    #[error("invalid listen address '{addr}': {source}")]
    Address {
        addr: String,
        source: std::net::AddrParseError,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: built-in defaults, the config file,
    /// `PETRONOX__SECTION__KEY` variables, then the flat `PETRONOX_PORT`,
    /// `PETRONOX_DB`, `PETRONOX_CORS_ORIGIN`, `PETRONOX_CACHE_MAX_AGE` and
    /// `PETRONOX_ROOT` variables.
    pub fn load_from(config_path: &str) -> Result<Self, StartupError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("store.path", "petronox.db")?
            .set_default("http.cors_origin", "*")?
            .set_default("http.static_max_age", 86_400)?
            .set_default("http.root", ".")?
            .set_default("http.gzip_min_size", 256)?
            .set_default("logging.access_log", true)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("PETRONOX")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", env::var("PETRONOX_PORT").ok())?
            .set_override_option("store.path", env::var("PETRONOX_DB").ok())?
            .set_override_option("http.cors_origin", env::var("PETRONOX_CORS_ORIGIN").ok())?
            .set_override_option(
                "http.static_max_age",
                env::var("PETRONOX_CACHE_MAX_AGE").ok(),
            )?
            .set_override_option("http.root", env::var("PETRONOX_ROOT").ok())?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| StartupError::Address { addr, source })
    }

    /// Fail fast on settings that would only surface once requests arrive
    pub fn validate(&self) -> Result<SocketAddr, StartupError> {
        if !self.store.path.is_file() {
            return Err(StartupError::MissingStore(self.store.path.clone()));
        }
        if self.server.workers == Some(0) {
            return Err(StartupError::ZeroWorkers);
        }
        self.get_socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config(store: PathBuf) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: None,
            },
            store: StoreConfig { path: store },
            http: HttpConfig {
                cors_origin: "*".to_string(),
                static_max_age: 86_400,
                root: PathBuf::from("."),
                index_files: vec!["index.html".to_string()],
                gzip_min_size: 256,
            },
            logging: LoggingConfig {
                access_log: true,
                access_log_format: "combined".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
        }
    }

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely-not-a-config-file").unwrap();
        assert!(!cfg.server.host.is_empty());
        assert!(cfg.http.gzip_min_size > 0);
        assert_eq!(cfg.http.index_files, vec!["index.html", "index.htm"]);
        assert_eq!(cfg.logging.access_log_format, "short");
    }

    #[test]
    fn test_validate_missing_store() {
        let cfg = sample_config(PathBuf::from("/nonexistent/petronox.db"));
        match cfg.validate() {
            Err(StartupError::MissingStore(path)) => {
                assert_eq!(path, PathBuf::from("/nonexistent/petronox.db"));
            }
            other => panic!("expected MissingStore, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_existing_store() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let cfg = sample_config(file.path().to_path_buf());
        let addr = cfg.validate().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut cfg = sample_config(file.path().to_path_buf());
        cfg.server.workers = Some(0);
        assert!(matches!(cfg.validate(), Err(StartupError::ZeroWorkers)));

        cfg.server.workers = Some(2);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_address() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut cfg = sample_config(file.path().to_path_buf());
        cfg.server.host = "not an address".to_string();
        assert!(matches!(cfg.validate(), Err(StartupError::Address { .. })));
    }
}
