//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración por argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./triehttp --port 4221 --directory /tmp/files --read-timeout-ms 5000
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=127.0.0.1 FILES_DIR=/tmp/files ./triehttp
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errores de validación de la configuración
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("port must be >= 1")]
    InvalidPort,

    #[error("max head bytes must be >= 1")]
    InvalidHeadLimit,

    #[error("files directory {0} is not a directory")]
    NotADirectory(PathBuf),
}

/// Configuración del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "triehttp")]
#[command(about = "Servidor HTTP/1.1 mínimo con router trie y middleware")]
#[command(version)]
pub struct Config {
    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "4221", env = "HTTP_PORT")]
    pub port: u16,

    /// Directorio raíz de las rutas /files/:filename
    #[arg(long, env = "FILES_DIR")]
    pub directory: Option<PathBuf>,

    // === Timeouts ===

    /// Timeout de lectura por conexión en milisegundos (0 = sin límite)
    #[arg(long = "read-timeout-ms", default_value = "30000", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Timeout de escritura por conexión en milisegundos (0 = sin límite)
    #[arg(long = "write-timeout-ms", default_value = "30000", env = "WRITE_TIMEOUT_MS")]
    pub write_timeout_ms: u64,

    // === Límites ===

    /// Tamaño máximo de la cabecera del request
    #[arg(long = "max-head-bytes", default_value = "8192", env = "MAX_HEAD_BYTES")]
    pub max_head_bytes: usize,

    /// Tamaño máximo del body (Content-Length mayor → 413)
    #[arg(long = "max-body-bytes", default_value = "1048576", env = "MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    /// Nivel de log (RUST_LOG tiene prioridad)
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,
}

/// Límites que aplica el servidor a cada conexión
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionLimits {
    pub read_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
    pub max_head_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Config::default().connection_limits()
    }
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección completa para bind (host:port)
    ///
    /// ```rust
    /// use triehttp::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:4221");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.max_head_bytes == 0 {
            return Err(ConfigError::InvalidHeadLimit);
        }
        if let Some(dir) = &self.directory {
            if !dir.is_dir() {
                return Err(ConfigError::NotADirectory(dir.clone()));
            }
        }
        Ok(())
    }

    pub fn connection_limits(&self) -> ConnectionLimits {
        ConnectionLimits {
            read_timeout: millis(self.read_timeout_ms),
            write_timeout: millis(self.write_timeout_ms),
            max_head_bytes: self.max_head_bytes,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// 0 significa "sin timeout"
fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4221,
            directory: None,
            read_timeout_ms: 30_000,
            write_timeout_ms: 30_000,
            max_head_bytes: 8192,
            max_body_bytes: 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 4221);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.directory.is_none());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_default_matches_cli_defaults() {
        let parsed = Config::try_parse_from(["triehttp"]).unwrap();
        let default = Config::default();
        assert_eq!(parsed.host, default.host);
        assert_eq!(parsed.port, default.port);
        assert_eq!(parsed.read_timeout_ms, default.read_timeout_ms);
        assert_eq!(parsed.max_head_bytes, default.max_head_bytes);
        assert_eq!(parsed.max_body_bytes, default.max_body_bytes);
    }

    #[test]
    fn test_parse_cli_flags() {
        let config = Config::try_parse_from([
            "triehttp",
            "--port",
            "8080",
            "--directory",
            "/tmp/files",
            "--read-timeout-ms",
            "0",
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.directory, Some(PathBuf::from("/tmp/files")));
        assert_eq!(config.connection_limits().read_timeout, None);
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_port() {
        let mut config = Config::default();
        config.port = 0;
        let result = config.validate();
        assert_eq!(result, Err(ConfigError::InvalidPort));
        assert!(result.unwrap_err().to_string().contains("port"));
    }

    #[test]
    fn test_validate_invalid_head_limit() {
        let mut config = Config::default();
        config.max_head_bytes = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidHeadLimit));
    }

    #[test]
    fn test_validate_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.directory = Some(dir.path().to_path_buf());
        assert!(config.validate().is_ok());

        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        config.directory = Some(file.clone());
        assert_eq!(config.validate(), Err(ConfigError::NotADirectory(file)));
    }

    #[test]
    fn test_connection_limits() {
        let mut config = Config::default();
        config.write_timeout_ms = 1500;
        let limits = config.connection_limits();
        assert_eq!(limits.read_timeout, Some(Duration::from_secs(30)));
        assert_eq!(limits.write_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(limits.max_head_bytes, 8192);
        assert_eq!(limits, {
            let mut l = ConnectionLimits::default();
            l.write_timeout = Some(Duration::from_millis(1500));
            l
        });
    }
}
