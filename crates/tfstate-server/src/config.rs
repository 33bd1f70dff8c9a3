use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tfstate_engine::WritePolicy;

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub write_policy: WritePolicy,
    /// Upper bound on any request body, state uploads included.
    pub max_body_bytes: usize,
    /// Reject state uploads that are not JSON before they reach the store.
    pub reject_invalid_state: bool,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            write_policy: WritePolicy::Permissive,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            reject_invalid_state: false,
            log_level: "info".into(),
            log_format: LogFormat::Text,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.write_policy, WritePolicy::Permissive);
        assert_eq!(c.max_body_bytes, 64 * 1024 * 1024);
        assert!(!c.reject_invalid_state);
        assert_eq!(c.log_format, LogFormat::Text);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:9000"
            write_policy = "require-lock"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.write_policy, WritePolicy::RequireLock);
        assert_eq!(c.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(c.log_level, "info");
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = ServerConfig::from_toml_str("write_policy = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn toml_roundtrip_through_file() {
        let mut c = ServerConfig::default();
        c.log_format = LogFormat::Json;
        c.reject_invalid_state = true;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tfstate.toml");
        std::fs::write(&path, c.to_toml_string().unwrap()).unwrap();
        assert_eq!(ServerConfig::load(&path).unwrap(), c);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ServerConfig::load(Path::new("/nonexistent/tfstate.toml")).unwrap_err();
        assert!(matches!(err, ServerError::Io(_)));
    }
}
