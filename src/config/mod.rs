// Configuration module entry point
// Loads layered configuration and holds the per-process application state

mod state;
mod types;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Default config file (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";
/// Default dotenv-style file
pub const DEFAULT_ENV_FILE: &str = ".env";
/// Prefix for environment overrides, e.g. `LOCATION_SERVER__PORT=9090`
const ENV_PREFIX: &str = "LOCATION";
const ENV_SEPARATOR: &str = "__";

impl Config {
    /// Load configuration from the default locations
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH, DEFAULT_ENV_FILE)
    }

    /// Load configuration from the given config file (without extension) and env file.
    ///
    /// Sources, later ones winning: built-in defaults, config file,
    /// env file, process environment. Both files are optional, but a file
    /// that exists and cannot be parsed is an error.
    pub fn load_from(config_path: &str, env_file: &str) -> Result<Self, config::ConfigError> {
        let env_file_vars = read_env_file(env_file)?;
        Self::load_with_env(config_path, env_file_vars, None)
    }

    /// `process_env` replaces the real process environment when given (tests)
    fn load_with_env(
        config_path: &str,
        env_file_vars: HashMap<String, String>,
        process_env: Option<HashMap<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(env_source().source(Some(env_file_vars.into_iter().collect())))
            .add_source(env_source().source(process_env.map(|vars| vars.into_iter().collect())))
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Upper bound on the lifetime of one connection
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(std::cmp::max(
            self.performance.read_timeout,
            self.performance.write_timeout,
        ))
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

/// Read `KEY=VALUE` lines from a dotenv-style file; a missing file yields no variables
fn read_env_file(path: &str) -> Result<HashMap<String, String>, config::ConfigError> {
    if !Path::new(path).is_file() {
        return Ok(HashMap::new());
    }

    config::Config::builder()
        .add_source(config::File::new(path, config::FileFormat::Ini))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{AccessLogFormat, LogLevel};
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "location_gate_cfg_{}_{name}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::load_with_env("does/not/exist", HashMap::new(), Some(HashMap::new()))
            .unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.workers, None);
        assert_eq!(cfg.logging.level, LogLevel::Info);
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, AccessLogFormat::Combined);
        assert_eq!(cfg.performance.max_connections, None);
        assert_eq!(cfg.connection_timeout(), Duration::from_secs(30));
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let dir = scratch_dir("toml");
        std::fs::write(
            dir.join("server.toml"),
            "[server]\nport = 9000\nworkers = 2\n\n[logging]\nlevel = \"debug\"\naccess_log_format = \"json\"\n\n[performance]\nread_timeout = 5\nwrite_timeout = 60\nmax_connections = 100\n",
        )
        .unwrap();
        let path = dir.join("server");

        let cfg = Config::load_with_env(path.to_str().unwrap(), HashMap::new(), Some(HashMap::new()))
            .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.logging.level, LogLevel::Debug);
        assert_eq!(cfg.logging.access_log_format, AccessLogFormat::Json);
        assert_eq!(cfg.performance.max_connections, Some(100));
        assert_eq!(cfg.connection_timeout(), Duration::from_secs(60));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_env_file_is_read() {
        let dir = scratch_dir("dotenv");
        let env_path = dir.join(".env");
        std::fs::write(
            &env_path,
            "# local overrides\nLOCATION_SERVER__PORT=9100\nLOCATION_LOGGING__ACCESS_LOG=false\nUNRELATED=1\n",
        )
        .unwrap();

        let env_vars = read_env_file(env_path.to_str().unwrap()).unwrap();
        let cfg = Config::load_with_env("does/not/exist", env_vars, Some(HashMap::new())).unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert!(!cfg.logging.access_log);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_env_file_is_empty() {
        assert!(read_env_file("does/not/exist.env").unwrap().is_empty());
    }

    #[test]
    fn test_process_env_beats_env_file() {
        let cfg = Config::load_with_env(
            "does/not/exist",
            vars(&[("LOCATION_SERVER__PORT", "9100"), ("LOCATION_SERVER__HOST", "127.0.0.1")]),
            Some(vars(&[("LOCATION_SERVER__PORT", "9200")])),
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9200);
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let result = Config::load_with_env(
            "does/not/exist",
            HashMap::new(),
            Some(vars(&[("LOCATION_SERVER__PORT", "not-a-port")])),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_host_address() {
        let mut cfg =
            Config::load_with_env("does/not/exist", HashMap::new(), Some(HashMap::new())).unwrap();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
