// Configuration module entry point
// Loads config.toml + CLIMATE__* environment overrides and holds runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::Config;

use types::{
    DEFAULT_CHART_HEIGHT, DEFAULT_CHART_TITLE, DEFAULT_CHART_WIDTH, DEFAULT_DATA_PATH,
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SERVER_NAME,
};

/// Default config file name, resolved with any supported extension
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix for environment overrides, e.g. `CLIMATE__SERVER__PORT=8080`
const ENV_PREFIX: &str = "CLIMATE";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// A missing file is not an error: defaults and environment still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("data.path", DEFAULT_DATA_PATH)?
            .set_default("chart.width", i64::from(DEFAULT_CHART_WIDTH))?
            .set_default("chart.height", i64::from(DEFAULT_CHART_HEIGHT))?
            .set_default("chart.title", DEFAULT_CHART_TITLE)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", DEFAULT_SERVER_NAME)?
            .set_default("http.enable_cors", false)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let cfg = Config::load_from("definitely/not/a/real/config").unwrap();
        assert_eq!(cfg.server.port, DEFAULT_PORT);
        assert_eq!(cfg.data.path, DEFAULT_DATA_PATH);
        assert_eq!(cfg.chart.width, 1000);
        assert_eq!(cfg.chart.height, 600);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.chart.font_path.is_none());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[data]\npath = \"/srv/temps.csv\"\n\n[chart]\nwidth = 800"
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.data.path, "/srv/temps.csv");
        assert_eq!(cfg.chart.width, 800);
        assert_eq!(cfg.chart.height, DEFAULT_CHART_HEIGHT);
    }

    /// Sets an environment variable for the lifetime of the guard
    struct EnvVar(&'static str);

    impl EnvVar {
        fn set(key: &'static str, value: &str) -> Self {
            std::env::set_var(key, value);
            Self(key)
        }
    }

    impl Drop for EnvVar {
        fn drop(&mut self) {
            std::env::remove_var(self.0);
        }
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.toml");
        std::fs::write(&path, "[http]\nserver_name = \"from-file\"\n").unwrap();

        // Keys no other test asserts on, since tests share the process environment
        let _name = EnvVar::set("CLIMATE__HTTP__SERVER_NAME", "from-env");
        let _limit = EnvVar::set("CLIMATE__PERFORMANCE__MAX_CONNECTIONS", "64");

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.http.server_name, "from-env");
        assert_eq!(cfg.performance.max_connections, Some(64));
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::default();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:5000".parse::<SocketAddr>().unwrap()
        );

        let mut bad = Config::default();
        bad.server.host = "not a host".to_string();
        assert!(bad.get_socket_addr().is_err());
    }
}
