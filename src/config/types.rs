// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATA_PATH: &str = "climate_data.csv";
/// 10x6 inch figure at 100 dpi
pub const DEFAULT_CHART_WIDTH: u32 = 1000;
pub const DEFAULT_CHART_HEIGHT: u32 = 600;
pub const DEFAULT_CHART_TITLE: &str = "Temperature Changes Over Years";
pub const DEFAULT_SERVER_NAME: &str = "climate-tracker";

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub chart: ChartConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: None,
        }
    }
}

/// Location of the climate CSV, read fresh on every request
#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DATA_PATH.to_string(),
        }
    }
}

/// Chart rendering configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// TrueType font used for title and axis labels.
    /// Well-known system paths are searched when unset.
    #[serde(default)]
    pub font_path: Option<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CHART_WIDTH,
            height: DEFAULT_CHART_HEIGHT,
            title: DEFAULT_CHART_TITLE.to_string(),
            font_path: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string(),
            enable_cors: false,
        }
    }
}
