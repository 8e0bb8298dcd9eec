/// Bridge configuration
///
/// Loaded from TOML/JSON files, with environment-variable overrides.
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Hard upper bound on a serialized protobuf message (2 GiB - 1).
pub const PROTOBUF_SIZE_LIMIT: usize = i32::MAX as usize;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File read error
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// Parse error
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// Validation error
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Python module holding the generated protobuf classes
    pub registry_module: String,

    /// Instance method that serializes a Python message to bytes
    pub serialize_method: String,

    /// Class method that builds a Python message from bytes
    pub construct_method: String,

    /// Largest serialized message accepted in either direction
    pub max_message_bytes: usize,

    /// Also print drained Python errors to `sys.stderr`
    pub print_tracebacks: bool,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            registry_module: "mesos_pb2".to_string(),
            serialize_method: "SerializeToString".to_string(),
            construct_method: "FromString".to_string(),
            max_message_bytes: PROTOBUF_SIZE_LIMIT,
            print_tracebacks: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// Parse from a TOML string
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// Parse from a JSON string
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save as a TOML file
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// Override fields from `PROTO_BRIDGE_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("PROTO_BRIDGE_REGISTRY_MODULE") {
            self.registry_module = val;
        }
        if let Ok(val) = env::var("PROTO_BRIDGE_SERIALIZE_METHOD") {
            self.serialize_method = val;
        }
        if let Ok(val) = env::var("PROTO_BRIDGE_CONSTRUCT_METHOD") {
            self.construct_method = val;
        }
        if let Ok(val) = env::var("PROTO_BRIDGE_MAX_MESSAGE_BYTES") {
            if let Ok(max) = val.parse() {
                self.max_message_bytes = max;
            }
        }
        if let Ok(val) = env::var("PROTO_BRIDGE_PRINT_TRACEBACKS") {
            self.print_tracebacks = val.parse().unwrap_or(self.print_tracebacks);
        }
        if let Ok(val) = env::var("PROTO_BRIDGE_LOG_LEVEL") {
            if let Some(level) = LogLevel::parse(&val) {
                self.logging.level = level;
            }
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.registry_module.split('.').all(is_identifier) {
            return Err(ConfigError::ValidationError(format!(
                "registry_module '{}' is not a module path",
                self.registry_module
            )));
        }
        for (field, name) in [
            ("serialize_method", &self.serialize_method),
            ("construct_method", &self.construct_method),
        ] {
            if !is_identifier(name) {
                return Err(ConfigError::ValidationError(format!(
                    "{} '{}' is not a method name",
                    field, name
                )));
            }
        }
        if self.max_message_bytes == 0 || self.max_message_bytes > PROTOBUF_SIZE_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "max_message_bytes must be in 1..={}",
                PROTOBUF_SIZE_LIMIT
            )));
        }
        Ok(())
    }

    /// Find and load a config file, falling back to defaults
    ///
    /// Search order:
    /// 1. ./proto_bridge.toml
    /// 2. ./proto_bridge.json
    /// 3. ~/.config/proto_bridge/config.toml
    /// 4. defaults
    ///
    /// Environment overrides are applied in every case. A result that fails
    /// [`validate`](Self::validate) is logged and replaced by the defaults.
    pub fn load_or_default() -> Self {
        let mut config = Self::load_first_found().unwrap_or_else(|| {
            tracing::debug!(target: "proto_bridge::config", "Using default configuration");
            Self::default()
        });
        config.apply_env_overrides();
        config.validated_or_default()
    }

    fn validated_or_default(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(e) => {
                tracing::error!(target: "proto_bridge::config", "{}; using default configuration", e);
                Self::default()
            }
        }
    }

    fn load_first_found() -> Option<Self> {
        if let Ok(config) = Self::from_toml_file("proto_bridge.toml") {
            tracing::debug!(target: "proto_bridge::config", "Loaded config from proto_bridge.toml");
            return Some(config);
        }

        if let Ok(config) = Self::from_json_file("proto_bridge.json") {
            tracing::debug!(target: "proto_bridge::config", "Loaded config from proto_bridge.json");
            return Some(config);
        }

        let home = env::var_os("HOME")?;
        let config_path = PathBuf::from(home)
            .join(".config")
            .join("proto_bridge")
            .join("config.toml");
        match Self::from_toml_file(&config_path) {
            Ok(config) => {
                tracing::debug!(target: "proto_bridge::config", "Loaded config from {:?}", config_path);
                Some(config)
            }
            Err(_) => None,
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    pub level: LogLevel,

    /// Colored output
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            ansi: true,
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
