// RUNTIME PREFERENCES (User Experience)
//
// Defaults come from CLIP_TEMPLATE_* environment variables; a TOML file loaded
// with `RuntimeConfig::load` overrides individual fields.

use crate::config::compile_time::{batch_processing, file_processing};
use crate::logging::{codes, Code};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPreferences {
    /// Extra variable names accepted in addition to the preset list
    pub known_variables: Vec<String>,

    /// Whether unknown variables get a "did you mean" suggestion
    pub suggest_corrections: bool,

    /// Whether bare identifiers used as filter arguments are checked as variables
    pub check_filter_arguments: bool,
}

impl Default for ValidationPreferences {
    fn default() -> Self {
        Self {
            known_variables: env::var(env_vars::VALIDATION_KNOWN_VARIABLES)
                .ok()
                .map(|v| parse_name_list(&v))
                .unwrap_or_default(),
            suggest_corrections: env::var(env_vars::VALIDATION_SUGGEST_CORRECTIONS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            check_filter_arguments: env::var(env_vars::VALIDATION_CHECK_FILTER_ARGUMENTS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

impl ValidationPreferences {
    /// Add names to the known variable list, skipping duplicates
    pub fn with_known_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.known_variables.contains(&name) {
                self.known_variables.push(name);
            }
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to reject files whose extension is not a template extension
    pub require_template_extension: bool,

    /// Maximum accepted file size; never above the compile-time limit
    pub max_file_size: u64,

    /// Whether to log timing details for each file
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_template_extension: env::var(env_vars::REQUIRE_TEMPLATE_EXTENSION)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            max_file_size: env::var(env_vars::MAX_FILE_SIZE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(file_processing::MAX_FILE_SIZE),
            enable_performance_logging: env::var(env_vars::ENABLE_PERFORMANCE_LOGGING)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

impl FileProcessorPreferences {
    /// Effective size limit after clamping to the compile-time maximum
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.min(file_processing::MAX_FILE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPreferences {
    /// Worker threads used for directory checks; 1 means sequential
    pub max_threads: usize,

    /// Whether directories are searched recursively
    pub recursive: bool,

    /// File extensions picked up during discovery
    pub extensions: Vec<String>,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        let default_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        Self {
            max_threads: env::var(env_vars::BATCH_MAX_THREADS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default_threads)
                .clamp(1, batch_processing::MAX_WORKER_THREADS),
            recursive: env::var(env_vars::BATCH_RECURSIVE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            extensions: env::var(env_vars::BATCH_EXTENSIONS)
                .ok()
                .map(|v| parse_name_list(&v))
                .unwrap_or_else(|| {
                    vec![
                        "template".to_string(),
                        "tmpl".to_string(),
                        "json".to_string(),
                    ]
                }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to emit JSON lines instead of plain text
    pub use_structured_logging: bool,

    /// Whether log events are written to the console at all
    pub enable_console_logging: bool,

    /// Minimum log level
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Split a comma-separated list, dropping blanks
fn parse_name_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration loading errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid configuration in {path}: {message}")]
    Parse { path: String, message: String },
}

impl ConfigError {
    pub fn error_code(&self) -> Code {
        codes::config::INVALID_CONFIGURATION
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub validation: ValidationPreferences,
    pub batch: BatchPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Load a TOML configuration file; sections and fields left out keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: RuntimeConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.batch.max_threads = config
            .batch
            .max_threads
            .clamp(1, batch_processing::MAX_WORKER_THREADS);
        Ok(config)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Validation
    pub const VALIDATION_KNOWN_VARIABLES: &str = "CLIP_TEMPLATE_KNOWN_VARIABLES";
    pub const VALIDATION_SUGGEST_CORRECTIONS: &str = "CLIP_TEMPLATE_SUGGEST_CORRECTIONS";
    pub const VALIDATION_CHECK_FILTER_ARGUMENTS: &str = "CLIP_TEMPLATE_CHECK_FILTER_ARGUMENTS";

    // File Processor
    pub const REQUIRE_TEMPLATE_EXTENSION: &str = "CLIP_TEMPLATE_REQUIRE_EXTENSION";
    pub const MAX_FILE_SIZE: &str = "CLIP_TEMPLATE_MAX_FILE_SIZE";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "CLIP_TEMPLATE_PERFORMANCE_LOGGING";

    // Batch
    pub const BATCH_MAX_THREADS: &str = "CLIP_TEMPLATE_THREADS";
    pub const BATCH_RECURSIVE: &str = "CLIP_TEMPLATE_RECURSIVE";
    pub const BATCH_EXTENSIONS: &str = "CLIP_TEMPLATE_EXTENSIONS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "CLIP_TEMPLATE_LOG_JSON";
    pub const LOGGING_ENABLE_CONSOLE: &str = "CLIP_TEMPLATE_LOG_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "CLIP_TEMPLATE_LOG_LEVEL";
}
