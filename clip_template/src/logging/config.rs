//! Logging configuration: compile-time buffer limits plus runtime user preferences

use crate::config::compile_time::logging::LOG_BUFFER_SIZE;
use crate::config::runtime::LoggingPreferences;
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Initialize runtime preferences (first call wins)
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime logging preferences already initialized".to_string())
}

/// Get runtime preferences (with fallback to environment defaults)
fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

/// Get minimum log level
pub fn get_min_log_level() -> LogLevel {
    get_runtime_preferences().min_log_level.to_events_log_level()
}

/// Check if structured (JSON lines) logging is enabled
pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

/// Maximum number of events retained by in-memory loggers
pub fn get_event_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

/// Human-readable summary of the active logging configuration
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();
    format!(
        "Logging configuration:\n  console: {}\n  structured: {}\n  min level: {}\n  buffer size: {}\n",
        preferences.enable_console_logging,
        preferences.use_structured_logging,
        preferences.min_log_level.as_str(),
        LOG_BUFFER_SIZE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_summary_mentions_levels() {
        let summary = get_config_summary();
        assert!(summary.contains("min level:"));
        assert!(summary.contains("buffer size:"));
    }

    #[test]
    fn test_buffer_size_is_positive() {
        assert!(get_event_buffer_size() > 0);
    }
}
