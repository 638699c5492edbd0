//! Global logging module
//!
//! Provides thread-safe global logging with per-thread file context and a
//! clean macro interface. Nothing is emitted until `init_global_logging` runs.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

// Re-export main types
pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<PathBuf>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the runtime logging preferences
pub fn init_global_logging() -> Result<(), String> {
    let logging_service = Arc::new(LoggingService::with_config());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized".to_string())?;

    let test_codes = ["ERR001", "E005", "E020", "E040", "W100"];
    for &code in &test_codes {
        if codes::get_description(code) == "Unknown error" {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

/// Check if global logging is initialized
pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Whether a debug event would reach a logger (used by `log_debug!`)
pub fn debug_enabled() -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(LogLevel::Debug))
        .unwrap_or(false)
}

// ============================================================================
// FILE CONTEXT MANAGEMENT
// ============================================================================

/// Execute function with the given file attached to every event logged on this thread
pub fn with_file_context<F, R>(file_path: &Path, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = FILE_CONTEXT.with(|ctx| ctx.borrow_mut().replace(file_path.to_path_buf()));
    let result = f();
    FILE_CONTEXT.with(|ctx| *ctx.borrow_mut() = previous);
    result
}

/// Get current file context
pub fn get_current_file_context() -> Option<PathBuf> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn dispatch(mut event: LogEvent, context: Vec<(&str, &str)>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if let Some(file_path) = get_current_file_context() {
        event = event.with_context("file", &file_path.display().to_string());
    }

    logger.log_event(event);
}

/// Log error with context (used by log_error! macro)
pub fn log_error_with_context(
    code: Code,
    message: &str,
    position: Option<crate::utils::Position>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::error(code, message);
    if let Some(p) = position {
        event = event.with_position(p);
    }
    dispatch(event, context);
}

/// Log success with context (used by log_success! macro)
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(LogEvent::success(code, message), context);
}

/// Log a prepared event with context (used by log_info!, log_warning! and log_debug!)
pub fn log_with_context(event: LogEvent, context: Vec<(&str, &str)>) {
    dispatch(event, context);
}

/// Safe error logging that falls back to stderr when logging is not initialized
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::error(code, message));
    } else {
        eprintln!("[ERROR] [{}] {}", code.as_str(), message);
    }
}
