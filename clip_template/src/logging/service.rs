//! Logging service and logger backends

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::sync::{Arc, Mutex, MutexGuard};

/// Simple logger trait
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Main logging service with configuration awareness
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    /// Create new logging service with specified logger and minimum level
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Create service from the runtime logging preferences
    pub fn with_config() -> Self {
        let min_level = config::get_min_log_level();
        let logger: Arc<dyn Logger> = if config::use_structured_logging() {
            Arc::new(StructuredLogger::new(min_level))
        } else {
            Arc::new(ConsoleLogger::new(min_level))
        };

        Self::new(logger, min_level)
    }

    /// Check if level should be logged
    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    /// Log an event
    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn log_error(&self, error_code: Code, message: &str) {
        self.log_event(LogEvent::error(error_code, message));
    }

    pub fn log_success(&self, success_code: Code, message: &str) {
        self.log_event(LogEvent::success(success_code, message));
    }

    pub fn log_info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }

    pub fn log_debug(&self, message: &str) {
        self.log_event(LogEvent::debug(message));
    }
}

/// Plain-text logger writing to stderr so that report output on stdout stays clean
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            eprintln!("{}", event.format());
        }
    }
}

/// JSON-lines logger for tooling integration
pub struct StructuredLogger {
    min_level: LogLevel,
}

impl StructuredLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            match event.format_json() {
                Ok(json) => eprintln!("{}", json),
                // Fallback to regular format if JSON serialization fails
                Err(_) => eprintln!("{}", event.format()),
            }
        }
    }
}

/// Memory logger for testing
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn events(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.events().clone()
    }

    pub fn clear(&self) {
        self.events().clear();
    }

    pub fn event_count(&self) -> usize {
        self.events().len()
    }

    pub fn get_errors(&self) -> Vec<LogEvent> {
        self.events()
            .iter()
            .filter(|e| e.is_error())
            .cloned()
            .collect()
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.events()
            .iter()
            .any(|e| e.is_error() && e.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.events().iter().any(|e| e.is_info() && e.code == code)
    }

    pub fn get_events_by_category(&self, category: &str) -> Vec<LogEvent> {
        self.events()
            .iter()
            .filter(|e| e.category() == category)
            .cloned()
            .collect()
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.events();

        let max_events = config::get_event_buffer_size();
        if events.len() >= max_events {
            let remove_count = events.len() - max_events + 1;
            events.drain(0..remove_count);
        }

        events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_memory_logger() {
        let logger = MemoryLogger::new();

        logger.log(&LogEvent::info("Message 1"));
        logger.log(&LogEvent::error(
            codes::lexical::UNEXPECTED_CHARACTER,
            "Error message",
        ));

        assert_eq!(logger.event_count(), 2);
        assert_eq!(logger.get_errors().len(), 1);
        assert!(logger.has_error_with_code(codes::lexical::UNEXPECTED_CHARACTER));

        logger.clear();
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_logging_service() {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Debug);

        service.log_error(codes::file_processing::PERMISSION_DENIED, "Test error");
        service.log_success(codes::success::FILE_PROCESSING_SUCCESS, "Test success");
        service.log_info("Test info");
        service.log_debug("Test debug");

        assert_eq!(logger.event_count(), 4);
        assert!(logger.has_error_with_code(codes::file_processing::PERMISSION_DENIED));
        assert!(logger.has_success_with_code(codes::success::FILE_PROCESSING_SUCCESS));
    }

    #[test]
    fn test_log_level_filtering() {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Error);

        service.log_debug("Debug message");
        service.log_info("Info message");
        service.log_error(codes::system::INTERNAL_ERROR, "Error message");

        assert_eq!(logger.event_count(), 1);
        assert!(logger.has_error_with_code(codes::system::INTERNAL_ERROR));
    }

    #[test]
    fn test_event_categorization() {
        let logger = MemoryLogger::new();

        logger.log(&LogEvent::error(
            codes::file_processing::FILE_NOT_FOUND,
            "File error",
        ));
        logger.log(&LogEvent::error(codes::syntax::MISSING_ENDIF, "Syntax error"));

        assert_eq!(logger.get_events_by_category("FileProcessing").len(), 1);
        assert_eq!(logger.get_events_by_category("Syntax").len(), 1);

        let codes: Vec<String> = logger
            .get_events()
            .iter()
            .map(|e| e.code.to_string())
            .collect();
        assert_eq!(codes, vec!["E005", "E043"]);
    }

    #[test]
    fn test_console_and_structured_loggers_do_not_panic() {
        let event = LogEvent::error(codes::syntax::UNKNOWN_TAG, "Unknown tag 'macro'")
            .with_context("file", "note.template");
        ConsoleLogger::new(LogLevel::Debug).log(&event);
        StructuredLogger::new(LogLevel::Debug).log(&event);
    }
}
