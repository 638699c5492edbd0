//! Event system for template engine logging

use super::codes::Code;
use crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
use crate::utils::Position;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
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
}

/// Core log event structure
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub position: Option<Position>,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: truncate_message(message),
            position: None,
            context: BTreeMap::new(),
        }
    }

    /// Create a new error event
    pub fn error(error_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, error_code, message)
    }

    /// Create a new warning event (warnings may not have codes)
    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, Code::new("W000"), message)
    }

    /// Create a new info event
    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, Code::new("I000"), message)
    }

    /// Create a success event (info with success code)
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, success_code, message)
    }

    /// Create a debug event
    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, Code::new("D000"), message)
    }

    /// Add position information
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Add context data
    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    pub fn is_debug(&self) -> bool {
        self.level == LogLevel::Debug
    }

    /// Get severity from code
    pub fn severity(&self) -> &'static str {
        super::codes::get_severity(self.code.as_str()).as_str()
    }

    /// Get code category
    pub fn category(&self) -> &'static str {
        super::codes::get_category(self.code.as_str())
    }

    /// Format for display
    pub fn format(&self) -> String {
        let position_str = self
            .position
            .map(|p| format!(" at {}:{}", p.line, p.column))
            .unwrap_or_default();

        let context_str = if self.context.is_empty() {
            String::new()
        } else {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            format!(" ({})", pairs.join(", "))
        };

        format!(
            "[{}] {} - {}{}{}",
            self.level.as_str(),
            self.code.as_str(),
            self.message,
            position_str,
            context_str
        )
    }

    /// Format as JSON for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "category": self.category(),
            "severity": self.severity(),
        });

        if self.is_error() {
            json["error_metadata"] = serde_json::json!({
                "description": super::codes::get_description(self.code.as_str()),
                "recommended_action": super::codes::get_action(self.code.as_str()),
            });
        }

        if let Some(position) = &self.position {
            json["position"] = serde_json::json!({
                "line": position.line,
                "column": position.column,
            });
        }

        if !self.context.is_empty() {
            json["context"] = serde_json::Value::Object(
                self.context
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
            );
        }

        serde_json::to_string(&json)
    }
}

fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_LOG_MESSAGE_LENGTH {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(MAX_LOG_MESSAGE_LENGTH).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::file_processing::FILE_NOT_FOUND, "File not found");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E005");
        assert_eq!(event.message, "File not found");
        assert_eq!(event.category(), "FileProcessing");
    }

    #[test]
    fn test_event_with_context() {
        let event = LogEvent::success(codes::success::TOKENIZATION_COMPLETE, "done")
            .with_context("tokens", "12")
            .with_context("errors", "0");

        assert!(event.is_info());
        assert_eq!(event.context.get("tokens"), Some(&"12".to_string()));
        assert_eq!(event.format(), "[INFO] I020 - done (errors=0, tokens=12)");
    }

    #[test]
    fn test_event_formatting_with_position() {
        let event = LogEvent::error(codes::lexical::UNEXPECTED_CHARACTER, "Unexpected character")
            .with_position(Position::new(4, 1, 5));
        let formatted = event.format();

        assert!(formatted.contains("[ERROR]"));
        assert!(formatted.contains("E020"));
        assert!(formatted.contains("at 1:5"));
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::error(codes::file_processing::PERMISSION_DENIED, "Access denied")
            .with_context("file", "note.template");

        let json: serde_json::Value =
            serde_json::from_str(&event.format_json().unwrap()).unwrap();
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["code"], "E009");
        assert_eq!(json["context"]["file"], "note.template");
        assert!(json["timestamp"].as_str().is_some());
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let long = "x".repeat(MAX_LOG_MESSAGE_LENGTH + 10);
        let event = LogEvent::debug(&long);
        assert_eq!(event.message.chars().count(), MAX_LOG_MESSAGE_LENGTH + 3);
        assert!(event.message.ends_with("..."));
    }
}
