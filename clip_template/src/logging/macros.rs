//! Type-safe logging macros using Code types with Display support
//!
//! Every macro is a no-op until the global logger has been initialised, so the
//! library can be embedded without any logging setup.

/// Log error with Code type - accepts Display types for context values
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log_error_with_context($code, $message, None, vec![])
    };

    ($code:expr, $message:expr, position = $position:expr) => {
        $crate::logging::log_error_with_context($code, $message, Some($position), vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_error_with_context($code, $message, None, context_refs)
        }
    };

    ($code:expr, $message:expr, position = $position:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_error_with_context($code, $message, Some($position), context_refs)
        }
    };
}

/// Log success with Code type - accepts Display types for context values
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::log_success_with_context($code, $message, vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_success_with_context($code, $message, context_refs)
        }
    };
}

/// Log informational message - accepts Display types for context values
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::log_with_context($crate::logging::LogEvent::info($message), vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_with_context($crate::logging::LogEvent::info($message), context_refs)
        }
    };
}

/// Log warning message - accepts Display types for context values
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        $crate::logging::log_with_context($crate::logging::LogEvent::warning($message), vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_with_context($crate::logging::LogEvent::warning($message), context_refs)
        }
    };
}

/// Log debug message - accepts Display types for context values
///
/// Context values are only formatted when a logger is installed and accepts
/// debug events, so hot paths can call this freely.
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::log_with_context($crate::logging::LogEvent::debug($message), vec![])
        }
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::debug_enabled() {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_with_context($crate::logging::LogEvent::debug($message), context_refs)
        }
    };
}
