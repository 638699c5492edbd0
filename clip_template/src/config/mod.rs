//! Configuration module
//!
//! Compile-time limits are generated by `build.rs` from `config/<profile>.toml`;
//! runtime preferences live in [`runtime`].

// Include generated constants from build.rs
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{
    BatchPreferences, ConfigError, FileProcessorPreferences, LoggingPreferences, RuntimeConfig,
    ValidationPreferences,
};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("CLIP_TEMPLATE_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("CLIP_TEMPLATE_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}
