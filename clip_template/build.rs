// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    validation: ValidationLimits,
    file_processing: FileProcessingLimits,
    batch_processing: BatchProcessingLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_parse_depth: usize,
    max_lookahead_tokens: usize,
}

#[derive(serde::Deserialize)]
struct ValidationLimits {
    max_reported_unknown_variables: usize,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_files_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_log_message_length: usize,
    log_buffer_size: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=CLIP_TEMPLATE_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=CLIP_TEMPLATE_CONFIG_DIR");

    let profile =
        env::var("CLIP_TEMPLATE_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("CLIP_TEMPLATE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of clip_template directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig) {
    if config.syntax.max_parse_depth == 0 || config.syntax.max_parse_depth > 1_000 {
        panic!("max_parse_depth must be between 1 and 1000");
    }

    if config.syntax.max_lookahead_tokens == 0 {
        panic!("max_lookahead_tokens cannot be zero");
    }

    if config.lexical.max_token_count == 0 {
        panic!("max_token_count cannot be zero");
    }

    if config.logging.log_buffer_size == 0 {
        panic!("log_buffer_size cannot be zero");
    }

    if config.batch_processing.max_worker_threads == 0 {
        panic!("max_worker_threads cannot be zero");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const MAX_TOKEN_COUNT: usize = {};
    }}

    pub mod syntax {{
        pub const MAX_PARSE_DEPTH: usize = {};
        pub const MAX_LOOKAHEAD_TOKENS: usize = {};
    }}

    pub mod validation {{
        pub const MAX_REPORTED_UNKNOWN_VARIABLES: usize = {};
    }}

    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_FILES_PER_BATCH: usize = {};
    }}

    pub mod logging {{
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const LOG_BUFFER_SIZE: usize = {};
    }}
}}
"#,
        profile,
        config.lexical.max_token_count,
        config.syntax.max_parse_depth,
        config.syntax.max_lookahead_tokens,
        config.validation.max_reported_unknown_variables,
        config.file_processing.max_file_size,
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_files_per_batch,
        config.logging.max_log_message_length,
        config.logging.log_buffer_size,
    );

    fs::write(output_path, constants_code).unwrap();
}
