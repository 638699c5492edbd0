use crate::config::ConfigError;
use crate::file_processor::FileProcessorError;
use crate::logging::{codes, Code};

/// Pipeline processing errors
///
/// Template diagnostics are never errors at this level; only failures to load
/// a source end a check early.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Configuration failed: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            PipelineError::FileProcessing(e) => e.error_code(),
            PipelineError::Config(e) => e.error_code(),
            PipelineError::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }
}
