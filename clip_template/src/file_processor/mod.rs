//! File processor module: template text files and clipper template JSON

pub mod clipper;
mod processor;

use crate::config::compile_time::file_processing::MAX_FILE_SIZE;
use std::path::Path;

pub use clipper::{ClipperProperty, ClipperTemplate, TemplateField};
pub use processor::{
    FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError, SourceKind,
    TEMPLATE_EXTENSIONS,
};

/// Process a file with default settings
pub fn process_file(file_path: impl AsRef<Path>) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

/// Load and parse a clipper template JSON file
pub fn load_clipper_template(
    processor: &FileProcessor,
    file_path: impl AsRef<Path>,
) -> Result<ClipperTemplate, FileProcessorError> {
    let result = processor.process_file(file_path)?;
    ClipperTemplate::from_json(&result.source, &result.metadata.path)
}

/// Get the compile-time maximum file size limit
pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE
}
