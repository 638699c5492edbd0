//! Template file loading with size limits and global logging integration

use crate::config::compile_time::file_processing::MAX_FILE_SIZE;
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions accepted when the extension requirement is switched on
pub const TEMPLATE_EXTENSIONS: &[&str] = &["template", "tmpl", "json"];

/// File processor specific errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected one of .template, .tmpl, .json, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("Invalid clipper template in {path}: {message}")]
    InvalidTemplateFile { path: String, message: String },
}

impl FileProcessorError {
    /// Get the appropriate error code for this error type
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::InvalidExtension { .. } => {
                codes::file_processing::INVALID_EXTENSION
            }
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            FileProcessorError::IoError { .. } => codes::file_processing::IO_ERROR,
            FileProcessorError::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
            FileProcessorError::InvalidTemplateFile { .. } => {
                codes::file_processing::INVALID_TEMPLATE_FILE
            }
        }
    }

    /// Get error severity
    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }
}

/// What a source file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Raw template text
    Template,
    /// Exported clipper template JSON with several template fields
    ClipperJson,
}

impl SourceKind {
    fn from_extension(extension: Option<&str>) -> Self {
        match extension {
            Some("json") => SourceKind::ClipperJson,
            _ => SourceKind::Template,
        }
    }
}

/// File metadata collected during processing
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Lowercased extension, if any
    pub extension: Option<String>,
    pub line_count: usize,
    pub kind: SourceKind,
}

impl FileMetadata {
    /// Get file size in human-readable format
    pub fn human_readable_size(&self) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size = self.size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", self.size, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    pub fn has_template_extension(&self) -> bool {
        self.extension
            .as_deref()
            .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext))
    }
}

/// File processing result containing source and metadata
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    /// File contents as UTF-8 string
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: std::time::Duration,
}

impl FileProcessingResult {
    /// Get character count
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }
}

/// Loads template sources under the compile-time size ceiling and runtime preferences
#[derive(Debug, Clone)]
pub struct FileProcessor {
    pub require_template_extension: bool,
    /// Size limit in bytes, never above the compile-time maximum
    pub max_file_size: u64,
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    /// Create new file processor with default preferences
    pub fn new() -> Self {
        Self {
            require_template_extension: false,
            max_file_size: MAX_FILE_SIZE,
            enable_performance_logging: false,
        }
    }

    /// Create file processor from runtime preferences
    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_template_extension: prefs.require_template_extension,
            max_file_size: prefs.effective_max_file_size(),
            enable_performance_logging: prefs.enable_performance_logging,
        }
    }

    pub fn with_template_extension_required(mut self, required: bool) -> Self {
        self.require_template_extension = required;
        self
    }

    /// Lower the size limit; values above the compile-time maximum are clamped
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size.min(MAX_FILE_SIZE);
        self
    }

    /// Process a file and return contents with metadata
    pub fn process_file(
        &self,
        file_path: impl AsRef<Path>,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let file_path = file_path.as_ref();
        let start_time = std::time::Instant::now();

        log_debug!("Starting file processing", "file" => file_path.display());

        let path = self.validate_path(file_path)?;
        let metadata = self.get_metadata(&path)?;
        self.validate_file(&metadata)?;
        let source = self.read_file(&path)?;

        let mut final_metadata = metadata;
        final_metadata.line_count = source.lines().count();

        let result = FileProcessingResult {
            source,
            metadata: final_metadata,
            processing_duration: start_time.elapsed(),
        };

        self.log_processing_success(&result);

        Ok(result)
    }

    fn log_processing_success(&self, result: &FileProcessingResult) {
        let file = result.metadata.path.display();

        if self.enable_performance_logging {
            let duration_ms = format!(
                "{:.2}",
                result.processing_duration.as_secs_f64() * 1000.0
            );
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully with performance metrics",
                "file" => file,
                "size_human" => result.metadata.human_readable_size(),
                "lines" => result.metadata.line_count,
                "chars" => result.char_count(),
                "duration_ms" => duration_ms
            );
        } else {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File processed successfully",
                "file" => file,
                "size_bytes" => result.metadata.size,
                "lines" => result.metadata.line_count
            );
        }
    }

    /// Validate file path and check existence
    fn validate_path(&self, file_path: &Path) -> Result<PathBuf, FileProcessorError> {
        let display = file_path.display().to_string();

        if file_path.as_os_str().is_empty() {
            let error = FileProcessorError::InvalidPath { path: display };
            log_error!(error.error_code(), "Empty file path provided");
            return Err(error);
        }

        if !file_path.exists() {
            let error = FileProcessorError::FileNotFound { path: display };
            log_error!(error.error_code(), "File not found", "path" => file_path.display());
            return Err(error);
        }

        if !file_path.is_file() {
            let error = FileProcessorError::InvalidPath { path: display };
            log_error!(error.error_code(), "Path is not a file", "path" => file_path.display());
            return Err(error);
        }

        file_path.canonicalize().map_err(|e| {
            let error = FileProcessorError::IoError {
                message: format!("Failed to resolve path '{}': {}", display, e),
            };
            log_error!(error.error_code(), "Failed to canonicalize path",
                "path" => display,
                "io_error" => e);
            error
        })
    }

    fn get_metadata(&self, path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let metadata = fs::metadata(path).map_err(|e| {
            let error = match e.kind() {
                std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                    path: path.display().to_string(),
                },
                _ => FileProcessorError::IoError {
                    message: format!("Failed to read metadata for '{}': {}", path.display(), e),
                },
            };
            log_error!(error.error_code(), "Failed to read file metadata",
                "path" => path.display(),
                "io_error" => e);
            error
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());
        let kind = SourceKind::from_extension(extension.as_deref());

        let file_metadata = FileMetadata {
            path: path.to_path_buf(),
            size: metadata.len(),
            extension,
            line_count: 0,
            kind,
        };

        log_debug!("File metadata collected",
            "size_human" => file_metadata.human_readable_size(),
            "extension" => file_metadata.extension.as_deref().unwrap_or("none"),
            "kind" => format!("{:?}", kind));

        Ok(file_metadata)
    }

    fn validate_file(&self, metadata: &FileMetadata) -> Result<(), FileProcessorError> {
        if metadata.size > self.max_file_size {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: self.max_file_size,
            };
            log_error!(error.error_code(), "File exceeds maximum template size",
                "file" => metadata.path.display(),
                "size_bytes" => metadata.size,
                "limit_bytes" => self.max_file_size);
            return Err(error);
        }

        if self.require_template_extension && !metadata.has_template_extension() {
            let error = FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            };
            log_error!(error.error_code(), "File does not have a template extension",
                "file" => metadata.path.display(),
                "extension" => metadata.extension.as_deref().unwrap_or("none"));
            return Err(error);
        }

        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<String, FileProcessorError> {
        fs::read_to_string(path).map_err(|e| {
            let error = match e.kind() {
                std::io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                    path: path.display().to_string(),
                },
                std::io::ErrorKind::InvalidData => FileProcessorError::InvalidEncoding {
                    path: path.display().to_string(),
                },
                _ => FileProcessorError::IoError {
                    message: format!("Failed to read file '{}': {}", path.display(), e),
                },
            };
            log_error!(error.error_code(), "Failed to read file",
                "file" => path.display(),
                "io_error" => e);
            error
        })
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_process_valid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("note.template");
        let content = "# {{title}}\n\n{{content}}\n";
        fs::write(&file_path, content).unwrap();

        let result = FileProcessor::new().process_file(&file_path).unwrap();

        assert_eq!(result.source, content);
        assert_eq!(result.metadata.line_count, 3);
        assert_eq!(result.metadata.kind, SourceKind::Template);
        assert_eq!(result.metadata.extension.as_deref(), Some("template"));
        assert_eq!(result.char_count(), content.chars().count());
    }

    #[test]
    fn test_json_extension_is_clipper_kind() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Clipping.JSON");
        fs::write(&file_path, "{}").unwrap();

        let result = FileProcessor::new().process_file(&file_path).unwrap();
        assert_eq!(result.metadata.kind, SourceKind::ClipperJson);
    }

    #[test]
    fn test_empty_file_is_accepted() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("empty.tmpl");
        fs::write(&file_path, "").unwrap();

        let result = FileProcessor::new().process_file(&file_path).unwrap();
        assert!(result.source.is_empty());
        assert_eq!(result.metadata.line_count, 0);
    }

    #[test]
    fn test_file_not_found() {
        let result = FileProcessor::new().process_file("nonexistent.template");
        assert_matches!(result, Err(FileProcessorError::FileNotFound { .. }));
    }

    #[test]
    fn test_directory_is_invalid_path() {
        let dir = tempdir().unwrap();
        let err = FileProcessor::new().process_file(dir.path()).unwrap_err();
        assert_matches!(err, FileProcessorError::InvalidPath { .. });
        assert_eq!(err.error_code().as_str(), "E012");
    }

    #[test]
    fn test_runtime_size_limit() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("large.template");
        fs::write(&file_path, "a".repeat(64)).unwrap();

        let processor = FileProcessor::new().with_max_file_size(16);
        let err = processor.process_file(&file_path).unwrap_err();

        assert_matches!(
            err,
            FileProcessorError::FileTooLarge {
                size: 64,
                max_size: 16
            }
        );
        assert_eq!(err.error_code().as_str(), "E007");
    }

    #[test]
    fn test_size_limit_is_clamped_to_compile_time_maximum() {
        let processor = FileProcessor::new().with_max_file_size(u64::MAX);
        assert_eq!(processor.max_file_size, MAX_FILE_SIZE);
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("notes.md");
        fs::write(&file_path, "{{title}}").unwrap();

        let lenient = FileProcessor::new();
        assert!(lenient.process_file(&file_path).is_ok());

        let strict = FileProcessor::new().with_template_extension_required(true);
        let err = strict.process_file(&file_path).unwrap_err();
        assert_matches!(
            err,
            FileProcessorError::InvalidExtension { extension: Some(ref ext) } if ext == "md"
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("binary.template");
        fs::write(&file_path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let err = FileProcessor::new().process_file(&file_path).unwrap_err();
        assert_matches!(err, FileProcessorError::InvalidEncoding { .. });
        assert_eq!(err.error_code().as_str(), "E010");
    }

    #[test]
    fn test_from_preferences() {
        let prefs = FileProcessorPreferences {
            require_template_extension: true,
            max_file_size: 1024,
            enable_performance_logging: true,
        };
        let processor = FileProcessor::from_preferences(&prefs);
        assert!(processor.require_template_extension);
        assert_eq!(processor.max_file_size, 1024.min(MAX_FILE_SIZE));
        assert!(processor.enable_performance_logging);
    }

    #[test]
    fn test_human_readable_size() {
        let metadata = FileMetadata {
            path: PathBuf::from("a.template"),
            size: 2048,
            extension: Some("template".to_string()),
            line_count: 1,
            kind: SourceKind::Template,
        };
        assert_eq!(metadata.human_readable_size(), "2.00 KB");
        assert!(metadata.has_template_extension());
    }
}
