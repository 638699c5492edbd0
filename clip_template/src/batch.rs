//! Batch checking of template directories
//!
//! Discovers template files by extension and checks them either sequentially or
//! on a bounded number of worker threads. Reports come back sorted by path, so
//! output does not depend on thread scheduling.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::runtime::BatchPreferences;
use crate::file_processor::FileProcessor;
use crate::logging::{self, codes};
use crate::pipeline::{self, CheckOptions, CheckSummary, FileReport, PipelineError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Worker threads; 1 checks files on the calling thread
    pub max_threads: usize,
    pub recursive: bool,
    /// Discovery stops after this many files
    pub max_files: usize,
    /// Lowercase extensions without the dot
    pub extensions: Vec<String>,
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from_preferences(&BatchPreferences::default())
    }
}

impl BatchConfig {
    pub fn from_preferences(prefs: &BatchPreferences) -> Self {
        Self {
            max_threads: prefs.max_threads.clamp(1, MAX_WORKER_THREADS),
            recursive: prefs.recursive,
            max_files: MAX_FILES_PER_BATCH,
            extensions: prefs
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            fail_fast: false,
        }
    }

    pub fn sequential(mut self) -> Self {
        self.max_threads = 1;
        self
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}

/// Batch processing results
#[derive(Debug, Default)]
pub struct BatchResults {
    pub reports: Vec<FileReport>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files_processed(&self) -> usize {
        self.reports.len() + self.failed_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn add_report(&mut self, report: FileReport) {
        self.reports.push(report);
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.reports.extend(other.reports);
        self.failed_files.extend(other.failed_files);
    }

    fn sort(&mut self) {
        self.reports.sort_by(|a, b| a.path.cmp(&b.path));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn summary(&self) -> CheckSummary {
        CheckSummary::from_reports(&self.reports).with_failed(self.failure_count())
    }
}

/// Batch processing errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No template files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Thread pool error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> logging::Code {
        match self {
            BatchError::DirectoryNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            BatchError::NoFilesFound { .. } => codes::file_processing::INVALID_PATH,
            BatchError::IoError { .. } => codes::file_processing::IO_ERROR,
            BatchError::ThreadError { .. } => codes::system::INTERNAL_ERROR,
        }
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Discover template files in a directory, sorted by path
pub fn discover_template_files(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        });
    }

    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        });
    }

    files.sort();

    crate::log_success!(
        codes::success::FILE_DISCOVERY_COMPLETE,
        "File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

/// Returns `false` once the file limit is reached
fn visit_directory(
    dir_path: &Path,
    files: &mut Vec<PathBuf>,
    config: &BatchConfig,
) -> Result<bool, BatchError> {
    let entries = fs::read_dir(dir_path).map_err(|e| BatchError::IoError {
        error: format!("{}: {}", dir_path.display(), e),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BatchError::IoError {
            error: e.to_string(),
        })?;
        paths.push(entry.path());
    }
    paths.sort();

    for path in paths {
        if path.is_dir() {
            if config.recursive && !visit_directory(&path, files, config)? {
                return Ok(false);
            }
        } else if path.is_file() && config.matches_extension(&path) {
            files.push(path);

            if files.len() >= config.max_files {
                crate::log_warning!(
                    "Reached maximum file limit",
                    "files_found" => files.len(),
                    "limit" => config.max_files
                );
                return Ok(false);
            }
        }
    }

    Ok(true)
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

/// Check files one after another on the calling thread
pub fn check_files_sequential(
    files: &[PathBuf],
    processor: &FileProcessor,
    options: &CheckOptions,
    config: &BatchConfig,
) -> BatchResults {
    let mut results = BatchResults::new();

    for file_path in files {
        match pipeline::check_file(file_path, processor, options) {
            Ok(report) => results.add_report(report),
            Err(error) => {
                crate::log_error!(error.error_code(), "File check failed",
                    "file" => file_path.display(),
                    "error" => &error
                );
                results.add_failure(file_path.clone(), error);

                if config.fail_fast {
                    crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
                    break;
                }
            }
        }
    }

    results
}

/// Check files on up to `config.max_threads` worker threads
pub fn check_files_parallel(
    files: &[PathBuf],
    processor: &FileProcessor,
    options: &CheckOptions,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let results = Arc::new(Mutex::new(BatchResults::new()));
    let processor = Arc::new(processor.clone());
    let options = Arc::new(options.clone());

    let threads = config.max_threads.clamp(1, MAX_WORKER_THREADS);
    let files_per_thread = files.len().div_ceil(threads).max(1);

    crate::log_debug!("Parallel processing configuration",
        "total_files" => files.len(),
        "files_per_thread" => files_per_thread,
        "threads" => threads
    );

    let mut handles = Vec::new();
    for chunk in files.chunks(files_per_thread) {
        let thread_files = chunk.to_vec();
        let results = Arc::clone(&results);
        let processor = Arc::clone(&processor);
        let options = Arc::clone(&options);

        handles.push(thread::spawn(move || {
            for file_path in thread_files {
                let outcome = pipeline::check_file(&file_path, &processor, &options);
                let mut guard = results.lock().unwrap_or_else(PoisonError::into_inner);
                match outcome {
                    Ok(report) => guard.add_report(report),
                    Err(error) => {
                        crate::log_error!(error.error_code(), "File check failed",
                            "file" => file_path.display(),
                            "error" => &error
                        );
                        guard.add_failure(file_path, error);
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle.join().map_err(|_| BatchError::ThreadError {
            message: "Thread panicked during processing".to_string(),
        })?;
    }

    let results = Arc::try_unwrap(results).map_err(|_| BatchError::ThreadError {
        message: "Failed to extract results from worker threads".to_string(),
    })?;

    Ok(results.into_inner().unwrap_or_else(PoisonError::into_inner))
}

/// Check a list of files with the mode `config` selects
pub fn check_files(
    files: &[PathBuf],
    processor: &FileProcessor,
    options: &CheckOptions,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();

    let mut results = if config.max_threads <= 1 || files.len() <= 1 || config.fail_fast {
        check_files_sequential(files, processor, options, config)
    } else {
        check_files_parallel(files, processor, options, config)?
    };

    results.sort();
    results.files_discovered = files.len();
    results.processing_duration = start_time.elapsed();

    let summary = results.summary();
    crate::log_success!(
        codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
        "Batch check completed",
        "files_processed" => results.files_processed(),
        "errors" => summary.errors,
        "warnings" => summary.warnings,
        "failed" => summary.failed,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );

    Ok(results)
}

/// Discover and check every template file under a directory
pub fn check_directory(
    dir_path: &Path,
    processor: &FileProcessor,
    options: &CheckOptions,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let files = discover_template_files(dir_path, config)?;
    check_files(&files, processor, options, config)
}
