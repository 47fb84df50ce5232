/// This module defines the error types for wordtally.
///
/// Pattern parsing and word matching are total functions and never produce an
/// error; a malformed pattern simply parses to a degenerate requirement set.
/// Errors only arise at the boundary (reading the text and pattern sources,
/// loading configuration, writing the result table) and when a per-pattern
/// counting task fails unexpectedly.
///
/// # Rust vs .NET Error Handling
///
/// .NET would surface a failed worker through an `AggregateException` thrown
/// from `Task.WaitAll`:
/// ```csharp
/// try {
///     Task.WaitAll(tasks);
/// } catch (AggregateException ex) {
///     // Some tasks failed, the rest may or may not have finished
/// }
/// ```
///
/// Here every task outcome is a value. Failed patterns are collected next to
/// the successful counts and can be turned into an error explicitly:
/// ```rust,ignore
/// let output = engine.run(&words, &patterns)?;
/// output.check_failures(allow_failures)?;
/// ```
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for tally operations
pub type TallyResult<T> = Result<T, TallyError>;

/// Errors that can occur while tallying patterns
#[derive(Error, Debug)]
pub enum TallyError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("Invalid UTF-8 in file {path}: {source}")]
    EncodingError {
        path: PathBuf,
        source: std::str::Utf8Error,
    },
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),
    #[error("{0} pattern task(s) failed")]
    PatternTasksFailed(usize),
}

impl TallyError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn encoding_error(path: impl Into<PathBuf>, source: std::str::Utf8Error) -> Self {
        Self::EncodingError {
            path: path.into(),
            source,
        }
    }

    pub fn thread_pool(msg: impl Into<String>) -> Self {
        Self::ThreadPool(msg.into())
    }

    pub fn pattern_tasks_failed(count: usize) -> Self {
        Self::PatternTasksFailed(count)
    }

    /// Maps an I/O error on `path` to the matching variant.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }
}
