//! Error types for project-analyzer-core.
//!
//! Only run-level failures are represented here. Problems confined to a single
//! file or directory never abort an analysis; they are recorded as
//! [`SoftError`](crate::models::SoftError) entries on the owning record instead.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for project-analyzer-core operations.
///
/// # Example
///
/// ```
/// use project_analyzer_core::Result;
///
/// fn analyze() -> Result<usize> {
///     Ok(3)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an analysis run before or while it is set up.
///
/// Everything in this enum is a violated precondition or a broken built-in
/// resource. Partial failures during scanning are soft errors and never show
/// up here.
#[derive(Error, Debug)]
pub enum Error {
    /// An I/O error occurred while accessing the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configured root path does not exist.
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// A configured root path is not a directory.
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The configuration did not name any root to analyze.
    #[error("No root directories were given to analyze")]
    NoRoots,

    /// A configuration value is outside its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An ignore pattern or rule file pattern is not a valid glob.
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern as written in the configuration or rule table.
        pattern: String,
        /// The underlying globset error.
        #[source]
        source: globset::Error,
    },

    /// A pattern registry table is malformed.
    #[error("Invalid pattern registry: {0}")]
    Registry(String),

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Localization system error.
    #[error("Localization error: {0}")]
    L10n(String),

    /// JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

// Helper constructors for common error cases
impl Error {
    /// Creates a PathNotFound error.
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Error::PathNotFound(path.into())
    }

    /// Creates a NotADirectory error.
    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Error::NotADirectory(path.into())
    }

    /// Creates an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }

    /// Creates an InvalidPattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: globset::Error) -> Self {
        Error::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates a Registry error.
    pub fn registry(message: impl Into<String>) -> Self {
        Error::Registry(message.into())
    }

    /// Creates an L10n error.
    pub fn l10n(message: impl Into<String>) -> Self {
        Error::L10n(message.into())
    }

    /// Creates an Other error.
    pub fn other(message: impl Into<String>) -> Self {
        Error::Other(message.into())
    }
}
