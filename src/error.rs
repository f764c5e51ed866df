use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShrinkError {
    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Cannot walk {root}: {source}")]
    Discovery {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid worker count: {0}. Must be at least 1")]
    InvalidWorkerCount(i64),

    #[error("Invalid quality value: {0}. Must be between 0 and 100")]
    InvalidQuality(i64),

    #[error("Failed to create output directory {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Decode error: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Cannot prepare destination {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Encode error: {0}")]
    Encode(#[source] image::ImageError),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("Failed to finish writing {path}: {source}")]
    Close {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ShrinkError {
    /// Fatal errors abort the run before any task is scheduled; everything
    /// else is confined to the task that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ShrinkError::RootNotFound(_)
                | ShrinkError::Discovery { .. }
                | ShrinkError::InvalidWorkerCount(_)
                | ShrinkError::InvalidQuality(_)
                | ShrinkError::DirectoryCreationFailed { .. }
                | ShrinkError::ThreadPool(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ShrinkError>;
