//! Error types.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while converting reports.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum AlchemyError {
    /// Bad or missing configuration, or an unknown source/sink type.
    #[error("{0}")]
    Configuration(String),

    /// A source buffer does not match the shape its handler expects.
    #[error("Invalid source data: {0}")]
    #[diagnostic(code(report_alchemy::invalid_source_data))]
    InvalidSourceData(String),

    /// File system error for a specific path.
    #[error("{message}: '{}'", .path.display())]
    #[diagnostic(code(report_alchemy::io))]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: io::Error,
    },

    /// Writing to an already opened sink failed.
    #[error("Write error: {0}")]
    #[diagnostic(code(report_alchemy::write))]
    Write(#[from] io::Error),

    /// A handler loader failed to produce its handler.
    #[error("Failed to load handler: {0}")]
    #[diagnostic(code(report_alchemy::handler_load))]
    HandlerLoad(String),

    /// JSON syntax or shape error.
    #[error("JSON error: {0}")]
    #[diagnostic(code(report_alchemy::json))]
    Json(#[from] serde_json::Error),
}

impl AlchemyError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an invalid source data error.
    pub fn invalid_source(message: impl Into<String>) -> Self {
        Self::InvalidSourceData(message.into())
    }

    /// Creates a handler load error.
    pub fn handler_load(message: impl Into<String>) -> Self {
        Self::HandlerLoad(message.into())
    }

    /// Wraps an I/O error together with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        let message = match source.kind() {
            io::ErrorKind::NotFound => "No such file or directory".to_string(),
            io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
            _ => source.to_string(),
        };
        Self::Io {
            path: path.as_ref().to_path_buf(),
            message,
            source,
        }
    }

    /// Returns true for an I/O error caused by a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
