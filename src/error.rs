//! Error types for the call hierarchy engine
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by call hierarchy requests
#[derive(Error, Debug)]
pub enum HierarchyError {
    /// The item handed back by the client no longer maps to a declaration
    #[error("'{name}' at {uri} no longer resolves to a declaration: {reason}")]
    StaleIdentity {
        name: String,
        uri: String,
        reason: String,
    },

    /// The workspace index is unbuilt or broken
    #[error("Workspace index is unavailable: {reason}")]
    IndexUnavailable { reason: String },

    /// Cancellation was observed while the request was running
    #[error("Request was cancelled")]
    Cancelled,

    #[error("Invalid content URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    /// The URI is well formed but names nothing in the workspace
    #[error("No workspace file or library type for '{uri}'")]
    UnknownContent { uri: String },

    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

impl HierarchyError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::StaleIdentity { .. } => "STALE_IDENTITY",
            Self::IndexUnavailable { .. } => "INDEX_UNAVAILABLE",
            Self::Cancelled => "CANCELLED",
            Self::InvalidUri { .. } => "INVALID_URI",
            Self::UnknownContent { .. } => "UNKNOWN_CONTENT",
            Self::Materialize(_) => "MATERIALIZE_FAILED",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::StaleIdentity { .. } => vec![
                "The workspace changed since the item was produced",
                "Prepare the call hierarchy again at the current cursor position",
            ],
            Self::IndexUnavailable { .. } => vec![
                "Check that every configured source root exists and is readable",
                "Reload the workspace once the sources are available",
            ],
            Self::UnknownContent { .. } => vec![
                "Make sure the file belongs to a configured source root",
                "Library types need their artifact declared in settings.toml",
            ],
            Self::Materialize(_) => vec![
                "Attach sources to the library artifact or configure a stub provider",
            ],
            _ => vec![],
        }
    }

    /// Cancellation is reported as an empty answer, never as a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Errors raised by the materialization service for library content
#[derive(Error, Debug, Clone)]
pub enum MaterializeError {
    #[error("Library artifact '{artifact}' is not declared")]
    UnknownArtifact { artifact: String },

    #[error("Type '{type_name}' is not part of '{artifact}'")]
    UnknownType { artifact: String, type_name: String },

    #[error("No source or stub available for '{type_name}' in '{artifact}'")]
    NoSource { artifact: String, type_name: String },

    #[error("Failed to parse view of '{type_name}': {reason}")]
    Parse { type_name: String, reason: String },
}

/// Errors raised while loading or building the workspace
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Source root '{path}' does not exist or is not a directory")]
    MissingRoot { path: PathBuf },

    #[error(transparent)]
    Parser(#[from] ParseError),

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

/// Errors specific to parsing operations
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Failed to initialize {language} parser: {reason}")]
    ParserInit { language: String, reason: String },

    #[error("tree-sitter produced no tree for '{content}'")]
    NoTree { content: String },
}

/// Result type alias for hierarchy requests
pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// Result type alias for workspace operations
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// Result type alias for parse operations
pub type ParseResult<T> = Result<T, ParseError>;
