//! Error types for `tideloop`.
//!
//! The animation core itself has no recoverable-error taxonomy: every
//! "failure" inside the engine is a guard-condition skip (debounced
//! interaction, already-active breath guide, already-fired phase,
//! paused-at-fire-time skip) and resolves as a silent no-op. The error
//! types here cover the outer surface only: configuration loading,
//! capture I/O, and CLI exit-code mapping.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `tideloop` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `tideloop` operations.
///
/// Aggregates the domain-specific errors and provides a unified
/// interface for exit-code mapping.
#[derive(Debug, Error)]
pub enum TideloopError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error (capture output)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TideloopError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) => ExitCode::CONFIG_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", issues.join("; "))]
    ValidationError {
        /// Path (or `<defaults>`) of the offending configuration
        path: String,
        /// List of validation issues found
        issues: Vec<String>,
    },

    /// Referenced configuration file not found or unreadable
    #[error("cannot read {path}: {message}")]
    Unreadable {
        /// Path to the file
        path: PathBuf,
        /// Underlying I/O error message
        message: String,
    },

    /// A duration field failed to parse
    #[error("invalid duration for '{field}': got '{value}' ({message})")]
    InvalidDuration {
        /// Name of the field
        field: String,
        /// The value provided
        value: String,
        /// Parser error message
        message: String,
    },
}
