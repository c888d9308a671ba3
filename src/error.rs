//! Error types for the tablepipe transformation service.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CsvError`] - CSV parsing errors
//! - [`TransformError`] - Errors from a single transformation unit
//! - [`RegistryError`] - Transformation registry errors
//! - [`PipelineError`] - Pipeline execution errors (carry the step index)
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode content in the detected encoding.
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format: {0}")]
    ParseError(String),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// The header row names the same column twice.
    #[error("Duplicate column header: {0}")]
    DuplicateHeader(String),
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors from a single transformation unit.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Configuration rejected by the unit's schema or semantics.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Referenced column does not exist.
    #[error("Column '{0}' not found")]
    MissingColumn(String),

    /// Renaming would collide with an existing column.
    #[error("Column '{0}' already exists")]
    DuplicateName(String),
}

impl TransformError {
    /// Stable snake_case tag for API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            TransformError::InvalidConfig(_) => "invalid_config",
            TransformError::MissingColumn(_) => "missing_column",
            TransformError::DuplicateName(_) => "duplicate_name",
        }
    }
}

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors from the transformation registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A unit with this name is already registered.
    #[error("Transformation '{0}' is already registered")]
    DuplicateName(String),

    /// No unit registered under this name.
    #[error("Unknown transformation: {0}")]
    UnknownTransformation(String),
}

impl RegistryError {
    /// Stable snake_case tag for API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::DuplicateName(_) => "duplicate_name",
            RegistryError::UnknownTransformation(_) => "unknown_transformation",
        }
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Pipeline execution errors.
///
/// This is the error type returned by [`crate::transform::execute`]. Every
/// variant names the offending step so callers can point at the exact
/// position in the submitted pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Step references a transformation the registry does not know.
    #[error("Step {step}: unknown transformation '{name}'")]
    UnknownTransformation { step: usize, name: String },

    /// A resolved step failed to validate or apply.
    #[error("Step {step} ('{name}'): {source}")]
    Step {
        step: usize,
        name: String,
        #[source]
        source: TransformError,
    },
}

impl PipelineError {
    /// Zero-based index of the failing step.
    pub fn step_index(&self) -> usize {
        match self {
            PipelineError::UnknownTransformation { step, .. } => *step,
            PipelineError::Step { step, .. } => *step,
        }
    }

    /// Stable snake_case tag for API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::UnknownTransformation { .. } => "unknown_transformation",
            PipelineError::Step { source, .. } => source.kind(),
        }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind or serve.
    #[error("Server IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_reports_step() {
        let err = PipelineError::Step {
            step: 2,
            name: "filter_rows".into(),
            source: TransformError::MissingColumn("age".into()),
        };
        assert_eq!(err.step_index(), 2);
        assert_eq!(err.kind(), "missing_column");
        let msg = err.to_string();
        assert!(msg.contains("Step 2"));
        assert!(msg.contains("filter_rows"));
        assert!(msg.contains("age"));
    }

    #[test]
    fn test_unknown_transformation_kind() {
        let err = PipelineError::UnknownTransformation {
            step: 0,
            name: "explode".into(),
        };
        assert_eq!(err.kind(), "unknown_transformation");
        assert!(err.to_string().contains("explode"));
    }

    #[test]
    fn test_registry_error_format() {
        let err = RegistryError::UnknownTransformation("reverse".into());
        assert_eq!(err.kind(), "unknown_transformation");
        assert_eq!(err.to_string(), "Unknown transformation: reverse");
    }
}
