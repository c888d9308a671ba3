//! # tablepipe - Configurable transformation pipelines for CSV data
//!
//! tablepipe parses CSV files into typed in-memory tables and runs an
//! ordered pipeline of registered transformations over them, returning the
//! transformed rows as JSON records together with the before/after shapes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│   Pipeline   │────▶│ JSON records │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │  (registry)  │     │  (+ shapes)  │
//! └─────────────┘     └─────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tablepipe::{execute, parse_file, PipelineConfig, TransformationRegistry};
//!
//! let parsed = parse_file("input.csv")?;
//! let registry = TransformationRegistry::with_defaults();
//! let config = PipelineConfig::from_json(r#"{"steps": [
//!     {"type": "filter_rows", "config": {"column": "age", "operator": ">", "value": 25}}
//! ]}"#)?;
//! let result = execute(&registry, &parsed.table, &config.steps)?;
//! println!("{} rows kept", result.transformed_shape.0);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`table`] - In-memory tabular dataset
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Units, registry, and pipeline executor
//! - [`validation`] - Configuration schema validation
//! - [`api`] - HTTP API server
//! - [`logging`] - Tracing setup

// Core modules
pub mod error;
pub mod table;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// HTTP API
pub mod api;

// Logging
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, PipelineError, RegistryError, ServerError, TransformError};

// =============================================================================
// Re-exports - Table
// =============================================================================

pub use table::{ColumnType, Shape, Table};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes, parse_file, ParsedCsv,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid, validate};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    execute, FilterOperator, FilterRows, LowercaseColumn, MapColumn, PipelineConfig,
    PipelineResult, PipelineStep, ReplacePattern, Transformation, TransformationDescriptor,
    TransformationRegistry, TrimColumn, UppercaseColumn,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{ErrorResponse, ToggleRequest, ToggleResponse, TransformationList};

// Server
pub mod server {
    pub use crate::api::server::{app, start_server};
}
