//! Transformation engine.
//!
//! This module provides:
//! - `units`: Named table-to-table transformation units
//! - `registry`: Catalog of units with runtime enable/disable flags
//! - `executor`: Sequential pipeline execution against a registry

pub mod executor;
pub mod registry;
pub mod units;

pub use executor::{execute, PipelineConfig, PipelineResult, PipelineStep};
pub use registry::{TransformationDescriptor, TransformationRegistry};
pub use units::{
    FilterOperator, FilterRows, LowercaseColumn, MapColumn, ReplacePattern, Transformation,
    TrimColumn, UppercaseColumn,
};
