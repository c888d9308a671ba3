//! HTTP API request and response types.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::transform::TransformationDescriptor;

/// Body of `POST /transformations/{name}/enable`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleRequest {
    /// Desired state; an omitted field means enable.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Response of `POST /transformations/{name}/enable`.
#[derive(Debug, Clone, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub message: String,
}

/// Response of `GET /transformations`.
#[derive(Debug, Clone, Serialize)]
pub struct TransformationList {
    pub transformations: Vec<TransformationDescriptor>,
}

/// Structured error body shared by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Stable snake_case tag (`unknown_transformation`, `invalid_config`,
    /// `missing_column`, `duplicate_name`, `csv_error`, `bad_request`).
    pub error_kind: String,
    /// Human-readable description.
    pub message: String,
    /// Zero-based position of the failing pipeline step, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_index: Option<usize>,
}

impl ErrorResponse {
    pub fn new(error_kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_kind: error_kind.into(),
            message: message.into(),
            step_index: None,
        }
    }
}

impl From<&PipelineError> for ErrorResponse {
    fn from(error: &PipelineError) -> Self {
        Self {
            error_kind: error.kind().to_string(),
            message: error.to_string(),
            step_index: Some(error.step_index()),
        }
    }
}
