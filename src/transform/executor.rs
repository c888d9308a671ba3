//! Sequential pipeline execution.
//!
//! A pipeline is an ordered list of `{type, config}` steps resolved against
//! a [`TransformationRegistry`]. Disabled units are skipped; unknown names
//! and failing steps abort the whole run, identified by position. The input
//! table is never modified and intermediate tables are discarded on error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::PipelineError;
use crate::table::{Shape, Table};
use crate::transform::registry::TransformationRegistry;

/// One step of a submitted pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStep {
    /// Name of the transformation to apply.
    #[serde(rename = "type")]
    pub kind: String,
    /// Unit configuration; defaults to an empty object.
    #[serde(default = "empty_config")]
    pub config: Value,
}

fn empty_config() -> Value {
    Value::Object(Map::new())
}

/// A full pipeline as submitted by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub steps: Vec<PipelineStep>,
}

impl PipelineConfig {
    /// Parses the JSON document submitted alongside the CSV file.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Result of a successful pipeline execution.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// (rows, columns) before the first step.
    pub original_shape: Shape,
    /// (rows, columns) after the last step.
    pub transformed_shape: Shape,
    /// Transformed rows as mappings, keys in column order.
    pub data: Vec<Map<String, Value>>,
}

/// Runs `steps` over `table` in order.
///
/// Per step: resolve the name, skip the step when the unit is disabled,
/// validate the configuration, apply. All-or-nothing; the first failure
/// aborts with the step's position.
pub fn execute(
    registry: &TransformationRegistry,
    table: &Table,
    steps: &[PipelineStep],
) -> Result<PipelineResult, PipelineError> {
    let original_shape = table.shape();
    let mut current = table.clone();

    for (index, step) in steps.iter().enumerate() {
        let (unit, enabled) =
            registry
                .resolve(&step.kind)
                .map_err(|_| PipelineError::UnknownTransformation {
                    step: index,
                    name: step.kind.clone(),
                })?;
        if !enabled {
            warn!(
                step = index,
                transformation = %step.kind,
                "skipping disabled transformation"
            );
            continue;
        }
        current = unit
            .validate_config(&step.config)
            .and_then(|()| unit.apply(&current, &step.config))
            .map_err(|source| PipelineError::Step {
                step: index,
                name: step.kind.clone(),
                source,
            })?;
    }

    Ok(PipelineResult {
        original_shape,
        transformed_shape: current.shape(),
        data: current.records(),
    })
}
