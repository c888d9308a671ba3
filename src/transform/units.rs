//! Built-in transformation units.
//!
//! Each unit is a named table-to-table operation. Configuration arrives as
//! untyped JSON, is checked against the unit's declared JSON Schema, then
//! deserialized into a typed config struct. `apply` never mutates its input
//! table.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{TransformError, TransformResult};
use crate::table::{ColumnType, Table};
use crate::validation;

/// A named, schema-validated table-to-table operation.
pub trait Transformation: Send + Sync {
    /// JSON Schema (Draft 7) describing the unit's configuration.
    fn config_schema(&self) -> &'static Value;

    /// Checks a configuration without touching any table.
    ///
    /// The default implementation validates against
    /// [`Transformation::config_schema`]. Units with constraints a schema
    /// cannot express (regex syntax) extend it.
    fn validate_config(&self, config: &Value) -> TransformResult<()> {
        validate_schema(self.config_schema(), config)
    }

    /// Applies the unit to a table, producing a new one.
    fn apply(&self, table: &Table, config: &Value) -> TransformResult<Table>;
}

fn validate_schema(schema: &Value, config: &Value) -> TransformResult<()> {
    validation::validate(schema, config)
        .map_err(|errors| TransformError::InvalidConfig(errors.join("; ")))
}

fn parse_config<T: serde::de::DeserializeOwned>(config: &Value) -> TransformResult<T> {
    serde_json::from_value(config.clone()).map_err(|e| TransformError::InvalidConfig(e.to_string()))
}

// =============================================================================
// filter_rows
// =============================================================================

/// Comparison operator accepted by [`FilterRows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "contains")]
    Contains,
}

fn default_operator() -> FilterOperator {
    FilterOperator::Eq
}

#[derive(Debug, Deserialize)]
struct FilterRowsConfig {
    column: String,
    #[serde(default = "default_operator")]
    operator: FilterOperator,
    value: Value,
}

static FILTER_ROWS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["column", "value"],
        "properties": {
            "column": { "type": "string" },
            "operator": {
                "type": "string",
                "enum": ["==", "!=", ">", "<", ">=", "<=", "contains"]
            },
            "value": { "type": ["string", "number", "boolean"] }
        },
        "additionalProperties": false
    })
});

/// Keeps the rows whose cell in one column satisfies a comparison.
///
/// Equality compares without coercion (numbers numerically, other scalars
/// within their own type). Ordering operators coerce the configured value
/// to the column's scalar type. `contains` is a substring test over a text
/// column. Null cells satisfy `!=` and nothing else.
pub struct FilterRows;

impl Transformation for FilterRows {
    fn config_schema(&self) -> &'static Value {
        &FILTER_ROWS_SCHEMA
    }

    fn apply(&self, table: &Table, config: &Value) -> TransformResult<Table> {
        let config: FilterRowsConfig = parse_config(config)?;
        let index = table
            .column_index(&config.column)
            .ok_or_else(|| TransformError::MissingColumn(config.column.clone()))?;
        let column_type = table.column_type(index);

        match config.operator {
            FilterOperator::Eq => {
                Ok(table.retain_rows(|row| values_equal(&row[index], &config.value)))
            }
            FilterOperator::Ne => {
                Ok(table.retain_rows(|row| !values_equal(&row[index], &config.value)))
            }
            FilterOperator::Contains => {
                match column_type {
                    ColumnType::Text | ColumnType::Null => {}
                    other => {
                        return Err(TransformError::InvalidConfig(format!(
                            "operator 'contains' needs a text column, but '{}' holds {} values",
                            config.column,
                            other.name(),
                        )))
                    }
                }
                let needle = value_as_string(&config.value);
                Ok(table.retain_rows(|row| match &row[index] {
                    Value::String(s) => s.contains(&needle),
                    _ => false,
                }))
            }
            operator => {
                let target = match coerce_for_ordering(&config.value, column_type, &config.column)?
                {
                    Some(target) => target,
                    // Column has no non-null cells; no row can satisfy an
                    // ordering against it.
                    None => return Ok(table.retain_rows(|_| false)),
                };
                Ok(table.retain_rows(|row| ordering_holds(&row[index], &target, operator)))
            }
        }
    }
}

/// Equality without coercion. Numbers compare numerically across
/// integer/float; null cells never equal anything.
fn values_equal(cell: &Value, target: &Value) -> bool {
    match (cell, target) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => false,
    }
}

fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Filter value coerced to the column's scalar type for ordering.
enum OrderTarget {
    Number(f64),
    Text(String),
    Bool(bool),
}

/// `Ok(None)` means the column has no non-null cells and no coercion target
/// exists.
fn coerce_for_ordering(
    value: &Value,
    column_type: ColumnType,
    column: &str,
) -> TransformResult<Option<OrderTarget>> {
    let coerced = match column_type {
        ColumnType::Number => match value {
            Value::Number(n) => n.as_f64().map(OrderTarget::Number),
            Value::String(s) => s.trim().parse::<f64>().ok().map(OrderTarget::Number),
            _ => None,
        },
        ColumnType::Text => Some(OrderTarget::Text(value_as_string(value))),
        ColumnType::Bool => match value {
            Value::Bool(b) => Some(OrderTarget::Bool(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(OrderTarget::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(OrderTarget::Bool(false)),
            _ => None,
        },
        ColumnType::Null => return Ok(None),
        ColumnType::Mixed => {
            return Err(TransformError::InvalidConfig(format!(
                "column '{}' mixes value types; ordering comparisons need a uniform column",
                column
            )))
        }
    };
    match coerced {
        Some(target) => Ok(Some(target)),
        None => Err(TransformError::InvalidConfig(format!(
            "cannot compare value {} with the {} column '{}'",
            value,
            column_type.name(),
            column
        ))),
    }
}

fn ordering_holds(cell: &Value, target: &OrderTarget, operator: FilterOperator) -> bool {
    use std::cmp::Ordering;

    let ordering = match (cell, target) {
        (Value::Number(n), OrderTarget::Number(t)) => n.as_f64().and_then(|n| n.partial_cmp(t)),
        (Value::String(s), OrderTarget::Text(t)) => Some(s.as_str().cmp(t.as_str())),
        (Value::Bool(b), OrderTarget::Bool(t)) => Some(b.cmp(t)),
        // Null cells never satisfy an ordering.
        _ => None,
    };
    let ordering = match ordering {
        Some(ordering) => ordering,
        None => return false,
    };
    matches!(
        (operator, ordering),
        (FilterOperator::Gt, Ordering::Greater)
            | (FilterOperator::Ge, Ordering::Greater | Ordering::Equal)
            | (FilterOperator::Lt, Ordering::Less)
            | (FilterOperator::Le, Ordering::Less | Ordering::Equal)
    )
}

// =============================================================================
// map_column
// =============================================================================

static MAP_COLUMN_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["old_name", "new_name"],
        "properties": {
            "old_name": { "type": "string" },
            "new_name": { "type": "string" }
        },
        "additionalProperties": false
    })
});

#[derive(Debug, Deserialize)]
struct MapColumnConfig {
    old_name: String,
    new_name: String,
}

/// Renames a column, keeping its position and values.
pub struct MapColumn;

impl Transformation for MapColumn {
    fn config_schema(&self) -> &'static Value {
        &MAP_COLUMN_SCHEMA
    }

    fn apply(&self, table: &Table, config: &Value) -> TransformResult<Table> {
        let config: MapColumnConfig = parse_config(config)?;
        table.with_column_renamed(&config.old_name, &config.new_name)
    }
}

// =============================================================================
// Column value units (case, trim, replace)
// =============================================================================

static COLUMN_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["column"],
        "properties": {
            "column": { "type": "string" }
        },
        "additionalProperties": false
    })
});

#[derive(Debug, Deserialize)]
struct ColumnConfig {
    column: String,
}

/// Uppercases the string values of a column; other scalars pass through
/// unchanged.
pub struct UppercaseColumn;

impl Transformation for UppercaseColumn {
    fn config_schema(&self) -> &'static Value {
        &COLUMN_SCHEMA
    }

    fn apply(&self, table: &Table, config: &Value) -> TransformResult<Table> {
        let config: ColumnConfig = parse_config(config)?;
        table.with_column_mapped(&config.column, |value| match value {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other.clone(),
        })
    }
}

/// Lowercases the string values of a column; other scalars pass through
/// unchanged.
pub struct LowercaseColumn;

impl Transformation for LowercaseColumn {
    fn config_schema(&self) -> &'static Value {
        &COLUMN_SCHEMA
    }

    fn apply(&self, table: &Table, config: &Value) -> TransformResult<Table> {
        let config: ColumnConfig = parse_config(config)?;
        table.with_column_mapped(&config.column, |value| match value {
            Value::String(s) => Value::String(s.to_lowercase()),
            other => other.clone(),
        })
    }
}

/// Trims surrounding whitespace from the string values of a column; other
/// scalars pass through unchanged.
pub struct TrimColumn;

impl Transformation for TrimColumn {
    fn config_schema(&self) -> &'static Value {
        &COLUMN_SCHEMA
    }

    fn apply(&self, table: &Table, config: &Value) -> TransformResult<Table> {
        let config: ColumnConfig = parse_config(config)?;
        table.with_column_mapped(&config.column, |value| match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other.clone(),
        })
    }
}

static REPLACE_PATTERN_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["column", "pattern"],
        "properties": {
            "column": { "type": "string" },
            "pattern": { "type": "string" },
            "replacement": { "type": "string" }
        },
        "additionalProperties": false
    })
});

#[derive(Debug, Deserialize)]
struct ReplacePatternConfig {
    column: String,
    pattern: String,
    #[serde(default)]
    replacement: String,
}

/// Regex replacement over the string values of a column; other scalars pass
/// through unchanged.
pub struct ReplacePattern;

impl Transformation for ReplacePattern {
    fn config_schema(&self) -> &'static Value {
        &REPLACE_PATTERN_SCHEMA
    }

    fn validate_config(&self, config: &Value) -> TransformResult<()> {
        validate_schema(self.config_schema(), config)?;
        if let Some(pattern) = config.get("pattern").and_then(Value::as_str) {
            compile_pattern(pattern)?;
        }
        Ok(())
    }

    fn apply(&self, table: &Table, config: &Value) -> TransformResult<Table> {
        let config: ReplacePatternConfig = parse_config(config)?;
        let re = compile_pattern(&config.pattern)?;
        table.with_column_mapped(&config.column, |value| match value {
            Value::String(s) => {
                Value::String(re.replace_all(s, config.replacement.as_str()).to_string())
            }
            other => other.clone(),
        })
    }
}

fn compile_pattern(pattern: &str) -> TransformResult<Regex> {
    Regex::new(pattern).map_err(|e| TransformError::InvalidConfig(format!("invalid pattern: {}", e)))
}
