//! JSON Schema validation for transformation configurations.
//!
//! Every transformation unit declares its configuration contract as a JSON
//! Schema (Draft 7). [`validate`] collects every violation rather than
//! stopping at the first, so a client fixing a pipeline sees the full list
//! at once.

use serde_json::Value;

/// Validates a JSON object against a JSON Schema.
///
/// # Arguments
/// * `schema` - The JSON Schema (already parsed)
/// * `data` - The object to validate
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with all violations if invalid
///
/// # Example
/// ```ignore
/// use serde_json::json;
/// use tablepipe::validation::validate;
///
/// let schema = json!({
///     "type": "object",
///     "required": ["column"],
///     "properties": {
///         "column": { "type": "string" }
///     }
/// });
///
/// assert!(validate(&schema, &json!({ "column": "age" })).is_ok());
/// assert!(validate(&schema, &json!({ "field": "age" })).is_err());
/// ```
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Boolean variant of [`validate`].
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column_schema() -> Value {
        json!({
            "type": "object",
            "required": ["column"],
            "properties": {
                "column": { "type": "string" }
            },
            "additionalProperties": false
        })
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&column_schema(), &json!({ "column": "age" })).is_ok());
    }

    #[test]
    fn test_missing_required_field() {
        let result = validate(&column_schema(), &json!({}));
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("column"));
    }

    #[test]
    fn test_collects_all_errors() {
        let result = validate(
            &column_schema(),
            &json!({ "column": 42, "extra": true }),
        );
        let errors = result.unwrap_err();
        assert!(errors.len() >= 2);
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid(&column_schema(), &json!({ "column": "name" })));
        assert!(!is_valid(&column_schema(), &json!({ "column": 7 })));
    }
}
