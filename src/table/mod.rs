//! In-memory tabular dataset shared by the CSV parser and the
//! transformation units.
//!
//! A [`Table`] is rectangular: ordered unique column names plus
//! column-aligned rows of scalar JSON values. All construction and mutation
//! goes through methods that keep every row exactly as wide as the header,
//! so the shape invariant holds structurally.

use serde_json::{Map, Value};

use crate::error::{TransformError, TransformResult};

/// (row count, column count) of a table at a point in time.
pub type Shape = (usize, usize);

/// Scalar type of a column, derived from its non-null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Every non-null cell is a number.
    Number,
    /// Every non-null cell is a boolean.
    Bool,
    /// Every non-null cell is a string.
    Text,
    /// No non-null cells.
    Null,
    /// Cells of more than one scalar type.
    Mixed,
}

impl ColumnType {
    /// Lowercase name for error messages.
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Number => "number",
            ColumnType::Bool => "boolean",
            ColumnType::Text => "text",
            ColumnType::Null => "null",
            ColumnType::Mixed => "mixed",
        }
    }
}

/// Rectangular in-memory dataset.
///
/// Rows are stored column-aligned (`Vec<Value>` in header order), so shape
/// consistency does not depend on per-row key sets. Serialization for API
/// responses goes through [`Table::records`], which emits one mapping per
/// row with keys in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table with the given header.
    ///
    /// Fails with [`TransformError::DuplicateName`] if a column name repeats.
    pub fn new(columns: Vec<String>) -> TransformResult<Self> {
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(TransformError::DuplicateName(name.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Appends a row, padding short rows with null and truncating long ones
    /// to the header width.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// Column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows, each exactly as wide as the header.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// (row count, column count).
    pub fn shape(&self) -> Shape {
        (self.rows.len(), self.columns.len())
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Scalar type of the column at `index` (from [`Table::column_index`]).
    ///
    /// Null cells are ignored; a column whose non-null cells disagree is
    /// [`ColumnType::Mixed`].
    pub fn column_type(&self, index: usize) -> ColumnType {
        let mut seen: Option<ColumnType> = None;
        for row in &self.rows {
            let cell_type = match &row[index] {
                Value::Null => continue,
                Value::Number(_) => ColumnType::Number,
                Value::Bool(_) => ColumnType::Bool,
                Value::String(_) => ColumnType::Text,
                Value::Array(_) | Value::Object(_) => ColumnType::Mixed,
            };
            match seen {
                None => seen = Some(cell_type),
                Some(previous) if previous == cell_type => {}
                Some(_) => return ColumnType::Mixed,
            }
        }
        seen.unwrap_or(ColumnType::Null)
    }

    /// Rows as mappings with keys in column order.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// New table keeping only the rows for which `keep` returns true.
    pub fn retain_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[Value]) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row))
                .cloned()
                .collect(),
        }
    }

    /// New table with one column renamed. Renaming a column to itself is a
    /// no-op copy.
    pub fn with_column_renamed(&self, old: &str, new: &str) -> TransformResult<Table> {
        let index = self
            .column_index(old)
            .ok_or_else(|| TransformError::MissingColumn(old.to_string()))?;
        if old == new {
            return Ok(self.clone());
        }
        if self.column_index(new).is_some() {
            return Err(TransformError::DuplicateName(new.to_string()));
        }
        let mut columns = self.columns.clone();
        columns[index] = new.to_string();
        Ok(Table {
            columns,
            rows: self.rows.clone(),
        })
    }

    /// New table with `map` applied to every cell of one column.
    pub fn with_column_mapped<F>(&self, column: &str, map: F) -> TransformResult<Table>
    where
        F: Fn(&Value) -> Value,
    {
        let index = self
            .column_index(column)
            .ok_or_else(|| TransformError::MissingColumn(column.to_string()))?;
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row[index] = map(&row[index]);
                row
            })
            .collect();
        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_table() -> Table {
        let mut table = Table::new(vec!["name".into(), "age".into()]).unwrap();
        table.push_row(vec![json!("john"), json!(30)]);
        table.push_row(vec![json!("jane"), json!(22)]);
        table
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let result = Table::new(vec!["a".into(), "b".into(), "a".into()]);
        assert!(matches!(result, Err(TransformError::DuplicateName(name)) if name == "a"));
    }

    #[test]
    fn test_push_row_pads_and_truncates() {
        let mut table = Table::new(vec!["a".into(), "b".into()]).unwrap();
        table.push_row(vec![json!(1)]);
        table.push_row(vec![json!(1), json!(2), json!(3)]);
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.rows()[0], vec![json!(1), Value::Null]);
        assert_eq!(table.rows()[1], vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_records_preserve_column_order() {
        let records = sample_table().records();
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, vec!["name", "age"]);
        assert_eq!(
            serde_json::to_string(&records[0]).unwrap(),
            r#"{"name":"john","age":30}"#
        );
    }

    #[test]
    fn test_column_type_inference() {
        let mut table = Table::new(vec![
            "n".into(),
            "b".into(),
            "s".into(),
            "empty".into(),
            "mixed".into(),
        ])
        .unwrap();
        table.push_row(vec![json!(1), json!(true), json!("x"), Value::Null, json!(1)]);
        table.push_row(vec![json!(2.5), json!(false), json!("y"), Value::Null, json!("x")]);
        assert_eq!(table.column_type(0), ColumnType::Number);
        assert_eq!(table.column_type(1), ColumnType::Bool);
        assert_eq!(table.column_type(2), ColumnType::Text);
        assert_eq!(table.column_type(3), ColumnType::Null);
        assert_eq!(table.column_type(4), ColumnType::Mixed);
    }

    #[test]
    fn test_column_type_ignores_nulls() {
        let mut table = Table::new(vec!["n".into()]).unwrap();
        table.push_row(vec![Value::Null]);
        table.push_row(vec![json!(7)]);
        assert_eq!(table.column_type(0), ColumnType::Number);
    }

    #[test]
    fn test_rename_column() {
        let table = sample_table();
        let renamed = table.with_column_renamed("name", "full_name").unwrap();
        assert_eq!(renamed.columns(), ["full_name", "age"]);
        assert_eq!(renamed.rows(), table.rows());
    }

    #[test]
    fn test_rename_to_self_is_noop() {
        let table = sample_table();
        let renamed = table.with_column_renamed("name", "name").unwrap();
        assert_eq!(renamed, table);
    }

    #[test]
    fn test_rename_collision() {
        let result = sample_table().with_column_renamed("name", "age");
        assert!(matches!(result, Err(TransformError::DuplicateName(name)) if name == "age"));
    }

    #[test]
    fn test_rename_missing_column() {
        let result = sample_table().with_column_renamed("city", "town");
        assert!(matches!(result, Err(TransformError::MissingColumn(name)) if name == "city"));
    }

    #[test]
    fn test_retain_rows() {
        let table = sample_table();
        let filtered = table.retain_rows(|row| row[1] == json!(30));
        assert_eq!(filtered.shape(), (1, 2));
        assert_eq!(filtered.rows()[0][0], json!("john"));
    }

    #[test]
    fn test_map_column() {
        let table = sample_table();
        let mapped = table
            .with_column_mapped("name", |value| match value {
                Value::String(s) => Value::String(s.to_uppercase()),
                other => other.clone(),
            })
            .unwrap();
        assert_eq!(mapped.rows()[0][0], json!("JOHN"));
        assert_eq!(mapped.rows()[0][1], json!(30));
    }
}
