//! CSV parsing with automatic encoding and delimiter detection.
//!
//! Raw upload bytes become a [`Table`]: encoding is detected with chardet
//! and decoded with encoding_rs, the delimiter is picked by counting
//! candidates in the header line, and each column gets a scalar type
//! inferred from its non-empty cells (integers, then floats, then booleans,
//! otherwise text). Empty cells become JSON null.

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde_json::{Number, Value};

use crate::error::{CsvError, CsvResult, TransformError};
use crate::table::Table;

/// Result of parsing with detection metadata.
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    /// Parsed table with typed cells.
    pub table: Table,
    /// Detected encoding.
    pub encoding: String,
    /// Detected delimiter.
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the specified encoding.
///
/// Recognized codepages decode totally. UTF-8 and unrecognized labels
/// decode strictly, with invalid sequences reported rather than mangled.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.to_string())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()),
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .map_err(|e| CsvError::EncodingError(format!("content is not valid utf-8: {}", e))),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(codec) => Ok(codec.decode(bytes).0.to_string()),
            None => String::from_utf8(bytes.to_vec()).map_err(|e| {
                CsvError::EncodingError(format!("content is not valid {}: {}", other, e))
            }),
        },
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Candidates are comma, semicolon, tab and pipe; comma wins ties.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// use tablepipe::parser::parse_bytes;
///
/// let parsed = parse_bytes(b"name,age\nAlice,30\nBob,25")?;
/// assert_eq!(parsed.table.shape(), (2, 2));
/// assert_eq!(parsed.delimiter, ',');
/// ```
pub fn parse_bytes(bytes: &[u8]) -> CsvResult<ParsedCsv> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let delimiter = detect_delimiter(&content);
    let table = parse_content(&content, delimiter)?;

    Ok(ParsedCsv {
        table,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn parse_file<P: AsRef<Path>>(path: P) -> CsvResult<ParsedCsv> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes)
}

/// Parse decoded CSV content with an explicit delimiter.
pub fn parse_content(content: &str, delimiter: char) -> CsvResult<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CsvError::ParseError(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| CsvError::ParseError(e.to_string()))?;
        raw_rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    let types: Vec<Inferred> = (0..headers.len())
        .map(|column| infer_column_type(&raw_rows, column))
        .collect();

    let mut table = Table::new(headers).map_err(|e| match e {
        TransformError::DuplicateName(name) => CsvError::DuplicateHeader(name),
        other => CsvError::ParseError(other.to_string()),
    })?;
    for raw_row in &raw_rows {
        let row = types
            .iter()
            .enumerate()
            .map(|(column, inferred)| {
                raw_row
                    .get(column)
                    .map(|cell| typed_cell(cell, *inferred))
                    .unwrap_or(Value::Null)
            })
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

/// Scalar type shared by every non-empty cell of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inferred {
    Int,
    Float,
    Bool,
    Text,
}

fn infer_column_type(rows: &[Vec<String>], column: usize) -> Inferred {
    let mut all_int = true;
    let mut all_float = true;
    let mut all_bool = true;
    let mut saw_value = false;

    for row in rows {
        let cell = match row.get(column) {
            Some(cell) if !cell.is_empty() => cell.as_str(),
            _ => continue,
        };
        saw_value = true;
        if all_int && cell.parse::<i64>().is_err() {
            all_int = false;
        }
        if all_float && !cell.parse::<f64>().map(f64::is_finite).unwrap_or(false) {
            all_float = false;
        }
        if all_bool && !cell.eq_ignore_ascii_case("true") && !cell.eq_ignore_ascii_case("false") {
            all_bool = false;
        }
    }

    if !saw_value {
        // All cells empty; Text keeps the nulls untouched.
        Inferred::Text
    } else if all_int {
        Inferred::Int
    } else if all_float {
        Inferred::Float
    } else if all_bool {
        Inferred::Bool
    } else {
        Inferred::Text
    }
}

fn typed_cell(cell: &str, inferred: Inferred) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    match inferred {
        Inferred::Int => cell
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(cell.to_string())),
        Inferred::Float => cell
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(cell.to_string())),
        Inferred::Bool => Value::Bool(cell.eq_ignore_ascii_case("true")),
        Inferred::Text => Value::String(cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_csv() {
        let parsed = parse_bytes(b"name,age\nAlice,30\nBob,25").unwrap();

        assert_eq!(parsed.table.shape(), (2, 2));
        assert_eq!(parsed.table.columns(), ["name", "age"]);
        assert_eq!(parsed.table.rows()[0], vec![json!("Alice"), json!(30)]);
        assert_eq!(parsed.table.rows()[1], vec![json!("Bob"), json!(25)]);
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
    }

    #[test]
    fn test_detect_delimiter_pipe() {
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_delimiter_defaults_to_comma() {
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_quoted_values_keep_delimiter() {
        let table = parse_content("name,value\n\"Alice\",\"Hello, World\"", ',').unwrap();
        assert_eq!(table.rows()[0][1], json!("Hello, World"));
    }

    #[test]
    fn test_float_column() {
        let table = parse_content("x\n1.5\n2\n-0.25", ',').unwrap();
        assert_eq!(table.rows()[0][0], json!(1.5));
        assert_eq!(table.rows()[1][0], json!(2.0));
        assert_eq!(table.rows()[2][0], json!(-0.25));
    }

    #[test]
    fn test_bool_column() {
        let table = parse_content("flag\ntrue\nFalse\nTRUE", ',').unwrap();
        assert_eq!(table.rows()[0][0], json!(true));
        assert_eq!(table.rows()[1][0], json!(false));
        assert_eq!(table.rows()[2][0], json!(true));
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let table = parse_content("x\n1\ntrue\nhello", ',').unwrap();
        assert_eq!(table.rows()[0][0], json!("1"));
        assert_eq!(table.rows()[1][0], json!("true"));
        assert_eq!(table.rows()[2][0], json!("hello"));
    }

    #[test]
    fn test_empty_cells_become_null() {
        let table = parse_content("a,b\n1,\n2,x", ',').unwrap();
        assert_eq!(table.rows()[0][1], Value::Null);
        assert_eq!(table.rows()[1][1], json!("x"));
        // Nulls do not break numeric inference of the other column.
        assert_eq!(table.rows()[0][0], json!(1));
    }

    #[test]
    fn test_short_rows_padded() {
        let table = parse_content("a,b,c\n1,2", ',').unwrap();
        assert_eq!(table.rows()[0], vec![json!(1), json!(2), Value::Null]);
    }

    #[test]
    fn test_long_rows_truncated() {
        let table = parse_content("a,b\n1,2,3,4", ',').unwrap();
        assert_eq!(table.shape(), (1, 2));
        assert_eq!(table.rows()[0], vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_empty_file_error() {
        assert!(matches!(parse_bytes(b""), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes(b"  \n \n"), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_blank_header_row_error() {
        assert!(matches!(parse_bytes(b",,\n1,2,3\n"), Err(CsvError::NoHeaders)));
    }

    #[test]
    fn test_duplicate_header_error() {
        let result = parse_content("name,name\n1,2", ',');
        assert!(matches!(result, Err(CsvError::DuplicateHeader(name)) if name == "name"));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert!(decoded.starts_with("Soci"));
    }

    #[test]
    fn test_undecodable_utf8_error() {
        // UTF-8 BOM, then a multibyte sequence truncated at end of input.
        let result = parse_bytes(b"\xEF\xBB\xBFname,age\nAl\xC3");
        assert!(matches!(result, Err(CsvError::EncodingError(_))));
    }

    #[test]
    fn test_auto_parse_metadata() {
        let parsed = parse_bytes(b"name;age\nAlice;30\nBob;25").unwrap();
        assert_eq!(parsed.delimiter, ';');
        assert_eq!(parsed.encoding, "utf-8");
        assert_eq!(parsed.table.shape(), (2, 2));
    }

    #[test]
    fn test_parse_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "city,population\nBoston,650000\n").unwrap();
        let parsed = parse_file(file.path()).unwrap();
        assert_eq!(parsed.table.columns(), ["city", "population"]);
        assert_eq!(parsed.table.rows()[0][1], json!(650000));
    }
}
