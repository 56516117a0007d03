//! File export for reports and task lists.
//!
//! JSON is written pretty-printed with field order preserved. CSV output
//! flattens each row to one line: the header is the union of keys across all
//! rows in first-seen order, whitespace runs collapse to a single space, and
//! nested values are rendered as compact JSON.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Where an export went.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub format: &'static str,
    pub path: String,
    pub rows: usize,
    pub written: bool,
}

/// Write rows as a pretty JSON array.
pub fn save_json<T: Serialize>(path: &Path, rows: &[T]) -> Result<ExportSummary> {
    let json = serde_json::to_string_pretty(rows)?;
    write_atomic(path, json.as_bytes())?;
    tracing::info!(path = %path.display(), rows = rows.len(), "saved json");
    Ok(ExportSummary {
        format: ExportFormat::Json.as_str(),
        path: path.display().to_string(),
        rows: rows.len(),
        written: true,
    })
}

/// Read back a file written by [`save_json`].
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write rows as CSV. Empty input writes nothing.
pub fn save_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<ExportSummary> {
    let mut summary = ExportSummary {
        format: ExportFormat::Csv.as_str(),
        path: path.display().to_string(),
        rows: rows.len(),
        written: false,
    };
    if rows.is_empty() {
        tracing::warn!(path = %path.display(), "no data to write");
        return Ok(summary);
    }
    let csv = to_csv_string(rows)?;
    write_atomic(path, csv.as_bytes())?;
    tracing::info!(path = %path.display(), rows = rows.len(), "saved csv");
    summary.written = true;
    Ok(summary)
}

/// Render rows as CSV text, header included.
pub fn to_csv_string<T: Serialize>(rows: &[T]) -> Result<String> {
    let objects = rows
        .iter()
        .map(|row| -> Result<Map<String, Value>> {
            match serde_json::to_value(row)? {
                Value::Object(map) => Ok(map),
                other => {
                    let mut map = Map::new();
                    map.insert("value".to_string(), other);
                    Ok(map)
                }
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let mut header: Vec<&str> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !header.contains(&key.as_str()) {
                header.push(key);
            }
        }
    }

    let mut out = String::new();
    push_line(&mut out, header.iter().map(|key| escape(key)));
    for object in &objects {
        push_line(
            &mut out,
            header
                .iter()
                .map(|key| escape(&cell(object.get(*key).unwrap_or(&Value::Null)))),
        );
    }
    Ok(out)
}

fn push_line(out: &mut String, fields: impl Iterator<Item = String>) {
    let fields: Vec<String> = fields.collect();
    out.push_str(&fields.join(","));
    out.push('\n');
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => collapse_whitespace(text),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(_) | Value::Object(_) => collapse_whitespace(&value.to_string()),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn escape(field: &str) -> String {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write through a temp file and rename so readers never see partial output.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| Error::InvalidArgument(format!("not a file path: {}", path.display())))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        name: String,
        count: u32,
    }

    #[test]
    fn header_is_union_in_first_seen_order() {
        let rows = vec![json!({"a": 1, "b": 2}), json!({"c": 3, "a": 4})];
        let csv = to_csv_string(&rows).expect("csv");
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("a,b,c"));
        assert_eq!(lines.next(), Some("1,2,"));
        assert_eq!(lines.next(), Some("4,,3"));
    }

    #[test]
    fn text_is_flattened_and_quoted() {
        let rows = vec![json!({
            "text": "line one\n\n  line two",
            "quoted": "say \"hi\", please",
            "nested": [{"k": "v"}],
            "missing": null,
        })];
        let csv = to_csv_string(&rows).expect("csv");
        let body = csv.lines().nth(1).expect("row");
        assert_eq!(
            body,
            r#"line one line two,"say ""hi"", please","[{""k"":""v""}]","#
        );
    }

    #[test]
    fn empty_csv_writes_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("out.csv");
        let summary = save_csv::<Row>(&path, &[]).expect("save");
        assert!(!summary.written);
        assert!(!path.exists());
    }

    #[test]
    fn json_survives_save_and_load() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("rows.json");
        let rows = vec![Row {
            name: "Zoë Ångström".to_string(),
            count: 3,
        }];
        save_json(&path, &rows).expect("save");
        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.contains("Zoë Ångström"));
        let loaded: Vec<Row> = load_json(&path).expect("load");
        assert_eq!(loaded, rows);
        assert!(!dir.path().join("nested").join("rows.json.tmp").exists());
    }
}
