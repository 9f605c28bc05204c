//! Shaping fetched JSON records into a DataFrame.
//!
//! Accepted shapes:
//! - `{"a": 1, "b": 2}`: an object of scalars is a single row
//! - `{"a": [1, 2], "b": [3, 4]}`: an object of equal-length arrays, one column per key
//! - `[{"a": 1}, {"a": 2, "b": 3}]`: an array of objects, one row per object
//!
//! Anything else is not a table.

use crate::error::ValidationError;
use polars::prelude::*;
use serde_json::{Map, Value};
use tracing::debug;

/// Build a DataFrame from fetched records.
///
/// Column order follows key order in the input. Columns are typed from their
/// non-null values: all numbers become `Float64`, all booleans `Boolean`, all
/// strings `String`; a column with only nulls is an all-missing `Float64`, and
/// any other mix is stringified.
pub fn dataset_from_records(records: &Value) -> Result<DataFrame, ValidationError> {
    let columns = match records {
        Value::Object(map) => columns_from_object(map)?,
        Value::Array(rows) => columns_from_rows(rows)?,
        Value::Null => {
            return Err(ValidationError::NotATable("records are null".to_string()));
        }
        other => {
            return Err(ValidationError::NotATable(format!(
                "expected an object or an array of objects, got {}",
                json_kind(other)
            )));
        }
    };

    if columns.is_empty() {
        return Err(ValidationError::NoColumns);
    }

    let columns = columns
        .into_iter()
        .map(|(name, values)| build_column(&name, &values))
        .collect::<Result<Vec<_>, _>>()?;

    let df = DataFrame::new(columns).map_err(|e| ValidationError::Build(e.to_string()))?;
    debug!("Built dataset of shape {:?} from records", df.shape());
    Ok(df)
}

type RawColumns<'a> = Vec<(String, Vec<&'a Value>)>;

static NULL: Value = Value::Null;

fn columns_from_object(map: &Map<String, Value>) -> Result<RawColumns<'_>, ValidationError> {
    if map.values().all(is_scalar) {
        return Ok(map
            .iter()
            .map(|(name, value)| (name.clone(), vec![value]))
            .collect());
    }

    if !map.values().all(Value::is_array) {
        return Err(ValidationError::NotATable(
            "object mixes scalar and non-scalar fields".to_string(),
        ));
    }

    let mut expected = None;
    let mut columns = Vec::with_capacity(map.len());
    for (name, value) in map {
        let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
        let expected_len = *expected.get_or_insert(items.len());
        if items.len() != expected_len {
            return Err(ValidationError::RaggedColumns {
                column: name.clone(),
                expected: expected_len,
                found: items.len(),
            });
        }
        columns.push((name.clone(), items.iter().collect()));
    }
    Ok(columns)
}

fn columns_from_rows(rows: &[Value]) -> Result<RawColumns<'_>, ValidationError> {
    if rows.is_empty() {
        return Err(ValidationError::Empty);
    }

    let mut objects = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        match row {
            Value::Object(object) => objects.push(object),
            other => {
                return Err(ValidationError::NotATable(format!(
                    "row {} is {}, expected an object",
                    index,
                    json_kind(other)
                )));
            }
        }
    }

    let mut names: Vec<&String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !names.contains(&key) {
                names.push(key);
            }
        }
    }

    Ok(names
        .into_iter()
        .map(|name| {
            let values: Vec<&Value> = objects
                .iter()
                .map(|object| object.get(name).unwrap_or(&NULL))
                .collect();
            (name.clone(), values)
        })
        .collect())
}

fn build_column(name: &str, values: &[&Value]) -> Result<Column, ValidationError> {
    if let Some(bad) = values.iter().find(|v| !is_scalar(v)) {
        return Err(ValidationError::UnsupportedValue {
            column: name.to_string(),
            reason: format!("nested {} is not a table cell", json_kind(bad)),
        });
    }

    let mut present = values.iter().filter(|v| !v.is_null());
    let series = if present.clone().all(|v| v.is_number()) {
        let cells: Vec<Option<f64>> = values.iter().map(|v| v.as_f64()).collect();
        Series::new(name.into(), cells)
    } else if present.clone().all(|v| v.is_boolean()) {
        let cells: Vec<Option<bool>> = values.iter().map(|v| v.as_bool()).collect();
        Series::new(name.into(), cells)
    } else if present.all(|v| v.is_string()) {
        let cells: Vec<Option<&str>> = values.iter().map(|v| v.as_str()).collect();
        Series::new(name.into(), cells)
    } else {
        let cells: Vec<Option<String>> = values
            .iter()
            .map(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect();
        Series::new(name.into(), cells)
    };

    Ok(series.into_column())
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
