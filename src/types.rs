use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BridgeError, BridgeResult};

//==============================================================================
// Split-layout table
//==============================================================================

/// Keys every split-layout payload must carry.
pub const REQUIRED_KEYS: [&str; 3] = ["index", "columns", "data"];

/// Widest sheet a workbook can hold.
pub const MAX_COLUMNS: usize = 16_384;
/// Body rows that fit below the header row.
pub const MAX_BODY_ROWS: usize = 1_048_575;

/// A table encoded as three parallel arrays: row labels, column names and rows.
///
/// Rows are aligned positionally with `columns`; every row has exactly
/// `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TablePayload {
    pub index: Vec<Value>,
    pub columns: Vec<Value>,
    pub data: Vec<Vec<Value>>,
}

impl TablePayload {
    /// Build a payload with a `0..n` integer index
    pub fn with_range_index(columns: Vec<Value>, data: Vec<Vec<Value>>) -> Self {
        let index = (0..data.len()).map(|i| Value::from(i as u64)).collect();
        Self {
            index,
            columns,
            data,
        }
    }

    /// Rebuild a table from the `data` object of an export request.
    ///
    /// An empty object is rejected before key presence is checked. `index` must be
    /// present but its values are never written out.
    pub fn from_request(mut body: Map<String, Value>) -> BridgeResult<Self> {
        if body.is_empty() {
            return Err(BridgeError::InvalidRequestBody);
        }
        if REQUIRED_KEYS.iter().any(|key| !body.contains_key(*key)) {
            return Err(BridgeError::MissingKeys);
        }

        let index = match body.remove("index") {
            Some(Value::Array(labels)) => labels,
            _ => Vec::new(),
        };
        let columns = expect_list(body.remove("columns"), "columns")?;
        let rows = expect_list(body.remove("data"), "data")?;

        let data = rows
            .into_iter()
            .enumerate()
            .map(|(row_idx, row)| match row {
                Value::Array(cells) => Ok(cells),
                other => Err(BridgeError::Value(format!(
                    "row {} of 'data' must be a list, got {}",
                    row_idx,
                    json_kind(&other)
                ))),
            })
            .collect::<BridgeResult<Vec<_>>>()?;

        let table = Self {
            index,
            columns,
            data,
        };
        table.check_shape()?;
        Ok(table)
    }

    /// The table must fit on one sheet and every row must be exactly as wide
    /// as the header
    pub fn check_shape(&self) -> BridgeResult<()> {
        if self.columns.len() > MAX_COLUMNS || self.data.len() > MAX_BODY_ROWS {
            return Err(BridgeError::Value(format!(
                "This sheet is too large! Your sheet size is: {}, {} Max sheet size is: {}, {}",
                self.data.len() + 1,
                self.columns.len(),
                MAX_BODY_ROWS + 1,
                MAX_COLUMNS
            )));
        }
        for row in &self.data {
            if row.len() != self.columns.len() {
                return Err(BridgeError::Value(format!(
                    "{} columns passed, passed data had {} columns",
                    self.columns.len(),
                    row.len()
                )));
            }
        }
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

fn expect_list(value: Option<Value>, key: &str) -> BridgeResult<Vec<Value>> {
    match value {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(BridgeError::Value(format!(
            "'{}' must be a list, got {}",
            key,
            json_kind(&other)
        ))),
        None => Err(BridgeError::MissingKeys),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

//==============================================================================
// Demo item
//==============================================================================

/// Item accepted and echoed by `POST /items/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
}
