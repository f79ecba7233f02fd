//! Wire types exchanged with the prediction history and the save endpoint.
//!
//! Input is deliberately loose: geometry arrives as raw JSON and is coerced by
//! the serializer. Output is strictly typed.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Class label that marks a prediction as not worth editing.
pub const UNKNOWN_CLASS: &str = "unknown";

/// A stored prediction as returned by the history endpoint.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub file_id: String,
    /// Polygons, as nested `[[x, y], ...]` or flattened `[x, y, x, y, ...]`.
    #[serde(default)]
    pub masks: Vec<Value>,
    /// `[x1, y1, x2, y2]` per box.
    #[serde(default)]
    pub boxes: Vec<Value>,
    /// Box labels first, then mask labels.
    #[serde(default)]
    pub classes: Vec<Value>,
    #[serde(default)]
    pub num_classes: Vec<Value>,
    #[serde(default)]
    pub ind_cls: Map<String, Value>,
    #[serde(default)]
    pub confs: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_to_report: Option<String>,
}

impl HistoryRecord {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Label at `index` in the shared class list, if it is a usable label.
    pub fn class_at(&self, index: usize) -> Option<&str> {
        self.classes
            .get(index)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty() && *name != UNKNOWN_CLASS)
    }

    /// This record with its annotations replaced by `payload`. Ownership and
    /// report fields carry over; `updated_at` is set to the given stamp.
    pub fn updated_with(&self, payload: &SavePayload, updated_at: String) -> HistoryRecord {
        HistoryRecord {
            user_id: self.user_id.clone(),
            created_at: self.created_at.clone(),
            updated_at: Some(updated_at),
            path_to_report: self.path_to_report.clone(),
            ..HistoryRecord::from(payload.clone())
        }
    }
}

/// Body sent to the save collaborator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub file_id: String,
    pub masks: Vec<Vec<[f32; 2]>>,
    pub boxes: Vec<[f32; 4]>,
    pub classes: Vec<String>,
    pub num_classes: Vec<usize>,
    pub ind_cls: Map<String, Value>,
    pub confs: Vec<Value>,
}

impl From<SavePayload> for HistoryRecord {
    fn from(payload: SavePayload) -> Self {
        HistoryRecord {
            file_id: payload.file_id,
            masks: payload
                .masks
                .iter()
                .map(|mask| Value::Array(mask.iter().map(|pair| number_array(pair)).collect()))
                .collect(),
            boxes: payload.boxes.iter().map(|b| number_array(b)).collect(),
            classes: payload.classes.into_iter().map(Value::String).collect(),
            num_classes: payload
                .num_classes
                .into_iter()
                .map(|n| Value::from(n as u64))
                .collect(),
            ind_cls: payload.ind_cls,
            confs: payload.confs,
            ..Default::default()
        }
    }
}

fn number_array(values: &[f32]) -> Value {
    Value::Array(values.iter().map(|v| Value::from(*v)).collect())
}
