//! Conversion between loosely typed wire geometry and the annotation model.
//!
//! Upstream predictions are not guaranteed to be well typed, so numbers may
//! arrive as strings and masks may be nested pairs or flat coordinate lists.
//! Anything that cannot become a finite number is dropped, never reported.

use egui::{pos2, Pos2};
use serde_json::Value;

use crate::annotation::{Annotation, Geometry};
use crate::geometry;
use crate::record::{HistoryRecord, SavePayload};

pub const MIN_POLYGON_POINTS: usize = 3;

/// Numbers and numeric strings become finite `f32`s; everything else is rejected.
pub fn coerce_number(value: &Value) -> Option<f32> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    let n = n as f32;
    n.is_finite().then_some(n)
}

/// Points from `[[x, y], ...]` or `[x, y, x, y, ...]`.
pub fn parse_points(value: &Value) -> Vec<Pos2> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    let nested = items.first().is_some_and(Value::is_array);
    if nested {
        items
            .iter()
            .filter_map(|pair| {
                let pair = pair.as_array()?;
                if pair.len() < 2 {
                    return None;
                }
                Some(pos2(coerce_number(&pair[0])?, coerce_number(&pair[1])?))
            })
            .collect()
    } else {
        items
            .chunks_exact(2)
            .filter_map(|pair| Some(pos2(coerce_number(&pair[0])?, coerce_number(&pair[1])?)))
            .collect()
    }
}

/// A `[x1, y1, x2, y2]` box with every value finite.
pub fn parse_box(value: &Value) -> Option<(Pos2, Pos2)> {
    let items = value.as_array()?;
    if items.len() != 4 {
        return None;
    }
    let mut coords = [0.0f32; 4];
    for (slot, item) in coords.iter_mut().zip(items) {
        *slot = coerce_number(item)?;
    }
    Some((pos2(coords[0], coords[1]), pos2(coords[2], coords[3])))
}

/// Build the save payload: boxes and polygons as separate lists, labels of
/// boxes followed by labels of polygons, indices counted per list.
pub fn to_payload(annotations: &[Annotation], record: &HistoryRecord) -> SavePayload {
    let mut boxes = Vec::new();
    let mut box_classes = Vec::new();
    let mut masks = Vec::new();
    let mut mask_classes = Vec::new();

    for ann in annotations {
        match &ann.geometry {
            Geometry::Box { min, max } => {
                if !(geometry::is_finite(*min) && geometry::is_finite(*max)) {
                    continue;
                }
                boxes.push([min.x, min.y, max.x, max.y]);
                box_classes.push(ann.class_name.clone());
            }
            Geometry::Polygon { vertices } => {
                let points: Vec<[f32; 2]> = vertices
                    .iter()
                    .filter(|p| geometry::is_finite(**p))
                    .map(|p| [p.x, p.y])
                    .collect();
                if points.len() < MIN_POLYGON_POINTS {
                    continue;
                }
                masks.push(points);
                mask_classes.push(ann.class_name.clone());
            }
        }
    }

    let num_classes = (0..box_classes.len()).chain(0..mask_classes.len()).collect();
    let mut classes = box_classes;
    classes.extend(mask_classes);

    SavePayload {
        file_id: record.file_id.clone(),
        masks,
        boxes,
        classes,
        num_classes,
        ind_cls: record.ind_cls.clone(),
        confs: record.confs.clone(),
    }
}
