//! Ordered in-memory collection of annotations plus selection/hover overlay.
//!
//! `list()` hands out shared snapshots; every mutation is copy-on-write so a
//! snapshot taken earlier never changes under its holder.

use std::sync::Arc;

use crate::annotation::{Annotation, AnnotationId, Geometry, IdGenerator};
use crate::record::HistoryRecord;
use crate::serializer::{self, MIN_POLYGON_POINTS};

#[derive(Debug, Default)]
pub struct AnnotationStore {
    annotations: Arc<Vec<Annotation>>,
    selected: Option<AnnotationId>,
    hovered: Option<AnnotationId>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a stored prediction. Boxes come first and use `classes[i]`;
    /// masks follow and use `classes[boxes.len() + i]`. Entries whose label is
    /// missing or `"unknown"` are skipped, as are malformed shapes.
    pub fn from_record(record: &HistoryRecord, ids: &mut IdGenerator) -> Self {
        let mut annotations = Vec::new();

        for (index, raw) in record.boxes.iter().enumerate() {
            let Some(class_name) = record.class_at(index) else {
                continue;
            };
            let Some((a, b)) = serializer::parse_box(raw) else {
                tracing::debug!(index, "skipping malformed box");
                continue;
            };
            annotations.push(Annotation::new(
                ids.next_id(),
                Geometry::normalized_box(a, b),
                class_name,
            ));
        }

        for (index, raw) in record.masks.iter().enumerate() {
            let Some(class_name) = record.class_at(index + record.boxes.len()) else {
                continue;
            };
            let vertices = serializer::parse_points(raw);
            if vertices.len() < MIN_POLYGON_POINTS {
                tracing::debug!(index, points = vertices.len(), "skipping degenerate mask");
                continue;
            }
            annotations.push(Annotation::new(
                ids.next_id(),
                Geometry::Polygon { vertices },
                class_name,
            ));
        }

        tracing::debug!(count = annotations.len(), file_id = %record.file_id, "seeded annotation store");
        Self {
            annotations: Arc::new(annotations),
            selected: None,
            hovered: None,
        }
    }

    pub fn list(&self) -> Arc<Vec<Annotation>> {
        Arc::clone(&self.annotations)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn add(&mut self, annotation: Annotation) -> Arc<Vec<Annotation>> {
        debug_assert!(self.get(annotation.id).is_none(), "duplicate annotation id");
        Arc::make_mut(&mut self.annotations).push(annotation);
        self.list()
    }

    /// Apply `patch` to the annotation with `id`. Returns `None` if it does not exist.
    pub fn update(
        &mut self,
        id: AnnotationId,
        patch: impl FnOnce(&mut Annotation),
    ) -> Option<Arc<Vec<Annotation>>> {
        let index = self.annotations.iter().position(|a| a.id == id)?;
        let annotation = &mut Arc::make_mut(&mut self.annotations)[index];
        patch(annotation);
        annotation.id = id;
        Some(self.list())
    }

    pub fn set_geometry(&mut self, id: AnnotationId, geometry: Geometry) -> bool {
        self.update(id, |a| a.geometry = geometry).is_some()
    }

    /// Remove `id`, dropping selection and hover that point at it.
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let index = self.annotations.iter().position(|a| a.id == id)?;
        let removed = Arc::make_mut(&mut self.annotations).remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        Some(removed)
    }

    pub fn selected(&self) -> Option<AnnotationId> {
        self.selected
    }

    pub fn hovered(&self) -> Option<AnnotationId> {
        self.hovered
    }

    pub fn select(&mut self, id: Option<AnnotationId>) {
        self.selected = id.filter(|id| self.get(*id).is_some());
    }

    pub fn hover(&mut self, id: Option<AnnotationId>) {
        self.hovered = id.filter(|id| self.get(*id).is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;
    use serde_json::json;

    fn sample_record() -> HistoryRecord {
        HistoryRecord {
            file_id: "f".into(),
            boxes: vec![json!([10, 10, 50, 50]), json!([0, 0, 1, 1]), json!([60, 70, 20, 30])],
            masks: vec![
                json!([[0, 0], [10, 0], [5, 10]]),
                json!([1, 1, 9, 1, 5, 8]),
                json!([[0, 0], [1, 1]]),
            ],
            classes: vec![
                json!("fracture"),
                json!("unknown"),
                json!("implant"),
                json!("lesion"),
                json!("unknown"),
                json!("cyst"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn seeding_skips_unknown_and_degenerate_entries() {
        let mut ids = IdGenerator::new();
        let store = AnnotationStore::from_record(&sample_record(), &mut ids);
        let list = store.list();
        let labels: Vec<&str> = list.iter().map(|a| a.class_name.as_str()).collect();
        assert_eq!(labels, vec!["fracture", "implant", "lesion"]);
        assert_eq!(
            list[1].geometry,
            Geometry::Box { min: pos2(20.0, 30.0), max: pos2(60.0, 70.0) }
        );
        assert_eq!(
            list[2].geometry,
            Geometry::Polygon { vertices: vec![pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(5.0, 10.0)] }
        );
    }

    #[test]
    fn snapshots_are_not_mutated() {
        let mut ids = IdGenerator::new();
        let mut store = AnnotationStore::from_record(&sample_record(), &mut ids);
        let before = store.list();
        let first = before[0].id;

        store.set_geometry(first, Geometry::normalized_box(pos2(0.0, 0.0), pos2(1.0, 1.0)));
        store.remove(before[1].id);

        assert_eq!(before.len(), 3);
        assert_eq!(
            before[0].geometry,
            Geometry::Box { min: pos2(10.0, 10.0), max: pos2(50.0, 50.0) }
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_clears_selection_and_hover() {
        let mut ids = IdGenerator::new();
        let mut store = AnnotationStore::from_record(&sample_record(), &mut ids);
        let id = store.list()[0].id;
        let other = store.list()[1].id;
        store.select(Some(id));
        store.hover(Some(id));

        store.remove(id);
        assert_eq!(store.selected(), None);
        assert_eq!(store.hovered(), None);
        assert!(store.get(id).is_none());

        store.select(Some(other));
        store.remove(id);
        assert_eq!(store.selected(), Some(other));
    }

    #[test]
    fn update_missing_id_is_none() {
        let mut ids = IdGenerator::new();
        let mut store = AnnotationStore::new();
        let ghost = ids.next_id();
        assert!(store.update(ghost, |a| a.class_name.clear()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn selecting_unknown_id_clears_selection() {
        let mut ids = IdGenerator::new();
        let mut store = AnnotationStore::new();
        store.select(Some(ids.next_id()));
        assert_eq!(store.selected(), None);
    }
}
