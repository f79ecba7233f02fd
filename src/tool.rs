//! Tool state machine: interprets pointer input according to the active tool
//! and the gesture in progress.

use egui::{Pos2, Vec2};

use crate::annotation::{Annotation, AnnotationId, Geometry, IdGenerator};
use crate::config::{DrawingConfig, EditorConfig};
use crate::guard::DrawGuard;
use crate::record::HistoryRecord;
use crate::serializer::{self, MIN_POLYGON_POINTS};
use crate::store::AnnotationStore;
use crate::viewport::{Viewport, ZoomDirection};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    Pan,
    Select,
    DrawBox,
    DrawPolygon,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Pan, Tool::Select, Tool::DrawBox, Tool::DrawPolygon];

    pub fn label(self) -> &'static str {
        match self {
            Tool::Pan => "Pan",
            Tool::Select => "Select",
            Tool::DrawBox => "Draw Box",
            Tool::DrawPolygon => "Draw Mask",
        }
    }
}

/// The gesture currently in progress. Positions are image space except for
/// the pan grab point, which is screen space.
#[derive(Clone, Debug, PartialEq)]
pub enum Interaction {
    Idle,
    Panning { grab: Pos2, start_offset: Vec2 },
    DrawingBox { start: Pos2, current: Pos2 },
    DrawingPolygon { vertices: Vec<Pos2> },
    MovingAnnotation { id: AnnotationId, grab: Pos2, original: Geometry },
    MovingVertex { id: AnnotationId, index: usize, original: Pos2 },
}

impl Interaction {
    pub fn is_moving(&self) -> bool {
        matches!(
            self,
            Interaction::MovingAnnotation { .. } | Interaction::MovingVertex { .. }
        )
    }
}

/// A finished shape waiting for its class label.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingLabel {
    pub geometry: Geometry,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LabelResponse {
    Submit(String),
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerOutcome {
    None,
    /// The draw guard refused to start a shape here.
    DrawRejected,
    /// A shape is complete and needs a label, see [`Editor::resolve_label`].
    LabelRequested,
}

impl PointerOutcome {
    /// Combine outcomes of consecutive events in one frame, keeping the first
    /// that asks for something.
    pub fn or(self, next: PointerOutcome) -> PointerOutcome {
        match self {
            PointerOutcome::None => next,
            other => other,
        }
    }
}

pub struct Editor {
    config: DrawingConfig,
    viewport: Viewport,
    store: AnnotationStore,
    ids: IdGenerator,
    tool: Tool,
    interaction: Interaction,
    pending_label: Option<PendingLabel>,
    guard: Box<dyn DrawGuard>,
}

impl Editor {
    pub fn new(config: &EditorConfig, guard: Box<dyn DrawGuard>) -> Self {
        Self {
            config: config.drawing.clone(),
            viewport: Viewport::new(&config.viewport),
            store: AnnotationStore::new(),
            ids: IdGenerator::new(),
            tool: Tool::Pan,
            interaction: Interaction::Idle,
            pending_label: None,
            guard,
        }
    }

    pub fn from_record(
        record: &HistoryRecord,
        config: &EditorConfig,
        guard: Box<dyn DrawGuard>,
    ) -> Self {
        let mut editor = Self::new(config, guard);
        editor.store = AnnotationStore::from_record(record, &mut editor.ids);
        editor
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn pending_label(&self) -> Option<&PendingLabel> {
        self.pending_label.as_ref()
    }

    /// A different image is now underneath: swap the draw policy, drop any
    /// gesture in progress and return the view to 1:1.
    pub fn replace_image(&mut self, guard: Box<dyn DrawGuard>) {
        self.guard = guard;
        self.interaction = Interaction::Idle;
        self.viewport.reset();
    }

    /// Switch tools, abandoning whatever gesture was in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        if tool != self.tool {
            tracing::debug!(from = ?self.tool, to = ?tool, "tool switched");
        }
        self.tool = tool;
        self.interaction = Interaction::Idle;
        self.pending_label = None;
        if tool != Tool::Select {
            self.store.select(None);
        }
        self.store.hover(None);
    }

    pub fn zoom(&mut self, cursor: Pos2, direction: ZoomDirection) {
        self.viewport.zoom_at(cursor, direction);
    }

    pub fn pointer_down(&mut self, screen: Pos2) -> PointerOutcome {
        if self.pending_label.is_some() {
            return PointerOutcome::None;
        }
        let p = self.viewport.screen_to_image(screen);

        if let Interaction::DrawingPolygon { vertices } = &mut self.interaction {
            if !self.guard.can_draw_at(p) {
                return PointerOutcome::DrawRejected;
            }
            vertices.push(p);
            return PointerOutcome::None;
        }
        if self.interaction != Interaction::Idle {
            return PointerOutcome::None;
        }

        match self.tool {
            Tool::Pan => {
                self.interaction = Interaction::Panning {
                    grab: screen,
                    start_offset: self.viewport.offset(),
                };
                self.store.select(None);
            }
            Tool::DrawBox => {
                if !self.guard.can_draw_at(p) {
                    return PointerOutcome::DrawRejected;
                }
                self.interaction = Interaction::DrawingBox { start: p, current: p };
                self.store.select(None);
            }
            Tool::DrawPolygon => {
                if !self.guard.can_draw_at(p) {
                    return PointerOutcome::DrawRejected;
                }
                self.interaction = Interaction::DrawingPolygon { vertices: vec![p] };
            }
            Tool::Select => {
                if let Some((id, index, original)) = self.vertex_at(p) {
                    self.interaction = Interaction::MovingVertex { id, index, original };
                } else if let Some((id, original)) =
                    self.annotation_at(p).map(|a| (a.id, a.geometry.clone()))
                {
                    self.store.select(Some(id));
                    self.interaction = Interaction::MovingAnnotation { id, grab: p, original };
                } else {
                    self.store.select(None);
                }
            }
        }
        PointerOutcome::None
    }

    pub fn pointer_move(&mut self, screen: Pos2) {
        let p = self.viewport.screen_to_image(screen);

        if self.interaction == Interaction::Idle {
            if self.tool == Tool::Select && self.pending_label.is_none() {
                let hovered = self.annotation_at(p).map(|a| a.id);
                self.store.hover(hovered);
            }
            return;
        }

        match &mut self.interaction {
            Interaction::Idle => {}
            Interaction::Panning { grab, start_offset } => {
                self.viewport.pan_from(*start_offset, *grab, screen);
            }
            Interaction::DrawingBox { current, .. } => *current = p,
            Interaction::DrawingPolygon { vertices } => {
                let far_enough = vertices
                    .last()
                    .is_some_and(|last| last.distance(p) > self.config.polygon_vertex_spacing);
                if far_enough {
                    vertices.push(p);
                }
            }
            Interaction::MovingAnnotation { id, grab, original } => {
                self.store.set_geometry(*id, original.translated(p - *grab));
            }
            Interaction::MovingVertex { id, index, .. } => {
                let index = *index;
                self.store.update(*id, |a| {
                    if let Geometry::Polygon { vertices } = &mut a.geometry {
                        if let Some(v) = vertices.get_mut(index) {
                            *v = p;
                        }
                    }
                });
            }
        }
    }

    pub fn pointer_up(&mut self) -> PointerOutcome {
        match std::mem::replace(&mut self.interaction, Interaction::Idle) {
            Interaction::DrawingBox { start, current } => {
                let min = self.config.min_box_size;
                if (current.x - start.x).abs() > min && (current.y - start.y).abs() > min {
                    self.pending_label = Some(PendingLabel {
                        geometry: Geometry::normalized_box(start, current),
                    });
                    return PointerOutcome::LabelRequested;
                }
                tracing::debug!("box too small, discarded");
            }
            Interaction::DrawingPolygon { vertices } => {
                if vertices.len() >= MIN_POLYGON_POINTS {
                    self.pending_label = Some(PendingLabel {
                        geometry: Geometry::Polygon { vertices },
                    });
                    return PointerOutcome::LabelRequested;
                }
                // keep collecting vertices on the next click
                self.interaction = Interaction::DrawingPolygon { vertices };
            }
            Interaction::Idle
            | Interaction::Panning { .. }
            | Interaction::MovingAnnotation { .. }
            | Interaction::MovingVertex { .. } => {}
        }
        PointerOutcome::None
    }

    /// Pointer left the canvas: finish the gesture and drop hover.
    pub fn pointer_leave(&mut self) -> PointerOutcome {
        let outcome = self.pointer_up();
        self.store.hover(None);
        outcome
    }

    /// Abandon the gesture in progress; moves are reverted.
    pub fn cancel(&mut self) {
        match std::mem::replace(&mut self.interaction, Interaction::Idle) {
            Interaction::MovingAnnotation { id, original, .. } => {
                self.store.set_geometry(id, original);
            }
            Interaction::MovingVertex { id, index, original } => {
                self.store.update(id, |a| {
                    if let Geometry::Polygon { vertices } = &mut a.geometry {
                        if let Some(v) = vertices.get_mut(index) {
                            *v = original;
                        }
                    }
                });
            }
            _ => {}
        }
    }

    /// Complete the pending shape. Blank labels fall back to the configured
    /// default; cancelling discards the shape.
    pub fn resolve_label(&mut self, response: LabelResponse) -> Option<AnnotationId> {
        let pending = self.pending_label.take()?;
        let text = match response {
            LabelResponse::Submit(text) => text,
            LabelResponse::Cancel => {
                tracing::debug!("label dialog cancelled, shape discarded");
                return None;
            }
        };

        let trimmed = text.trim();
        let class_name = if trimmed.is_empty() {
            self.config.default_class_name.clone()
        } else {
            trimmed.to_string()
        };

        let id = self.ids.next_id();
        let annotation = Annotation::new(id, pending.geometry, class_name);
        tracing::info!(%id, kind = ?annotation.kind(), class = %annotation.class_name, "annotation added");
        self.store.add(annotation);
        self.store.select(Some(id));
        Some(id)
    }

    pub fn can_delete(&self) -> bool {
        self.tool == Tool::Select && !self.interaction.is_moving() && self.store.selected().is_some()
    }

    pub fn delete_selected(&mut self) -> Option<Annotation> {
        if !self.can_delete() {
            return None;
        }
        let id = self.store.selected()?;
        let removed = self.store.remove(id);
        self.store.select(None);
        self.store.hover(None);
        if let Some(removed) = &removed {
            tracing::info!(%id, class = %removed.class_name, "annotation deleted");
        }
        removed
    }

    pub fn annotations(&self) -> std::sync::Arc<Vec<Annotation>> {
        self.store.list()
    }

    pub fn to_payload(&self, record: &HistoryRecord) -> crate::record::SavePayload {
        serializer::to_payload(&self.store.list(), record)
    }

    /// Topmost polygon vertex within the hit radius of `p`.
    fn vertex_at(&self, p: Pos2) -> Option<(AnnotationId, usize, Pos2)> {
        let radius = self.config.vertex_hit_radius;
        self.store.iter().rev().find_map(|a| match &a.geometry {
            Geometry::Polygon { vertices } => vertices
                .iter()
                .position(|v| v.distance(p) < radius)
                .map(|index| (a.id, index, vertices[index])),
            Geometry::Box { .. } => None,
        })
    }

    /// Topmost annotation containing `p`.
    fn annotation_at(&self, p: Pos2) -> Option<&Annotation> {
        self.store.iter().rev().find(|a| a.geometry.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::{AllowAll, BrightnessGuard};
    use egui::{pos2, vec2};
    use serde_json::json;
    use std::sync::Arc;

    fn editor() -> Editor {
        Editor::new(&EditorConfig::default(), Box::new(AllowAll))
    }

    fn seeded() -> Editor {
        let record = HistoryRecord {
            file_id: "f".into(),
            boxes: vec![json!([10, 10, 50, 50])],
            masks: vec![json!([[100, 100], [140, 100], [120, 140]])],
            classes: vec![json!("fracture"), json!("lesion")],
            ..Default::default()
        };
        Editor::from_record(&record, &EditorConfig::default(), Box::new(AllowAll))
    }

    fn drag(editor: &mut Editor, from: Pos2, to: Pos2) -> PointerOutcome {
        let down = editor.pointer_down(from);
        if down != PointerOutcome::None {
            return down;
        }
        editor.pointer_move(to);
        editor.pointer_up()
    }

    #[test]
    fn pan_moves_offset_and_clears_selection() {
        let mut ed = seeded();
        ed.set_tool(Tool::Select);
        ed.pointer_down(pos2(20.0, 20.0));
        ed.pointer_up();
        assert!(ed.store().selected().is_some());

        ed.set_tool(Tool::Pan);
        drag(&mut ed, pos2(0.0, 0.0), pos2(30.0, -10.0));
        assert_eq!(ed.viewport().offset(), vec2(30.0, -10.0));
        assert_eq!(ed.store().selected(), None);
        assert_eq!(*ed.interaction(), Interaction::Idle);
    }

    #[test]
    fn release_then_leave_in_one_frame_keeps_the_label_request() {
        let mut ed = editor();
        ed.set_tool(Tool::DrawBox);
        ed.pointer_down(pos2(10.0, 10.0));
        ed.pointer_move(pos2(60.0, 60.0));
        let outcome = ed.pointer_up().or(ed.pointer_leave());
        assert_eq!(outcome, PointerOutcome::LabelRequested);
        assert!(ed.pending_label().is_some());

        let id = ed.resolve_label(LabelResponse::Submit("fracture".into()));
        assert!(id.is_some());
        ed.pointer_down(pos2(100.0, 100.0));
        assert!(matches!(ed.interaction(), Interaction::DrawingBox { .. }));
    }

    #[test]
    fn outcome_or_prefers_the_first_request() {
        use PointerOutcome::*;
        assert_eq!(None.or(LabelRequested), LabelRequested);
        assert_eq!(LabelRequested.or(None), LabelRequested);
        assert_eq!(DrawRejected.or(LabelRequested), DrawRejected);
        assert_eq!(None.or(None), None);
    }

    #[test]
    fn small_box_is_never_committed() {
        let mut ed = editor();
        ed.set_tool(Tool::DrawBox);
        assert_eq!(drag(&mut ed, pos2(0.0, 0.0), pos2(5.0, 40.0)), PointerOutcome::None);
        assert_eq!(drag(&mut ed, pos2(0.0, 0.0), pos2(40.0, 5.0)), PointerOutcome::None);
        assert!(ed.pending_label().is_none());
        assert!(ed.store().is_empty());
    }

    #[test]
    fn box_commit_is_normalized_and_selected() {
        let mut ed = editor();
        ed.set_tool(Tool::DrawBox);
        let outcome = drag(&mut ed, pos2(60.0, 50.0), pos2(20.0, 10.0));
        assert_eq!(outcome, PointerOutcome::LabelRequested);

        let id = ed.resolve_label(LabelResponse::Submit("  nodule ".into())).unwrap();
        let ann = ed.store().get(id).unwrap();
        assert_eq!(ann.class_name, "nodule");
        assert_eq!(ann.geometry, Geometry::Box { min: pos2(20.0, 10.0), max: pos2(60.0, 50.0) });
        assert_eq!(ed.store().selected(), Some(id));
    }

    #[test]
    fn box_uses_image_space_at_zoom() {
        let mut ed = editor();
        ed.viewport.set(2.0, vec2(0.0, 0.0));
        ed.set_tool(Tool::DrawBox);
        // 8 screen px is only 4 image units at scale 2
        assert_eq!(drag(&mut ed, pos2(0.0, 0.0), pos2(8.0, 8.0)), PointerOutcome::None);
        assert_eq!(
            drag(&mut ed, pos2(0.0, 0.0), pos2(20.0, 20.0)),
            PointerOutcome::LabelRequested
        );
    }

    #[test]
    fn blank_label_uses_default_and_cancel_discards() {
        let mut ed = editor();
        ed.set_tool(Tool::DrawBox);
        drag(&mut ed, pos2(0.0, 0.0), pos2(30.0, 30.0));
        let id = ed.resolve_label(LabelResponse::Submit("   ".into())).unwrap();
        assert_eq!(ed.store().get(id).unwrap().class_name, "new_object");

        drag(&mut ed, pos2(0.0, 0.0), pos2(30.0, 30.0));
        assert_eq!(ed.resolve_label(LabelResponse::Cancel), None);
        assert_eq!(ed.store().len(), 1);
        assert!(ed.pending_label().is_none());
    }

    #[test]
    fn input_is_ignored_while_label_pending() {
        let mut ed = editor();
        ed.set_tool(Tool::DrawBox);
        drag(&mut ed, pos2(0.0, 0.0), pos2(30.0, 30.0));
        assert_eq!(ed.pointer_down(pos2(50.0, 50.0)), PointerOutcome::None);
        assert_eq!(*ed.interaction(), Interaction::Idle);
    }

    #[test]
    fn freehand_polygon_respects_vertex_spacing() {
        let mut ed = editor();
        ed.set_tool(Tool::DrawPolygon);
        ed.pointer_down(pos2(0.0, 0.0));
        ed.pointer_move(pos2(5.0, 0.0));
        ed.pointer_move(pos2(10.0, 0.0));
        ed.pointer_move(pos2(11.0, 0.0));
        ed.pointer_move(pos2(11.0, 12.0));
        match ed.interaction() {
            Interaction::DrawingPolygon { vertices } => {
                assert_eq!(vertices, &vec![pos2(0.0, 0.0), pos2(11.0, 0.0), pos2(11.0, 12.0)]);
            }
            other => panic!("unexpected interaction {other:?}"),
        }
        assert_eq!(ed.pointer_up(), PointerOutcome::LabelRequested);
        assert_eq!(*ed.interaction(), Interaction::Idle);
    }

    #[test]
    fn polygon_with_two_vertices_is_not_committed() {
        let mut ed = editor();
        ed.set_tool(Tool::DrawPolygon);
        ed.pointer_down(pos2(0.0, 0.0));
        ed.pointer_move(pos2(20.0, 0.0));
        assert_eq!(ed.pointer_up(), PointerOutcome::None);
        assert!(ed.pending_label().is_none());

        ed.set_tool(Tool::Select);
        assert_eq!(*ed.interaction(), Interaction::Idle);
        assert!(ed.store().is_empty());
    }

    #[test]
    fn polygon_by_clicks() {
        let mut ed = editor();
        ed.set_tool(Tool::DrawPolygon);
        for p in [pos2(0.0, 0.0), pos2(10.0, 0.0)] {
            ed.pointer_down(p);
            assert_eq!(ed.pointer_up(), PointerOutcome::None);
        }
        ed.pointer_down(pos2(5.0, 10.0));
        assert_eq!(ed.pointer_up(), PointerOutcome::LabelRequested);
        let id = ed.resolve_label(LabelResponse::Submit("lesion".into())).unwrap();
        assert_eq!(
            ed.store().get(id).unwrap().geometry,
            Geometry::Polygon { vertices: vec![pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(5.0, 10.0)] }
        );
    }

    #[test]
    fn drawing_rejected_on_dark_pixels() {
        let image = image::RgbaImage::from_pixel(100, 100, image::Rgba([5, 5, 5, 255]));
        let guard = BrightnessGuard::new(Arc::new(image), &Default::default());
        let mut ed = Editor::new(&EditorConfig::default(), Box::new(guard));

        ed.set_tool(Tool::DrawBox);
        assert_eq!(ed.pointer_down(pos2(50.0, 50.0)), PointerOutcome::DrawRejected);
        assert_eq!(*ed.interaction(), Interaction::Idle);
        ed.set_tool(Tool::DrawPolygon);
        assert_eq!(ed.pointer_down(pos2(50.0, 50.0)), PointerOutcome::DrawRejected);
        assert_eq!(*ed.interaction(), Interaction::Idle);
    }

    #[test]
    fn drag_box_by_total_delta() {
        let mut ed = seeded();
        ed.set_tool(Tool::Select);
        ed.pointer_down(pos2(20.0, 20.0));
        ed.pointer_move(pos2(22.0, 21.0));
        ed.pointer_move(pos2(25.0, 25.0));
        ed.pointer_up();
        let list = ed.annotations();
        assert_eq!(list[0].geometry, Geometry::Box { min: pos2(15.0, 15.0), max: pos2(55.0, 55.0) });
    }

    #[test]
    fn click_inside_polygon_moves_it() {
        let mut ed = seeded();
        ed.set_tool(Tool::Select);
        ed.pointer_down(pos2(120.0, 115.0));
        let id = ed.annotations()[1].id;
        assert_eq!(ed.store().selected(), Some(id));
        ed.pointer_move(pos2(130.0, 115.0));
        ed.pointer_up();
        assert_eq!(
            ed.store().get(id).unwrap().geometry,
            Geometry::Polygon { vertices: vec![pos2(110.0, 100.0), pos2(150.0, 100.0), pos2(130.0, 140.0)] }
        );
    }

    #[test]
    fn vertex_drag_moves_single_vertex() {
        let mut ed = seeded();
        ed.set_tool(Tool::Select);
        ed.pointer_down(pos2(141.0, 102.0));
        assert!(matches!(ed.interaction(), Interaction::MovingVertex { index: 1, .. }));
        ed.pointer_move(pos2(160.0, 90.0));
        ed.pointer_up();
        let id = ed.annotations()[1].id;
        assert_eq!(
            ed.store().get(id).unwrap().geometry,
            Geometry::Polygon { vertices: vec![pos2(100.0, 100.0), pos2(160.0, 90.0), pos2(120.0, 140.0)] }
        );
    }

    #[test]
    fn vertex_radius_is_in_image_units() {
        let mut ed = seeded();
        ed.viewport.set(4.0, vec2(0.0, 0.0));
        ed.set_tool(Tool::Select);
        // (140, 100) in image space sits at (560, 400) on screen; 16 px away is 4 units
        ed.pointer_down(pos2(576.0, 400.0));
        assert!(matches!(ed.interaction(), Interaction::MovingVertex { .. }));
        ed.pointer_up();
        // 24 px away is 6 units, outside the radius and outside the triangle
        ed.pointer_down(pos2(584.0, 400.0));
        assert_eq!(*ed.interaction(), Interaction::Idle);
    }

    #[test]
    fn click_on_empty_space_clears_selection() {
        let mut ed = seeded();
        ed.set_tool(Tool::Select);
        ed.pointer_down(pos2(20.0, 20.0));
        ed.pointer_up();
        ed.pointer_down(pos2(300.0, 300.0));
        assert_eq!(ed.store().selected(), None);
    }

    #[test]
    fn hover_follows_pointer_in_select_tool() {
        let mut ed = seeded();
        ed.set_tool(Tool::Select);
        ed.pointer_move(pos2(30.0, 30.0));
        let box_id = ed.annotations()[0].id;
        assert_eq!(ed.store().hovered(), Some(box_id));
        ed.pointer_move(pos2(300.0, 300.0));
        assert_eq!(ed.store().hovered(), None);
        ed.pointer_move(pos2(30.0, 30.0));
        ed.pointer_leave();
        assert_eq!(ed.store().hovered(), None);
    }

    #[test]
    fn tool_switch_keeps_selection_only_for_select() {
        let mut ed = seeded();
        ed.set_tool(Tool::Select);
        ed.pointer_down(pos2(20.0, 20.0));
        ed.pointer_up();
        let id = ed.store().selected();
        ed.set_tool(Tool::Select);
        assert_eq!(ed.store().selected(), id);
        ed.set_tool(Tool::DrawBox);
        assert_eq!(ed.store().selected(), None);
    }

    #[test]
    fn tool_switch_cancels_polygon_in_progress() {
        let mut ed = editor();
        ed.set_tool(Tool::DrawPolygon);
        ed.pointer_down(pos2(0.0, 0.0));
        ed.pointer_up();
        ed.set_tool(Tool::DrawPolygon);
        assert_eq!(*ed.interaction(), Interaction::Idle);
    }

    #[test]
    fn delete_requires_select_tool_and_no_move() {
        let mut ed = seeded();
        ed.set_tool(Tool::Select);
        ed.pointer_down(pos2(20.0, 20.0));
        assert!(ed.delete_selected().is_none());
        ed.pointer_up();

        let removed = ed.delete_selected().unwrap();
        assert_eq!(removed.class_name, "fracture");
        assert_eq!(ed.store().selected(), None);
        assert_eq!(ed.store().hovered(), None);
        assert!(ed.store().get(removed.id).is_none());
    }

    #[test]
    fn cancel_reverts_move() {
        let mut ed = seeded();
        ed.set_tool(Tool::Select);
        ed.pointer_down(pos2(20.0, 20.0));
        ed.pointer_move(pos2(80.0, 80.0));
        ed.cancel();
        assert_eq!(
            ed.annotations()[0].geometry,
            Geometry::Box { min: pos2(10.0, 10.0), max: pos2(50.0, 50.0) }
        );
        assert_eq!(*ed.interaction(), Interaction::Idle);
    }

    #[test]
    fn topmost_box_wins() {
        let record = HistoryRecord {
            file_id: "f".into(),
            boxes: vec![json!([0, 0, 100, 100]), json!([10, 10, 40, 40])],
            classes: vec![json!("under"), json!("over")],
            ..Default::default()
        };
        let mut ed = Editor::from_record(&record, &EditorConfig::default(), Box::new(AllowAll));
        ed.set_tool(Tool::Select);
        ed.pointer_down(pos2(20.0, 20.0));
        let selected = ed.store().selected().unwrap();
        assert_eq!(ed.store().get(selected).unwrap().class_name, "over");
    }
}
