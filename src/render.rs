//! Canvas rendering.
//!
//! [`build_scene`] turns editor state into a flat list of draw commands in
//! canvas coordinates and has no side effects; [`paint`] replays that list on
//! an egui painter.

use egui::{pos2, Color32, Pos2, Rect, Stroke, Vec2};

use crate::annotation::Geometry;
use crate::tool::{Editor, Interaction};
use crate::viewport::Viewport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeState {
    Default,
    Hovered,
    Selected,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeStyle {
    pub stroke: Stroke,
    pub fill: Color32,
}

#[derive(Clone, Debug)]
pub struct Style {
    pub default: ShapeStyle,
    pub hovered: ShapeStyle,
    pub selected: ShapeStyle,
    pub drawing: Stroke,
    pub dash: (f32, f32),
    pub handle_radius: f32,
    pub label_size: f32,
    pub label_offset: f32,
}

impl Style {
    pub fn for_state(&self, state: ShapeState) -> ShapeStyle {
        match state {
            ShapeState::Default => self.default,
            ShapeState::Hovered => self.hovered,
            ShapeState::Selected => self.selected,
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            default: ShapeStyle {
                stroke: Stroke::new(2.0, Color32::RED),
                fill: Color32::from_rgba_unmultiplied(255, 0, 0, 25),
            },
            hovered: ShapeStyle {
                stroke: Stroke::new(2.5, Color32::from_rgb(255, 165, 0)),
                fill: Color32::from_rgba_unmultiplied(255, 165, 0, 38),
            },
            selected: ShapeStyle {
                stroke: Stroke::new(3.0, Color32::BLUE),
                fill: Color32::from_rgba_unmultiplied(0, 0, 255, 51),
            },
            drawing: Stroke::new(2.0, Color32::GREEN),
            dash: (4.0, 4.0),
            handle_radius: 3.0,
            label_size: 12.0,
            label_offset: 5.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Image { rect: Rect },
    Rect { rect: Rect, fill: Color32, stroke: Stroke },
    ClosedPath { points: Vec<Pos2>, stroke: Stroke },
    DashedPath { points: Vec<Pos2>, stroke: Stroke },
    Handle { center: Pos2, radius: f32, fill: Color32 },
    Label { pos: Pos2, text: String, size: f32, color: Color32 },
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// Canvas size, equal to the image's natural size.
    pub size: Vec2,
    pub commands: Vec<DrawCommand>,
}

pub fn build_scene(editor: &Editor, image_size: Vec2, style: &Style) -> Scene {
    let viewport = editor.viewport();
    let store = editor.store();
    let moving = matches!(editor.interaction(), Interaction::MovingAnnotation { .. });
    let mut commands = vec![DrawCommand::Image {
        rect: Rect::from_min_max(
            viewport.image_to_screen(Pos2::ZERO),
            viewport.image_to_screen(image_size.to_pos2()),
        ),
    }];

    for ann in store.iter() {
        let state = if store.selected() == Some(ann.id) {
            ShapeState::Selected
        } else if store.hovered() == Some(ann.id) && !moving {
            ShapeState::Hovered
        } else {
            ShapeState::Default
        };
        let shape_style = style.for_state(state);

        match &ann.geometry {
            Geometry::Box { min, max } => {
                commands.push(DrawCommand::Rect {
                    rect: Rect::from_min_max(
                        viewport.image_to_screen(*min),
                        viewport.image_to_screen(*max),
                    ),
                    fill: shape_style.fill,
                    stroke: shape_style.stroke,
                });
            }
            Geometry::Polygon { vertices } => {
                let points = to_screen(viewport, vertices);
                commands.push(DrawCommand::ClosedPath {
                    points: points.clone(),
                    stroke: shape_style.stroke,
                });
                commands.extend(points.into_iter().map(|center| DrawCommand::Handle {
                    center,
                    radius: style.handle_radius,
                    fill: shape_style.stroke.color,
                }));
            }
        }

        if let Some(anchor) = ann.geometry.label_anchor() {
            commands.push(DrawCommand::Label {
                pos: viewport.image_to_screen(anchor) - Vec2::new(0.0, style.label_offset),
                text: ann.class_name.clone(),
                size: style.label_size,
                color: shape_style.stroke.color,
            });
        }
    }

    match editor.interaction() {
        Interaction::DrawingBox { start, current } => {
            let rect = Rect::from_two_pos(
                viewport.image_to_screen(*start),
                viewport.image_to_screen(*current),
            );
            commands.push(DrawCommand::DashedPath {
                points: vec![
                    rect.left_top(),
                    rect.right_top(),
                    rect.right_bottom(),
                    rect.left_bottom(),
                    rect.left_top(),
                ],
                stroke: style.drawing,
            });
        }
        Interaction::DrawingPolygon { vertices } => {
            let points = to_screen(viewport, vertices);
            if points.len() > 1 {
                commands.push(DrawCommand::DashedPath {
                    points: points.clone(),
                    stroke: style.drawing,
                });
            }
            commands.extend(points.into_iter().map(|center| DrawCommand::Handle {
                center,
                radius: style.handle_radius,
                fill: style.drawing.color,
            }));
        }
        _ => {}
    }

    Scene {
        size: image_size,
        commands,
    }
}

fn to_screen(viewport: &Viewport, points: &[Pos2]) -> Vec<Pos2> {
    points.iter().map(|p| viewport.image_to_screen(*p)).collect()
}

/// Replay `scene` on `painter`, with canvas coordinates offset by `origin`.
pub fn paint(
    painter: &egui::Painter,
    origin: Pos2,
    texture: Option<&egui::TextureHandle>,
    scene: &Scene,
    style: &Style,
) {
    let shift = origin.to_vec2();
    painter.rect_filled(
        Rect::from_min_size(origin, scene.size),
        0.0,
        Color32::from_gray(40),
    );

    for command in &scene.commands {
        match command {
            DrawCommand::Image { rect } => {
                if let Some(tex) = texture {
                    painter.image(
                        tex.id(),
                        rect.translate(shift),
                        Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
            }
            DrawCommand::Rect { rect, fill, stroke } => {
                let rect = rect.translate(shift);
                painter.rect_filled(rect, 0.0, *fill);
                painter.rect_stroke(rect, 0.0, *stroke, egui::StrokeKind::Middle);
            }
            DrawCommand::ClosedPath { points, stroke } => {
                let points = points.iter().map(|p| *p + shift).collect();
                painter.add(egui::Shape::closed_line(points, *stroke));
            }
            DrawCommand::DashedPath { points, stroke } => {
                let points: Vec<Pos2> = points.iter().map(|p| *p + shift).collect();
                let (dash, gap) = style.dash;
                painter.extend(egui::Shape::dashed_line(&points, *stroke, dash, gap));
            }
            DrawCommand::Handle {
                center,
                radius,
                fill,
            } => {
                painter.circle_filled(*center + shift, *radius, *fill);
            }
            DrawCommand::Label {
                pos,
                text,
                size,
                color,
            } => {
                painter.text(
                    *pos + shift,
                    egui::Align2::LEFT_BOTTOM,
                    text,
                    egui::FontId::proportional(*size),
                    *color,
                );
            }
        }
    }
}
