use std::fmt;

use egui::{Pos2, Vec2};

use crate::geometry;

/// Session-scoped annotation identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(u64);

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source, one per editing session.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> AnnotationId {
        let id = AnnotationId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnnotationKind {
    Box,
    Polygon,
}

/// Shape of an annotation in image-space coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Box { min: Pos2, max: Pos2 },
    Polygon { vertices: Vec<Pos2> },
}

impl Geometry {
    /// A box with its corners put in `min <= max` order.
    pub fn normalized_box(a: Pos2, b: Pos2) -> Self {
        let (min, max) = geometry::normalize_corners(a, b);
        Geometry::Box { min, max }
    }

    pub fn kind(&self) -> AnnotationKind {
        match self {
            Geometry::Box { .. } => AnnotationKind::Box,
            Geometry::Polygon { .. } => AnnotationKind::Polygon,
        }
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        match self {
            Geometry::Box { min, max } => Geometry::Box {
                min: *min + delta,
                max: *max + delta,
            },
            Geometry::Polygon { vertices } => Geometry::Polygon {
                vertices: geometry::translate_all(vertices, delta),
            },
        }
    }

    pub fn contains(&self, p: Pos2) -> bool {
        match self {
            Geometry::Box { min, max } => geometry::rect_contains(*min, *max, p),
            Geometry::Polygon { vertices } => geometry::polygon_contains(vertices, p),
        }
    }

    /// Where the class label is drawn: top-left corner or first vertex.
    pub fn label_anchor(&self) -> Option<Pos2> {
        match self {
            Geometry::Box { min, .. } => Some(*min),
            Geometry::Polygon { vertices } => vertices.first().copied(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub geometry: Geometry,
    pub class_name: String,
}

impl Annotation {
    pub fn new(id: AnnotationId, geometry: Geometry, class_name: impl Into<String>) -> Self {
        Self {
            id,
            geometry,
            class_name: class_name.into(),
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        self.geometry.kind()
    }
}
