//! Small geometry helpers over `egui` points, all in image space.

use egui::{Pos2, Vec2};

/// Reorder two opposite corners into `(min, max)`.
pub fn normalize_corners(a: Pos2, b: Pos2) -> (Pos2, Pos2) {
    (
        Pos2::new(a.x.min(b.x), a.y.min(b.y)),
        Pos2::new(a.x.max(b.x), a.y.max(b.y)),
    )
}

/// Inclusive point-in-rectangle test.
pub fn rect_contains(min: Pos2, max: Pos2, p: Pos2) -> bool {
    p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
}

/// Even-odd ray casting; the polygon is treated as closed.
pub fn polygon_contains(vertices: &[Pos2], p: Pos2) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];
        if (vi.y > p.y) != (vj.y > p.y) && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

pub fn translate_all(points: &[Pos2], delta: Vec2) -> Vec<Pos2> {
    points.iter().map(|p| *p + delta).collect()
}

pub fn is_finite(p: Pos2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn corners_are_normalized() {
        let (min, max) = normalize_corners(pos2(50.0, 10.0), pos2(10.0, 40.0));
        assert_eq!(min, pos2(10.0, 10.0));
        assert_eq!(max, pos2(50.0, 40.0));
    }

    #[test]
    fn rect_edges_are_inside() {
        let (min, max) = (pos2(0.0, 0.0), pos2(10.0, 10.0));
        assert!(rect_contains(min, max, pos2(10.0, 0.0)));
        assert!(!rect_contains(min, max, pos2(10.1, 5.0)));
    }

    #[test]
    fn point_in_triangle() {
        let tri = [pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(5.0, 10.0)];
        assert!(polygon_contains(&tri, pos2(5.0, 3.0)));
        assert!(!polygon_contains(&tri, pos2(0.5, 9.0)));
    }

    #[test]
    fn concave_notch_is_outside() {
        // U shape opening upwards
        let u = [
            pos2(0.0, 0.0),
            pos2(3.0, 0.0),
            pos2(3.0, 7.0),
            pos2(7.0, 7.0),
            pos2(7.0, 0.0),
            pos2(10.0, 0.0),
            pos2(10.0, 10.0),
            pos2(0.0, 10.0),
        ];
        assert!(!polygon_contains(&u, pos2(5.0, 3.0)));
        assert!(polygon_contains(&u, pos2(5.0, 9.0)));
        assert!(polygon_contains(&u, pos2(1.0, 1.0)));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        assert!(!polygon_contains(&[pos2(0.0, 0.0), pos2(1.0, 1.0)], pos2(0.5, 0.5)));
    }
}
