//! Pure computation helpers extracted for testability.
//!
//! All functions in this module are free of Bevy ECS dependencies and operate
//! on plain numeric / `Vec2` inputs, making them straightforward to unit-test.

use bevy::prelude::Vec2;

/// Derived measurements of the equilateral triangle used by the lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleMetrics {
    /// Circumradius: distance from the triangle center to each corner.
    pub radius: f32,
    /// `radius / 2`, the distance from the center to each edge.
    pub half_radius: f32,
    /// Half of the edge length, `sqrt(radius² − (radius/2)²)`.
    pub height: f32,
}

impl TriangleMetrics {
    /// Computes the metrics for a circumradius.
    pub fn new(radius: f32) -> Self {
        let half_radius = radius / 2.0;
        Self {
            radius,
            half_radius,
            height: (radius * radius - half_radius * half_radius).sqrt(),
        }
    }

    /// Horizontal distance between two neighbouring triangles of one row.
    pub fn column_step(&self) -> f32 {
        self.height * 2.0
    }
}

/// Corner offsets of an equilateral triangle centered at the origin.
///
/// Upright triangles put the apex at `(0, radius)`; inverted ones mirror that
/// through the origin. An upright and an inverted triangle offset by
/// `(height, radius / 2)` share an edge, which is what lets rows of them
/// interlock into hexagons.
///
/// # Examples
/// ```
/// # use hex_fog::math::triangle_vertices;
/// let [apex, _, _] = triangle_vertices(2.0, false);
/// assert_eq!(apex.y, 2.0);
/// ```
pub fn triangle_vertices(radius: f32, inverted: bool) -> [Vec2; 3] {
    let m = TriangleMetrics::new(radius);
    if inverted {
        [
            Vec2::new(0.0, -m.radius),
            Vec2::new(m.height, m.half_radius),
            Vec2::new(-m.height, m.half_radius),
        ]
    } else {
        [
            Vec2::new(0.0, m.radius),
            Vec2::new(m.height, -m.half_radius),
            Vec2::new(-m.height, -m.half_radius),
        ]
    }
}

/// Translates every corner by `offset`.
pub fn offset_triangle(vertices: [Vec2; 3], offset: Vec2) -> [Vec2; 3] {
    vertices.map(|v| v + offset)
}

/// Index triple for the `base`-th triangle of an unwelded buffer.
///
/// Winding is reversed for inverted triangles so every face keeps the same
/// front side after the flip.
pub fn triangle_indices(base: u32, inverted: bool) -> [u32; 3] {
    let first = base * 3;
    if inverted {
        [first + 2, first + 1, first]
    } else {
        [first, first + 1, first + 2]
    }
}

/// Whether `point` lies inside (or on the edge of) the axis-aligned square
/// of side `size` centered at `center`.
///
/// Four half-plane checks against the corners walked clockwise from the
/// top-left one.
pub fn point_in_quad(point: Vec2, center: Vec2, size: f32) -> bool {
    let half = size / 2.0;
    let a = Vec2::new(center.x - half, center.y + half);
    let b = Vec2::new(center.x + half, center.y + half);
    let c = Vec2::new(center.x + half, center.y - half);
    let d = Vec2::new(center.x - half, center.y - half);

    side(a, b, point) <= 0.0
        && side(b, c, point) <= 0.0
        && side(c, d, point) <= 0.0
        && side(d, a, point) <= 0.0
}

/// Signed area of `(a, b, p)`: negative when `p` is right of `a → b`.
fn side(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Where `v` falls between `a` and `b`, as a fraction (`a → 0`, `b → 1`).
///
/// Not clamped: values outside `[a, b]` map outside `[0, 1]`.
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    (v - a) / (b - a)
}

/// Rounds a coordinate to hundredths, returned as an integer count.
pub fn round_hundredths(v: f32) -> i32 {
    (v * 100.0).round() as i32
}

/// Camera distance at which an `extent`-sized rectangle fills a view with
/// vertical field of view `fov_y` and the given aspect ratio.
pub fn framing_distance(extent: Vec2, fov_y: f32, aspect: f32) -> f32 {
    let half_height = (extent.y / 2.0).max(extent.x / 2.0 / aspect.max(f32::EPSILON));
    half_height / (fov_y / 2.0).tan()
}
