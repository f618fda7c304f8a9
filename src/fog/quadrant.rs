use bevy::prelude::*;

use super::QuadrantSettings;
use super::registry::{Triangle, TriangleRegistry};
use super::vertex_index::VertexColorIndex;
use crate::math;

/// Grid coordinate of a quadrant; row 0 is the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct QuadrantId {
    /// Column, counted from the left.
    pub column: u32,
    /// Row, counted from the bottom.
    pub row: u32,
}

impl QuadrantId {
    /// Quadrant at `column`, `row`.
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

/// Uniform square tiling that starts at the world origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadrantGrid {
    columns: u32,
    rows: u32,
    size: f32,
}

impl QuadrantGrid {
    /// Grid described by `s`.
    pub fn new(s: &QuadrantSettings) -> Self {
        Self {
            columns: s.columns,
            rows: s.rows,
            size: s.size,
        }
    }

    /// Side length of every quadrant.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Number of quadrants.
    pub fn len(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// True for a grid without quadrants.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of `id` in scan order (row-major, top row first).
    ///
    /// Texture arrays and the quadrant mesh list are indexed by this.
    pub fn scan_index(&self, id: QuadrantId) -> Option<usize> {
        (id.column < self.columns && id.row < self.rows).then(|| {
            (self.rows - 1 - id.row) as usize * self.columns as usize + id.column as usize
        })
    }

    /// Every quadrant, top row first, left to right.
    pub fn scan_order(&self) -> impl Iterator<Item = QuadrantId> + '_ {
        (0..self.rows)
            .rev()
            .flat_map(move |row| (0..self.columns).map(move |column| QuadrantId::new(column, row)))
    }

    /// World-space center of `id`.
    pub fn center(&self, id: QuadrantId) -> Vec2 {
        Vec2::new(
            self.size / 2.0 + id.column as f32 * self.size,
            self.size / 2.0 + id.row as f32 * self.size,
        )
    }

    /// Bottom-left corner; the origin of the quadrant's local space.
    pub fn origin(&self, id: QuadrantId) -> Vec2 {
        self.center(id) - Vec2::splat(self.size / 2.0)
    }

    /// World-space square covered by `id`.
    pub fn bounds(&self, id: QuadrantId) -> Rect {
        Rect::from_center_size(self.center(id), Vec2::splat(self.size))
    }

    /// Whether any corner of `t` lies in the quadrant, edges included.
    pub fn touches(&self, id: QuadrantId, t: &Triangle) -> bool {
        let center = self.center(id);
        t.vertices
            .iter()
            .any(|v| math::point_in_quad(*v, center, self.size))
    }
}

/// Render buffers of one quadrant, in quadrant-local coordinates.
///
/// Straddling triangles are copied whole, so positions may fall outside
/// `[0, size]`.
#[derive(Debug, Clone)]
pub struct QuadrantMesh {
    /// Quadrant these buffers belong to.
    pub id: QuadrantId,
    /// World position of the local origin (bottom-left corner).
    pub origin: Vec2,
    /// Three corners per triangle, relative to [`Self::origin`].
    pub vertices: Vec<Vec2>,
    /// Triangle list into [`Self::vertices`].
    pub indices: Vec<u32>,
    /// Position within the quadrant square, `0..1` inside it.
    pub uvs: Vec<Vec2>,
    /// One color per vertex.
    pub colors: Vec<LinearRgba>,
    /// Global index of each local triangle.
    pub triangles: Vec<usize>,
}

impl QuadrantMesh {
    fn new(id: QuadrantId, origin: Vec2) -> Self {
        Self {
            id,
            origin,
            vertices: Vec::new(),
            indices: Vec::new(),
            uvs: Vec::new(),
            colors: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Appends a copy of `t`; returns the local index of its first vertex.
    fn push_triangle(&mut self, t: &Triangle, size: f32, color: LinearRgba) -> u32 {
        let local_triangle = self.triangles.len() as u32;
        let first = self.vertices.len() as u32;
        let max = self.origin + Vec2::splat(size);
        for v in t.vertices {
            self.vertices.push(v - self.origin);
            self.uvs.push(Vec2::new(
                math::inverse_lerp(self.origin.x, max.x, v.x),
                math::inverse_lerp(self.origin.y, max.y, v.y),
            ));
            self.colors.push(color);
        }
        self.indices
            .extend(math::triangle_indices(local_triangle, t.inverted));
        self.triangles.push(t.index);
        first
    }

    /// Number of triangle copies held.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Colors as the `[f32; 4]` array a vertex attribute expects.
    pub fn color_array(&self) -> Vec<[f32; 4]> {
        self.colors
            .iter()
            .map(|c| [c.red, c.green, c.blue, c.alpha])
            .collect()
    }
}

/// Splits the lattice into one mesh per quadrant, in scan order.
///
/// A triangle goes to every quadrant that holds at least one of its corners;
/// each copy is recorded in `index` under its corners' rounded positions and
/// its global triangle index.
pub fn partition(
    registry: &TriangleRegistry,
    grid: &QuadrantGrid,
    default_color: LinearRgba,
    index: &mut VertexColorIndex,
) -> Vec<QuadrantMesh> {
    grid.scan_order()
        .map(|id| {
            let mut mesh = QuadrantMesh::new(id, grid.origin(id));
            for t in registry.iter().filter(|t| grid.touches(id, t)) {
                let first = mesh.push_triangle(t, grid.size(), default_color);
                for (k, corner) in t.vertices.iter().enumerate() {
                    index.record(*corner, t.index, id, first + k as u32);
                }
            }
            debug!(
                "quadrant ({}, {}): {} triangles",
                id.column,
                id.row,
                mesh.triangle_count()
            );
            mesh
        })
        .collect()
}
