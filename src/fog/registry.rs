use bevy::prelude::*;

use crate::math;

/// One lattice triangle, as emitted by the lattice builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    /// Global sequential index, equal to its position in the registry.
    pub index: usize,
    /// World-space corners.
    pub vertices: [Vec2; 3],
    /// Indices into the global (unwelded) vertex buffer, winding applied.
    pub vertex_indices: [u32; 3],
    /// `true` for downward-pointing triangles.
    pub inverted: bool,
}

/// Every lattice triangle keyed by its global index.
///
/// Filled once by the lattice builder and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TriangleRegistry {
    triangles: Vec<Triangle>,
}

impl TriangleRegistry {
    /// Appends a triangle and returns its global index.
    pub(super) fn push(&mut self, vertices: [Vec2; 3], inverted: bool) -> usize {
        let index = self.triangles.len();
        self.triangles.push(Triangle {
            index,
            vertices,
            vertex_indices: math::triangle_indices(index as u32, inverted),
            inverted,
        });
        index
    }

    /// Triangle with the given global index.
    pub fn get(&self, index: usize) -> Option<&Triangle> {
        self.triangles.get(index)
    }

    /// Triangles in increasing global index order.
    pub fn iter(&self) -> impl Iterator<Item = &Triangle> {
        self.triangles.iter()
    }

    /// Number of registered triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// True before the lattice is laid out.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}
