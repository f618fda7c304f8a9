use std::fmt;

use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use hexx::{HexLayout, HexOrientation};

use super::quadrant::{QuadrantGrid, QuadrantId, QuadrantMesh};
use crate::error::FogError;
use crate::math;

/// World position rounded to hundredths: the identity of a lattice vertex
/// across independently generated quadrant meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct PositionKey {
    /// `round(x · 100)`
    pub x: i32,
    /// `round(y · 100)`
    pub y: i32,
}

impl PositionKey {
    /// Rounds `p` to hundredths.
    pub fn from_world(p: Vec2) -> Self {
        Self {
            x: math::round_hundredths(p.x),
            y: math::round_hundredths(p.y),
        }
    }

    /// The rounded position.
    pub fn to_world(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32) / 100.0
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.to_world();
        write!(f, "({:.2}, {:.2})", p.x, p.y)
    }
}

/// Local vertex indices grouped by the quadrant mesh that holds them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexRefs {
    entries: Vec<(QuadrantId, Vec<u32>)>,
}

impl VertexRefs {
    fn insert(&mut self, quadrant: QuadrantId, local: u32) {
        match self.entries.iter_mut().find(|(id, _)| *id == quadrant) {
            Some((_, locals)) => locals.push(local),
            None => self.entries.push((quadrant, vec![local])),
        }
    }

    /// `(quadrant, local indices)` pairs in the order quadrants were built.
    pub fn iter(&self) -> impl Iterator<Item = (QuadrantId, &[u32])> {
        self.entries.iter().map(|(id, locals)| (*id, locals.as_slice()))
    }

    /// Quadrants holding at least one copy.
    pub fn quadrants(&self) -> impl Iterator<Item = QuadrantId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// Number of quadrants holding at least one copy.
    pub fn quadrant_count(&self) -> usize {
        self.entries.len()
    }

    /// Local indices inside one quadrant, if it references this vertex.
    pub fn locals(&self, quadrant: QuadrantId) -> Option<&[u32]> {
        self.entries
            .iter()
            .find(|(id, _)| *id == quadrant)
            .map(|(_, locals)| locals.as_slice())
    }

    /// Writes `color` to every referenced slot; returns the touched quadrants.
    fn paint(
        &self,
        grid: &QuadrantGrid,
        meshes: &mut [QuadrantMesh],
        color: LinearRgba,
    ) -> Vec<QuadrantId> {
        let mut touched = Vec::with_capacity(self.entries.len());
        for (id, locals) in &self.entries {
            let Some(mesh) = grid.scan_index(*id).and_then(|i| meshes.get_mut(i)) else {
                continue;
            };
            for &local in locals {
                if let Some(slot) = mesh.colors.get_mut(local as usize) {
                    *slot = color;
                }
            }
            touched.push(*id);
        }
        touched
    }
}

/// Cross-references from lattice vertices and triangles to their copies in
/// the quadrant meshes.
///
/// Filled by [`partition`](super::quadrant::partition), read-only afterwards.
/// Positions are enumerated in first-seen order; the position of a key in
/// that enumeration is its stable vertex handle.
///
/// Positions are snapped to the exact lattice vertex before rounding, so
/// corners computed along different float paths share one key.
#[derive(Debug)]
pub struct VertexColorIndex {
    /// Pointy hex layout whose hex centers are the lattice vertices.
    snap: HexLayout,
    handles: HashMap<PositionKey, usize>,
    positions: Vec<(PositionKey, VertexRefs)>,
    triangles: HashMap<usize, VertexRefs>,
}

/// Farthest a query may sit from a lattice vertex and still address it.
const SNAP_TOLERANCE: f32 = 0.01;

impl VertexColorIndex {
    /// Empty index for a lattice of triangles with circumradius `radius`.
    pub fn new(radius: f32) -> Self {
        Self {
            snap: HexLayout {
                orientation: HexOrientation::Pointy,
                origin: Vec2::new(0.0, radius),
                scale: Vec2::splat(radius),
                ..default()
            },
            handles: HashMap::default(),
            positions: Vec::new(),
            triangles: HashMap::default(),
        }
    }

    /// Closest lattice vertex to `world`, indexed or not.
    pub fn nearest_vertex(&self, world: Vec2) -> Vec2 {
        self.snap.hex_to_world_pos(self.snap.world_pos_to_hex(world))
    }

    /// Key of the lattice vertex at `world`, or `None` when `world` is not
    /// within rounding distance of one.
    pub fn key_of(&self, world: Vec2) -> Option<PositionKey> {
        let vertex = self.nearest_vertex(world);
        (vertex.distance(world) <= SNAP_TOLERANCE).then(|| PositionKey::from_world(vertex))
    }

    /// Notes that corner `world` of global triangle `triangle` was copied to
    /// local vertex `local` of `quadrant`.
    pub(super) fn record(&mut self, world: Vec2, triangle: usize, quadrant: QuadrantId, local: u32) {
        let key = PositionKey::from_world(self.nearest_vertex(world));
        let handle = match self.handles.get(&key) {
            Some(&handle) => handle,
            None => {
                let handle = self.positions.len();
                self.positions.push((key, VertexRefs::default()));
                self.handles.insert(key, handle);
                handle
            }
        };
        self.positions[handle].1.insert(quadrant, local);
        self.triangles
            .entry(triangle)
            .or_default()
            .insert(quadrant, local);
    }

    /// Number of distinct indexed positions (and so of vertex handles).
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True until the first vertex is recorded.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Copies of the vertex with this key.
    pub fn position_refs(&self, key: PositionKey) -> Option<&VertexRefs> {
        self.handle_of(key).map(|h| &self.positions[h].1)
    }

    /// Copies of the vertex at `world`.
    pub fn refs_at(&self, world: Vec2) -> Option<&VertexRefs> {
        self.key_of(world).and_then(|key| self.position_refs(key))
    }

    /// Corner copies of one lattice triangle.
    pub fn triangle_refs(&self, triangle: usize) -> Option<&VertexRefs> {
        self.triangles.get(&triangle)
    }

    /// Stable handle of an indexed key.
    pub fn handle_of(&self, key: PositionKey) -> Option<usize> {
        self.handles.get(&key).copied()
    }

    /// Key behind a handle.
    pub fn position_of(&self, handle: usize) -> Option<PositionKey> {
        self.positions.get(handle).map(|(key, _)| *key)
    }

    /// Every indexed position in handle order.
    pub fn positions(&self) -> impl Iterator<Item = (PositionKey, &VertexRefs)> {
        self.positions.iter().map(|(key, refs)| (*key, refs))
    }

    /// Colors every copy of the vertex at `world` in every quadrant mesh.
    pub fn recolor(
        &self,
        world: Vec2,
        color: LinearRgba,
        grid: &QuadrantGrid,
        meshes: &mut [QuadrantMesh],
    ) -> Result<Vec<QuadrantId>, FogError> {
        let key = self
            .key_of(world)
            .unwrap_or_else(|| PositionKey::from_world(world));
        let refs = self
            .position_refs(key)
            .ok_or(FogError::UnknownPosition(key))?;
        Ok(refs.paint(grid, meshes, color))
    }

    /// [`Self::recolor`] addressed by vertex handle.
    pub fn recolor_handle(
        &self,
        handle: usize,
        color: LinearRgba,
        grid: &QuadrantGrid,
        meshes: &mut [QuadrantMesh],
    ) -> Result<Vec<QuadrantId>, FogError> {
        let (_, refs) = self
            .positions
            .get(handle)
            .ok_or(FogError::UnknownHandle(handle))?;
        Ok(refs.paint(grid, meshes, color))
    }

    /// Colors all three corners of every copy of one lattice triangle.
    pub fn recolor_triangle(
        &self,
        triangle: usize,
        color: LinearRgba,
        grid: &QuadrantGrid,
        meshes: &mut [QuadrantMesh],
    ) -> Result<Vec<QuadrantId>, FogError> {
        let refs = self
            .triangle_refs(triangle)
            .ok_or(FogError::UnknownTriangle(triangle))?;
        Ok(refs.paint(grid, meshes, color))
    }
}
