use bevy::prelude::*;

use super::quadrant::QuadrantId;
use super::surface::FogSurface;

/// Central component holding the built fog surface.
///
/// Spawned as a single entity that parents every [`FogQuadrant`] and the
/// [`LatticeOverlay`].
#[derive(Component)]
pub struct FogLattice {
    /// Lattice, quadrant meshes and vertex index.
    pub surface: FogSurface,
}

/// One renderable tile of the surface.
#[derive(Component, Reflect)]
pub struct FogQuadrant {
    /// Grid cell this mesh covers.
    pub id: QuadrantId,
}

/// Marker for the un-partitioned lattice mesh, only shown while debugging.
#[derive(Component, Reflect)]
pub struct LatticeOverlay;

/// Vertex selector for [`RecolorVertex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecolorTarget {
    /// World position, rounded to hundredths.
    Position(Vec2),
    /// Stable vertex handle (first-seen order).
    Handle(usize),
    /// All corners of a lattice triangle.
    Triangle(usize),
}

/// Request to recolor every copy of a lattice vertex.
#[derive(Message, Debug, Clone)]
pub struct RecolorVertex {
    /// Vertex or triangle to paint.
    pub target: RecolorTarget,
    /// New color of every copy.
    pub color: Color,
}

/// Vertex currently highlighted by the keyboard controls.
#[derive(Resource, Default)]
pub struct HighlightCursor {
    /// Highlighted vertex handle.
    pub handle: Option<usize>,
    /// Color the highlighted vertex had before the highlight.
    pub saved: Option<LinearRgba>,
}

impl HighlightCursor {
    /// Moves by `step` handles, wrapping inside `0..len`.
    ///
    /// The first step from no selection lands on handle 0 going forward and on
    /// the last handle going back.
    pub fn step(&mut self, step: i64, len: usize) -> Option<usize> {
        if len == 0 {
            self.handle = None;
            return None;
        }
        let next = match self.handle {
            None if step >= 0 => 0,
            None => len - 1,
            Some(h) => (h as i64 + step).rem_euclid(len as i64) as usize,
        };
        self.handle = Some(next);
        self.handle
    }

    /// Color to put back on the highlighted vertex when leaving it.
    ///
    /// `None` when the vertex no longer shows `highlight`: it was repainted
    /// meanwhile and keeps its new color.
    pub fn restore(&self, current: Option<LinearRgba>, highlight: LinearRgba) -> Option<LinearRgba> {
        match (self.saved, current) {
            (Some(saved), Some(current)) if current == highlight => Some(saved),
            _ => None,
        }
    }
}
