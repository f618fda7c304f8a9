use std::ops::Range;

use bevy::prelude::*;

use super::LatticeSettings;
use super::registry::TriangleRegistry;
use crate::math::{self, TriangleMetrics};

/// Layout rules for one row of the lattice, derived from the row-cycle state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowPhase {
    /// Added to the running vertical offset before the row is laid out.
    pub dy: f32,
    /// Horizontal start of the row (`0` or the triangle height).
    pub x_reset: f32,
    /// Whether the row holds one triangle more than the column count.
    pub extra_triangle: bool,
    /// Orientation shared by every triangle in the row.
    pub inverted: bool,
}

impl RowPhase {
    /// The row rules for a cycle state in `0..=4`.
    ///
    /// State 0 only exists before the first row: it lays out phase 1 without
    /// moving the offset. Only [`RowCycle`] produces states.
    fn of(state: u8, m: &TriangleMetrics) -> Self {
        match state {
            0 => Self {
                dy: 0.0,
                ..Self::of(1, m)
            },
            1 => Self {
                dy: m.radius,
                x_reset: 0.0,
                extra_triangle: true,
                inverted: false,
            },
            2 => Self {
                dy: m.half_radius,
                x_reset: m.height,
                extra_triangle: false,
                inverted: true,
            },
            3 => Self {
                dy: m.radius,
                x_reset: m.height,
                extra_triangle: false,
                inverted: false,
            },
            4 => Self {
                dy: m.half_radius,
                x_reset: 0.0,
                extra_triangle: true,
                inverted: true,
            },
            s => unreachable!("row-cycle state {s} is outside 0..=4"),
        }
    }
}

/// The per-row state machine: `0 → 1 → 2 → 3 → 4 → 1 → …`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowCycle {
    state: u8,
}

impl RowCycle {
    /// State that the next call to [`Self::next_phase`] will apply.
    pub fn state(&self) -> u8 {
        self.state
    }

    /// Rules for the next row; advances the cycle.
    pub fn next_phase(&mut self, m: &TriangleMetrics) -> RowPhase {
        let phase = RowPhase::of(self.state, m);
        self.state = match self.state {
            // the initial state already consumed phase 1
            0 => 2,
            4 => 1,
            s => s + 1,
        };
        phase
    }
}

/// The full, un-partitioned triangle lattice.
///
/// Vertices are not welded: triangle `i` owns vertices `3i..3i + 3`.
pub struct Lattice {
    metrics: TriangleMetrics,
    size: Vec2,
    rows: Vec<Range<usize>>,
    /// World-space vertex positions (z = 0).
    pub vertices: Vec<Vec2>,
    /// Triangle list, stride 3.
    pub indices: Vec<u32>,
    /// `vertex / size` for every vertex.
    pub uvs: Vec<Vec2>,
    /// Per-triangle data keyed by global index.
    pub registry: TriangleRegistry,
}

impl Lattice {
    /// Lays out `rows` rows of `columns` (+1 on padded rows) triangles.
    pub fn build(s: &LatticeSettings) -> Self {
        let metrics = TriangleMetrics::new(s.radius);
        let starts = row_starts(s.rows, &metrics);
        let size = extent_of(s.columns, &starts, &metrics);

        let capacity = (s.columns as usize + 1) * s.rows as usize * 3;
        let mut vertices = Vec::with_capacity(capacity);
        let mut indices = Vec::with_capacity(capacity);
        let mut uvs = Vec::with_capacity(capacity);
        let mut registry = TriangleRegistry::default();
        let mut rows = Vec::with_capacity(starts.len());

        for (row, (start, phase)) in starts.iter().enumerate() {
            if start.x < 0.0 || start.y < 0.0 {
                warn!("lattice row {row} starts at negative offset {start}");
            }
            debug_assert!(
                start.x >= 0.0 && start.y >= 0.0,
                "lattice row {row} starts at {start}"
            );

            let count = s.columns + u32::from(phase.extra_triangle);
            let first = registry.len();
            for column in 0..count {
                let offset = *start + Vec2::new(column as f32 * metrics.column_step(), 0.0);
                let corners = math::offset_triangle(
                    math::triangle_vertices(metrics.radius, phase.inverted),
                    offset,
                );
                let index = registry.push(corners, phase.inverted);
                vertices.extend(corners);
                uvs.extend(corners.map(|v| v / size));
                indices.extend(math::triangle_indices(index as u32, phase.inverted));
            }
            rows.push(first..registry.len());
        }

        Self {
            metrics,
            size,
            rows,
            vertices,
            indices,
            uvs,
            registry,
        }
    }

    /// Size of [`Self::bounds`] for `s`, without laying out any triangle.
    pub fn extent(s: &LatticeSettings) -> Vec2 {
        let metrics = TriangleMetrics::new(s.radius);
        extent_of(s.columns, &row_starts(s.rows, &metrics), &metrics)
    }

    /// Measurements of the triangles this lattice is made of.
    pub fn metrics(&self) -> TriangleMetrics {
        self.metrics
    }

    /// Nominal extent: `columns · 2h` wide, up to the top row's upper edge.
    ///
    /// Edge triangles overhang it by less than one triangle, but each keeps at
    /// least one corner inside.
    pub fn bounds(&self) -> Rect {
        Rect::from_corners(Vec2::ZERO, self.size)
    }

    /// Global triangle indices laid out in `row`.
    pub fn row(&self, row: usize) -> Option<Range<usize>> {
        self.rows.get(row).cloned()
    }

    /// Number of laid out rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

fn extent_of(columns: u32, starts: &[(Vec2, RowPhase)], m: &TriangleMetrics) -> Vec2 {
    let top = starts.last().map_or(0.0, |(start, _)| start.y);
    Vec2::new(columns as f32 * m.column_step(), top + m.radius)
}

/// Start offset and rules of each row, running the cycle from its initial state.
fn row_starts(rows: u32, m: &TriangleMetrics) -> Vec<(Vec2, RowPhase)> {
    let mut cycle = RowCycle::default();
    let mut y = 0.0;
    (0..rows)
        .map(|_| {
            let phase = cycle.next_phase(m);
            y += phase.dy;
            (Vec2::new(phase.x_reset, y), phase)
        })
        .collect()
}
