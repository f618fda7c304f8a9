use bevy::prelude::*;

use super::FogConfig;
use super::lattice::Lattice;
use super::quadrant::{self, QuadrantGrid, QuadrantId, QuadrantMesh};
use super::vertex_index::VertexColorIndex;
use crate::error::FogError;

/// The lattice, its quadrant meshes, and the index tying them together.
///
/// Built once from a validated [`FogConfig`]. Afterwards only the quadrant
/// color buffers change.
pub struct FogSurface {
    lattice: Lattice,
    grid: QuadrantGrid,
    quadrants: Vec<QuadrantMesh>,
    index: VertexColorIndex,
}

impl FogSurface {
    /// Validates `cfg`, lays out the lattice and splits it into quadrants.
    pub fn build(cfg: &FogConfig) -> Result<Self, FogError> {
        cfg.validate()?;

        let lattice = Lattice::build(&cfg.lattice);
        let grid = QuadrantGrid::new(&cfg.quadrants);
        let mut index = VertexColorIndex::new(lattice.metrics().radius);
        let quadrants = quadrant::partition(
            &lattice.registry,
            &grid,
            cfg.unset_color.to_linear(),
            &mut index,
        );

        info!(
            "fog surface: {} triangles in {} rows, {} quadrants, {} shared vertices",
            lattice.registry.len(),
            lattice.row_count(),
            quadrants.len(),
            index.len()
        );

        Ok(Self {
            lattice,
            grid,
            quadrants,
            index,
        })
    }

    /// The global lattice the quadrants were cut from.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Quadrant placement.
    pub fn grid(&self) -> &QuadrantGrid {
        &self.grid
    }

    /// Where every copy of every vertex lives.
    pub fn index(&self) -> &VertexColorIndex {
        &self.index
    }

    /// Quadrant meshes in scan order.
    pub fn quadrants(&self) -> &[QuadrantMesh] {
        &self.quadrants
    }

    /// Mesh of one quadrant, `None` outside the grid.
    pub fn quadrant(&self, id: QuadrantId) -> Option<&QuadrantMesh> {
        self.grid.scan_index(id).and_then(|i| self.quadrants.get(i))
    }

    /// Colors the vertex at `world` in every quadrant that holds a copy.
    ///
    /// Returns the quadrants whose color buffers changed.
    pub fn recolor(&mut self, world: Vec2, color: LinearRgba) -> Result<Vec<QuadrantId>, FogError> {
        self.index
            .recolor(world, color, &self.grid, &mut self.quadrants)
    }

    /// [`Self::recolor`] addressed by vertex handle.
    pub fn recolor_handle(
        &mut self,
        handle: usize,
        color: LinearRgba,
    ) -> Result<Vec<QuadrantId>, FogError> {
        self.index
            .recolor_handle(handle, color, &self.grid, &mut self.quadrants)
    }

    /// Colors all three corners of every copy of a lattice triangle.
    pub fn recolor_triangle(
        &mut self,
        triangle: usize,
        color: LinearRgba,
    ) -> Result<Vec<QuadrantId>, FogError> {
        self.index
            .recolor_triangle(triangle, color, &self.grid, &mut self.quadrants)
    }

    /// Closest lattice vertex to an arbitrary world point.
    pub fn nearest_vertex(&self, world: Vec2) -> Vec2 {
        self.index.nearest_vertex(world)
    }

    /// Handle of the indexed vertex closest to `world`, if it is indexed.
    pub fn nearest_handle(&self, world: Vec2) -> Option<usize> {
        self.index
            .key_of(self.nearest_vertex(world))
            .and_then(|key| self.index.handle_of(key))
    }

    /// Current color of a vertex, read from its first copy.
    pub fn vertex_color(&self, handle: usize) -> Option<LinearRgba> {
        let key = self.index.position_of(handle)?;
        let (id, locals) = self.index.position_refs(key)?.iter().next()?;
        let local = *locals.first()?;
        self.quadrant(id)?.colors.get(local as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use std::collections::BTreeSet;

    use super::*;
    use crate::fog::{LatticeSettings, PositionKey, QuadrantSettings};

    fn config() -> FogConfig {
        FogConfig {
            lattice: LatticeSettings {
                columns: 6,
                rows: 10,
                radius: 1.0,
            },
            quadrants: QuadrantSettings {
                columns: 3,
                rows: 2,
                size: 4.0,
            },
            ..default()
        }
    }

    fn colors_at(surface: &FogSurface, world: Vec2) -> Vec<LinearRgba> {
        let refs = surface
            .index()
            .refs_at(world)
            .unwrap();
        refs.iter()
            .flat_map(|(id, locals)| {
                let mesh = surface.quadrant(id).unwrap();
                locals.iter().map(|&l| mesh.colors[l as usize])
            })
            .collect()
    }

    #[test]
    fn default_config_assigns_every_triangle() {
        let surface = FogSurface::build(&FogConfig::default()).unwrap();
        let assigned: BTreeSet<usize> = surface
            .quadrants()
            .iter()
            .flat_map(|m| m.triangles.iter().copied())
            .collect();
        let all: BTreeSet<usize> = (0..surface.lattice().registry.len()).collect();
        assert_eq!(assigned, all);
    }

    #[test]
    fn invalid_config_builds_nothing() {
        let mut cfg = config();
        cfg.lattice.radius = 0.0;
        assert!(matches!(
            FogSurface::build(&cfg),
            Err(FogError::InvalidConfig {
                field: "lattice.radius",
                ..
            })
        ));
    }

    #[test]
    fn recolor_reaches_every_quadrant_sharing_the_vertex() {
        let mut surface = FogSurface::build(&config()).unwrap();
        let h = surface.lattice().metrics().height;
        let seam = Vec2::new(2.0 * h, 4.0);

        let touched = surface.recolor(seam, LinearRgba::BLUE).unwrap();
        assert!(touched.contains(&QuadrantId::new(0, 0)));
        assert!(touched.contains(&QuadrantId::new(0, 1)));

        let colors = colors_at(&surface, seam);
        assert!(colors.len() >= 2);
        assert!(colors.iter().all(|c| *c == LinearRgba::BLUE));
    }

    #[test]
    fn recolor_leaves_other_vertices_alone() {
        let mut surface = FogSurface::build(&config()).unwrap();
        let h = surface.lattice().metrics().height;
        surface
            .recolor(Vec2::new(2.0 * h, 1.0), LinearRgba::GREEN)
            .unwrap();
        let painted: usize = surface
            .quadrants()
            .iter()
            .map(|m| m.colors.iter().filter(|c| **c == LinearRgba::GREEN).count())
            .sum();
        let refs = surface
            .index()
            .refs_at(Vec2::new(2.0 * h, 1.0))
            .unwrap();
        let expected: usize = refs.iter().map(|(_, locals)| locals.len()).sum();
        assert_eq!(painted, expected);
    }

    #[test]
    fn second_recolor_overwrites_first() {
        let mut surface = FogSurface::build(&config()).unwrap();
        let h = surface.lattice().metrics().height;
        let p = Vec2::new(2.0 * h, 4.0);
        let first = surface.recolor(p, LinearRgba::GREEN).unwrap();
        let second = surface.recolor(p, LinearRgba::BLUE).unwrap();
        assert_eq!(first, second);
        assert!(colors_at(&surface, p).iter().all(|c| *c == LinearRgba::BLUE));
        assert!(
            surface
                .quadrants()
                .iter()
                .all(|m| !m.colors.contains(&LinearRgba::GREEN))
        );
    }

    #[test]
    fn recolor_unknown_position_fails() {
        let mut surface = FogSurface::build(&config()).unwrap();
        let err = surface
            .recolor(Vec2::new(100.0, 100.0), LinearRgba::BLUE)
            .unwrap_err();
        assert_eq!(
            err,
            FogError::UnknownPosition(PositionKey::from_world(Vec2::new(100.0, 100.0)))
        );
    }

    #[test]
    fn handles_address_the_same_vertices_as_positions() {
        let mut surface = FogSurface::build(&config()).unwrap();
        let key = surface.index().position_of(7).unwrap();
        surface.recolor_handle(7, LinearRgba::BLUE).unwrap();
        assert!(
            colors_at(&surface, key.to_world())
                .iter()
                .all(|c| *c == LinearRgba::BLUE)
        );
        let past_end = surface.index().len();
        assert_eq!(
            surface.recolor_handle(past_end, LinearRgba::BLUE),
            Err(FogError::UnknownHandle(past_end))
        );
    }

    #[test]
    fn recolor_triangle_paints_all_copies() {
        let mut surface = FogSurface::build(&config()).unwrap();
        let touched = surface.recolor_triangle(0, LinearRgba::BLUE).unwrap();
        for id in touched {
            let mesh = surface.quadrant(id).unwrap();
            let local = mesh.triangles.iter().position(|t| *t == 0).unwrap();
            assert!(
                mesh.colors[local * 3..local * 3 + 3]
                    .iter()
                    .all(|c| *c == LinearRgba::BLUE)
            );
        }
    }

    #[test]
    fn every_lattice_vertex_snaps_to_itself() {
        let surface = FogSurface::build(&config()).unwrap();
        for v in &surface.lattice().vertices {
            let snapped = surface.nearest_vertex(*v);
            assert!(
                (snapped - *v).length() < 1e-3,
                "{v} snapped to {snapped}"
            );
        }
    }

    #[test]
    fn nearby_points_snap_to_the_closest_vertex() {
        let surface = FogSurface::build(&config()).unwrap();
        let h = surface.lattice().metrics().height;
        let vertex = Vec2::new(2.0 * h, 1.0);
        let snapped = surface.nearest_vertex(vertex + Vec2::new(0.2, -0.3));
        assert!((snapped - vertex).length() < 1e-3);
        assert_eq!(
            surface.nearest_handle(vertex + Vec2::new(-0.1, 0.1)),
            surface
                .index()
                .key_of(vertex)
                .and_then(|key| surface.index().handle_of(key))
        );
    }

    #[test]
    fn vertex_color_follows_recolors() {
        let mut surface = FogSurface::build(&config()).unwrap();
        let unset = config().unset_color.to_linear();
        assert_eq!(surface.vertex_color(3), Some(unset));
        surface.recolor_handle(3, LinearRgba::BLUE).unwrap();
        assert_eq!(surface.vertex_color(3), Some(LinearRgba::BLUE));
        assert_eq!(surface.vertex_color(surface.index().len()), None);
    }
}
