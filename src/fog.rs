//! Fog-of-war surface: hexagon-split triangle lattice cut into per-tile meshes
//! whose shared vertices can be recolored from any tile.
//!
//! The pure layers (lattice, registry, partition, vertex index) live in the
//! submodules and are wrapped by [`FogSurface`]. The plugins here build the
//! surface at startup, hand each quadrant mesh to the renderer and apply
//! [`RecolorVertex`] messages.

mod entities;
mod lattice;
mod quadrant;
mod registry;
mod startup_systems;
mod surface;
mod systems;
mod vertex_index;

pub use entities::{FogLattice, FogQuadrant, LatticeOverlay, RecolorTarget, RecolorVertex};
pub use lattice::{Lattice, RowCycle, RowPhase};
pub use quadrant::{QuadrantGrid, QuadrantId, QuadrantMesh};
pub use registry::{Triangle, TriangleRegistry};
pub use surface::FogSurface;
pub use vertex_index::{PositionKey, VertexColorIndex, VertexRefs};

use bevy::prelude::*;

use crate::GameState;
use crate::error::FogError;

/// Nested configuration for the fog surface.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct FogConfig {
    /// Triangle lattice layout.
    pub lattice: LatticeSettings,
    /// Tile grid the lattice is split into.
    pub quadrants: QuadrantSettings,
    /// Per-quadrant texture layers.
    pub textures: TextureSettings,
    /// Initial color of every vertex.
    pub unset_color: Color,
    /// Color written by the highlight controls.
    pub highlight_color: Color,
    /// Background clear color.
    pub clear_color: Color,
}

/// Lattice dimensions.
#[derive(Clone, Debug, Reflect)]
pub struct LatticeSettings {
    /// Triangles per row before padding.
    pub columns: u32,
    /// Number of triangle rows.
    pub rows: u32,
    /// Circumradius of every triangle.
    pub radius: f32,
}

/// Quadrant (tile) grid, anchored at the world origin.
///
/// Must cover the whole lattice extent.
#[derive(Clone, Debug, Reflect)]
pub struct QuadrantSettings {
    /// Quadrants per grid row.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Side length of each square quadrant.
    pub size: f32,
}

/// Texture asset paths.
///
/// The albedo and normal lists are indexed by quadrant scan order; shorter
/// lists leave the remaining quadrants untextured. The fog layer is shared by
/// every quadrant.
#[derive(Clone, Debug, Default, Reflect)]
pub struct TextureSettings {
    /// Albedo layer, bound to the `main` slot.
    pub albedo: Vec<String>,
    /// Normal-map layer, bound to the `layer1` slot.
    pub normal: Vec<String>,
    /// Shared fog layer, bound to the `layer2` slot.
    pub fog: Option<String>,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            // 39.84 × 30 units, inside the 40 × 30 quadrant grid
            lattice: LatticeSettings {
                columns: 23,
                rows: 40,
                radius: 1.0,
            },
            quadrants: QuadrantSettings {
                columns: 8,
                rows: 6,
                size: 5.0,
            },
            textures: TextureSettings::default(),
            unset_color: Color::srgb(1.0, 0.0, 0.0),
            highlight_color: Color::srgb(0.1, 0.9, 1.0),
            clear_color: Color::srgb(0.01, 0.01, 0.02),
        }
    }
}

impl FogConfig {
    /// Rejects values that would produce degenerate geometry, and quadrant
    /// grids that leave part of the lattice uncovered.
    pub fn validate(&self) -> Result<(), FogError> {
        positive("lattice.radius", self.lattice.radius)?;
        positive("quadrants.size", self.quadrants.size)?;
        nonzero("lattice.columns", self.lattice.columns)?;
        nonzero("lattice.rows", self.lattice.rows)?;
        nonzero("quadrants.columns", self.quadrants.columns)?;
        nonzero("quadrants.rows", self.quadrants.rows)?;

        let lattice = Lattice::extent(&self.lattice);
        let q = &self.quadrants;
        let covered = Vec2::new(q.columns as f32, q.rows as f32) * q.size;
        if covered.x + COVERAGE_SLACK < lattice.x || covered.y + COVERAGE_SLACK < lattice.y {
            return Err(FogError::InvalidConfig {
                field: "quadrants",
                reason: format!("cover {covered} but the lattice reaches {lattice}"),
            });
        }
        Ok(())
    }
}

/// Float noise allowed when comparing the quadrant grid with the lattice extent.
const COVERAGE_SLACK: f32 = 1e-4;

fn positive(field: &'static str, value: f32) -> Result<(), FogError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FogError::InvalidConfig {
            field,
            reason: format!("must be a positive finite number, got {value}"),
        })
    }
}

fn nonzero(field: &'static str, value: u32) -> Result<(), FogError> {
    if value > 0 {
        Ok(())
    } else {
        Err(FogError::InvalidConfig {
            field,
            reason: "must be at least 1".into(),
        })
    }
}

/// Named material slot a quadrant texture layer is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSlot {
    /// Color layer (base color texture).
    Main,
    /// Normal-map layer.
    Layer1,
    /// Shared fog layer, laid over the color as emission.
    Layer2,
}

impl TextureSlot {
    /// Every slot, in binding order.
    pub const ALL: [Self; 3] = [Self::Main, Self::Layer1, Self::Layer2];

    /// Slot name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Layer1 => "layer1",
            Self::Layer2 => "layer2",
        }
    }

    /// Asset path configured for the quadrant at `scan_index`.
    pub fn path(self, textures: &TextureSettings, scan_index: usize) -> Option<&str> {
        match self {
            Self::Main => textures.albedo.get(scan_index).map(String::as_str),
            Self::Layer1 => textures.normal.get(scan_index).map(String::as_str),
            Self::Layer2 => textures.fog.as_deref(),
        }
    }

    /// Normal maps hold vectors, not colors.
    pub fn is_srgb(self) -> bool {
        self != Self::Layer1
    }

    /// Stores `image` in the material field backing this slot.
    pub fn bind(self, material: &mut StandardMaterial, image: Handle<Image>) {
        match self {
            Self::Main => material.base_color_texture = Some(image),
            Self::Layer1 => material.normal_map_texture = Some(image),
            Self::Layer2 => {
                material.emissive_texture = Some(image);
                material.emissive = LinearRgba::rgb(0.25, 0.25, 0.25);
            }
        }
    }
}

/// Builds the fog surface at startup and applies recolor messages.
pub struct FogPlugin(pub FogConfig);

impl Plugin for FogPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<FogConfig>()
            .register_type::<FogQuadrant>()
            .register_type::<LatticeOverlay>()
            .insert_resource(self.0.clone())
            .insert_resource(ClearColor(self.0.clear_color))
            .add_message::<RecolorVertex>()
            .add_systems(Startup, startup_systems::build_fog_surface)
            .add_systems(Update, systems::apply_recolor);
    }
}

/// Keyboard/mouse highlighting and the debugging overlays.
///
/// Needs the input, window, gizmo and egui plugins, so it is kept apart from
/// [`FogPlugin`].
pub struct FogControlsPlugin;

impl Plugin for FogControlsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<entities::HighlightCursor>()
            .add_systems(
                Update,
                (systems::step_highlight, systems::click_recolor)
                    .before(systems::apply_recolor)
                    .run_if(any_with_component::<FogLattice>),
            )
            .add_systems(
                OnEnter(GameState::Debugging),
                systems::show_lattice_overlay,
            )
            .add_systems(OnExit(GameState::Debugging), systems::hide_lattice_overlay)
            .add_systems(
                Update,
                (systems::draw_quadrant_bounds, systems::draw_quadrant_labels)
                    .run_if(in_state(GameState::Debugging)),
            );
    }
}

#[cfg(test)]
mod tests {
    use bevy::mesh::VertexAttributeValues;

    use super::*;

    fn small_config() -> FogConfig {
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

    fn headless_app(cfg: FogConfig) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>()
            .init_asset::<Image>()
            .add_plugins(FogPlugin(cfg));
        app.update();
        app
    }

    // ── validation ──────────────────────────────────────────────────

    #[test]
    fn default_config_is_valid() {
        assert_eq!(FogConfig::default().validate(), Ok(()));
    }

    #[test]
    fn degenerate_values_are_rejected() {
        let cases: [(&str, fn(&mut FogConfig)); 6] = [
            ("lattice.radius", |c| c.lattice.radius = -1.0),
            ("lattice.radius", |c| c.lattice.radius = f32::NAN),
            ("quadrants.size", |c| c.quadrants.size = 0.0),
            ("lattice.columns", |c| c.lattice.columns = 0),
            ("lattice.rows", |c| c.lattice.rows = 0),
            ("quadrants.rows", |c| c.quadrants.rows = 0),
        ];
        for (expected, break_it) in cases {
            let mut cfg = FogConfig::default();
            break_it(&mut cfg);
            match cfg.validate() {
                Err(FogError::InvalidConfig { field, .. }) => assert_eq!(field, expected),
                other => panic!("{expected}: expected InvalidConfig, got {other:?}"),
            }
        }
    }

    #[test]
    fn quadrants_must_cover_the_lattice() {
        // 24 columns reach 41.57 > 40, 42 rows reach 31.5 > 30
        for (columns, rows) in [(24, 40), (23, 42)] {
            let mut cfg = FogConfig::default();
            cfg.lattice.columns = columns;
            cfg.lattice.rows = rows;
            assert!(matches!(
                cfg.validate(),
                Err(FogError::InvalidConfig {
                    field: "quadrants",
                    ..
                })
            ));
        }
    }

    #[test]
    fn exact_coverage_is_enough() {
        // 40 rows top out at exactly 30 = 6 · 5
        let cfg = FogConfig::default();
        assert_eq!(Lattice::extent(&cfg.lattice).y, 30.0);
        assert_eq!(cfg.validate(), Ok(()));
    }

    // ── texture slots ───────────────────────────────────────────────

    #[test]
    fn slots_pick_paths_by_scan_index() {
        let textures = TextureSettings {
            albedo: vec!["a.png".into(), "b.png".into()],
            normal: vec!["a_n.png".into()],
            fog: Some("fog.png".into()),
        };
        assert_eq!(TextureSlot::Main.path(&textures, 1), Some("b.png"));
        assert_eq!(TextureSlot::Layer1.path(&textures, 0), Some("a_n.png"));
        assert_eq!(TextureSlot::Layer1.path(&textures, 1), None);
        for scan in [0, 1, 47] {
            assert_eq!(TextureSlot::Layer2.path(&textures, scan), Some("fog.png"));
        }
        assert_eq!(TextureSlot::Layer2.path(&TextureSettings::default(), 0), None);
    }

    #[test]
    fn slots_bind_distinct_material_fields() {
        let mut material = StandardMaterial::default();
        TextureSlot::Main.bind(&mut material, Handle::default());
        assert!(material.base_color_texture.is_some());
        assert!(material.normal_map_texture.is_none());
        TextureSlot::Layer1.bind(&mut material, Handle::default());
        assert!(material.normal_map_texture.is_some());
        assert!(material.emissive_texture.is_none());
        TextureSlot::Layer2.bind(&mut material, Handle::default());
        assert!(material.emissive_texture.is_some());
        assert!(TextureSlot::Layer2.is_srgb());
        assert!(!TextureSlot::Layer1.is_srgb());
    }

    // ── plugin ──────────────────────────────────────────────────────

    #[test]
    fn startup_spawns_one_renderable_per_quadrant() {
        let mut app = headless_app(small_config());
        let world = app.world_mut();
        let quadrants = world.query::<&FogQuadrant>().iter(world).count();
        assert_eq!(quadrants, 6);
        let lattices = world.query::<&FogLattice>().iter(world).count();
        assert_eq!(lattices, 1);
    }

    #[test]
    fn invalid_config_spawns_nothing() {
        let mut cfg = small_config();
        cfg.quadrants.size = 0.0;
        let mut app = headless_app(cfg);
        let world = app.world_mut();
        assert_eq!(world.query::<&FogQuadrant>().iter(world).count(), 0);
        assert_eq!(world.query::<&FogLattice>().iter(world).count(), 0);
    }

    #[test]
    fn recolor_message_reaches_mesh_assets() {
        let mut app = headless_app(small_config());
        let h = 0.75f32.sqrt();
        let seam = Vec2::new(2.0 * h, 4.0);

        app.world_mut().write_message(RecolorVertex {
            target: RecolorTarget::Position(seam),
            color: Color::from(LinearRgba::BLUE),
        });
        app.update();

        let world = app.world_mut();
        let refs: Vec<(QuadrantId, Vec<u32>)> = {
            let mut q = world.query::<&FogLattice>();
            let lattice = q.single(world).unwrap();
            lattice
                .surface
                .index()
                .refs_at(seam)
                .unwrap()
                .iter()
                .map(|(id, locals)| (id, locals.to_vec()))
                .collect()
        };
        assert!(refs.len() >= 2);

        let handles: Vec<(QuadrantId, Handle<Mesh>)> = world
            .query::<(&FogQuadrant, &Mesh3d)>()
            .iter(world)
            .map(|(q, m)| (q.id, m.0.clone()))
            .collect();
        let meshes = world.resource::<Assets<Mesh>>();
        for (id, locals) in refs {
            let (_, handle) = handles.iter().find(|(q, _)| *q == id).unwrap();
            let mesh = meshes.get(handle).unwrap();
            let Some(VertexAttributeValues::Float32x4(colors)) =
                mesh.attribute(Mesh::ATTRIBUTE_COLOR)
            else {
                panic!("quadrant {id:?} mesh has no vertex colors");
            };
            for local in locals {
                assert_eq!(colors[local as usize], [0.0, 0.0, 1.0, 1.0]);
            }
        }
    }

    // ── highlight ───────────────────────────────────────────────────

    fn press(app: &mut App, key: KeyCode) {
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(key);
        app.update();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .reset_all();
    }

    fn vertex_color(app: &mut App, handle: usize) -> Option<LinearRgba> {
        let world = app.world_mut();
        let mut q = world.query::<&FogLattice>();
        q.single(world).ok()?.surface.vertex_color(handle)
    }

    #[test]
    fn stepping_away_restores_the_color_under_the_highlight() {
        let cfg = small_config();
        let highlight = cfg.highlight_color.to_linear();
        let mut app = headless_app(cfg);
        app.init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<entities::HighlightCursor>()
            .add_systems(
                Update,
                systems::step_highlight.before(systems::apply_recolor),
            );

        app.world_mut().write_message(RecolorVertex {
            target: RecolorTarget::Handle(1),
            color: Color::from(LinearRgba::BLUE),
        });
        app.update();

        press(&mut app, KeyCode::ArrowRight);
        press(&mut app, KeyCode::ArrowRight);
        assert_eq!(vertex_color(&mut app, 1), Some(highlight));

        press(&mut app, KeyCode::ArrowRight);
        assert_eq!(vertex_color(&mut app, 1), Some(LinearRgba::BLUE));
        assert_eq!(vertex_color(&mut app, 2), Some(highlight));
    }

    #[test]
    fn repainting_under_the_highlight_survives_stepping_away() {
        let mut app = headless_app(small_config());
        app.init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<entities::HighlightCursor>()
            .add_systems(
                Update,
                systems::step_highlight.before(systems::apply_recolor),
            );

        press(&mut app, KeyCode::ArrowRight);
        app.world_mut().write_message(RecolorVertex {
            target: RecolorTarget::Handle(0),
            color: Color::from(LinearRgba::GREEN),
        });
        app.update();

        press(&mut app, KeyCode::ArrowLeft);
        assert_eq!(vertex_color(&mut app, 0), Some(LinearRgba::GREEN));
    }
}
