use bevy::asset::RenderAssetUsages;
use bevy::image::ImageLoaderSettings;
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;

use super::entities::{FogLattice, FogQuadrant, LatticeOverlay};
use super::lattice::Lattice;
use super::quadrant::QuadrantMesh;
use super::surface::FogSurface;
use super::{FogConfig, TextureSlot};

/// Triangles are wound clockwise seen from +Z, so their front faces look down -Z.
const FACE_NORMAL: [f32; 3] = [0.0, 0.0, -1.0];
const FACE_TANGENT: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

// ── Startup ─────────────────────────────────────────────────────────

/// Builds the [`FogSurface`] and spawns one textured mesh per quadrant plus
/// the hidden [`LatticeOverlay`].
pub fn build_fog_surface(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    cfg: Res<FogConfig>,
) {
    let surface = match FogSurface::build(&cfg) {
        Ok(surface) => surface,
        Err(err) => {
            error!("fog surface not built: {err}");
            return;
        }
    };

    let root = commands
        .spawn((
            Name::new("FogLattice"),
            Transform::default(),
            Visibility::default(),
        ))
        .id();

    for (scan, quadrant) in surface.quadrants().iter().enumerate() {
        let mut material = StandardMaterial {
            base_color: Color::WHITE,
            perceptual_roughness: 0.8,
            double_sided: true,
            cull_mode: None,
            ..default()
        };
        for slot in TextureSlot::ALL {
            let Some(path) = slot.path(&cfg.textures, scan) else {
                debug!("quadrant {scan} has no {} texture", slot.name());
                continue;
            };
            let image: Handle<Image> = if slot.is_srgb() {
                asset_server.load(path.to_owned())
            } else {
                asset_server.load_with_settings(
                    path.to_owned(),
                    |s: &mut ImageLoaderSettings| s.is_srgb = false,
                )
            };
            slot.bind(&mut material, image);
        }

        let id = quadrant.id;
        let entity = commands
            .spawn((
                FogQuadrant { id },
                Name::new(format!("FogQuadrant({},{})", id.column, id.row)),
                Mesh3d(meshes.add(quadrant_mesh(quadrant))),
                MeshMaterial3d(materials.add(material)),
                Transform::from_translation(quadrant.origin.extend(0.0)),
            ))
            .id();
        commands.entity(root).add_child(entity);
    }

    let overlay = commands
        .spawn((
            LatticeOverlay,
            Name::new("LatticeOverlay"),
            Mesh3d(meshes.add(lattice_mesh(surface.lattice()))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgba(1.0, 1.0, 1.0, 0.25),
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                double_sided: true,
                cull_mode: None,
                ..default()
            })),
            Transform::from_xyz(0.0, 0.0, 0.01),
            Visibility::Hidden,
        ))
        .id();
    commands.entity(root).add_child(overlay);

    commands.entity(root).insert(FogLattice { surface });
}

// ── Mesh assembly ──────────────────────────────────────────────────

/// Quadrant buffers as a render mesh. Kept in the main world so vertex colors
/// can be rewritten after spawn.
pub(super) fn quadrant_mesh(q: &QuadrantMesh) -> Mesh {
    let n = q.vertices.len();
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(
            Mesh::ATTRIBUTE_POSITION,
            q.vertices.iter().map(|v| v.extend(0.0)).collect::<Vec<Vec3>>(),
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, vec![FACE_NORMAL; n])
        .with_inserted_attribute(Mesh::ATTRIBUTE_TANGENT, vec![FACE_TANGENT; n])
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, q.uvs.clone())
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, q.color_array())
        .with_inserted_indices(Indices::U32(q.indices.clone()))
}

fn lattice_mesh(lattice: &Lattice) -> Mesh {
    let n = lattice.vertices.len();
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::RENDER_WORLD)
        .with_inserted_attribute(
            Mesh::ATTRIBUTE_POSITION,
            lattice
                .vertices
                .iter()
                .map(|v| v.extend(0.0))
                .collect::<Vec<Vec3>>(),
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, vec![FACE_NORMAL; n])
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, lattice.uvs.clone())
        .with_inserted_indices(Indices::U32(lattice.indices.clone()))
}

#[cfg(test)]
mod tests {
    use bevy::mesh::VertexAttributeValues;

    use super::*;
    use crate::fog::{LatticeSettings, QuadrantSettings};

    #[test]
    fn quadrant_mesh_carries_every_buffer() {
        let surface = FogSurface::build(&FogConfig {
            lattice: LatticeSettings {
                columns: 4,
                rows: 6,
                radius: 1.0,
            },
            quadrants: QuadrantSettings {
                columns: 2,
                rows: 2,
                size: 4.0,
            },
            ..default()
        })
        .unwrap();
        let q = &surface.quadrants()[0];
        let mesh = quadrant_mesh(q);

        assert_eq!(mesh.count_vertices(), q.vertices.len());
        assert_eq!(mesh.indices().map(|i| i.len()), Some(q.indices.len()));
        for attribute in [
            Mesh::ATTRIBUTE_NORMAL,
            Mesh::ATTRIBUTE_TANGENT,
            Mesh::ATTRIBUTE_UV_0,
        ] {
            assert!(mesh.attribute(attribute).is_some());
        }
        match mesh.attribute(Mesh::ATTRIBUTE_COLOR) {
            Some(VertexAttributeValues::Float32x4(colors)) => {
                assert_eq!(colors, &q.color_array())
            }
            other => panic!("unexpected color attribute {other:?}"),
        }
    }
}
