use bevy::math::Isometry3d;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::egui;

use super::FogConfig;
use super::entities::{
    FogLattice, FogQuadrant, HighlightCursor, LatticeOverlay, RecolorTarget, RecolorVertex,
};
use super::quadrant::QuadrantId;
use crate::camera::FogCamera;

// ── Update: recolor ────────────────────────────────────────────────

/// Applies queued [`RecolorVertex`] messages, then re-uploads the colors of
/// every quadrant mesh they touched.
pub fn apply_recolor(
    mut messages: MessageReader<RecolorVertex>,
    mut lattice_q: Query<&mut FogLattice>,
    quadrants_q: Query<(&FogQuadrant, &Mesh3d)>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let Ok(mut lattice) = lattice_q.single_mut() else {
        return;
    };

    let mut dirty: Vec<QuadrantId> = Vec::new();
    for msg in messages.read() {
        let color = msg.color.to_linear();
        let surface = &mut lattice.surface;
        let result = match msg.target {
            RecolorTarget::Position(p) => surface.recolor(p, color),
            RecolorTarget::Handle(h) => surface.recolor_handle(h, color),
            RecolorTarget::Triangle(t) => surface.recolor_triangle(t, color),
        };
        match result {
            Ok(touched) => {
                for id in touched {
                    if !dirty.contains(&id) {
                        dirty.push(id);
                    }
                }
            }
            Err(err) => warn!("recolor ignored: {err}"),
        }
    }
    if dirty.is_empty() {
        return;
    }

    for (quadrant, mesh3d) in &quadrants_q {
        if !dirty.contains(&quadrant.id) {
            continue;
        }
        let Some(data) = lattice.surface.quadrant(quadrant.id) else {
            continue;
        };
        if let Some(mesh) = meshes.get_mut(&mesh3d.0) {
            mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, data.color_array());
        }
    }
    debug!("recolored {} quadrant meshes", dirty.len());
}

// ── Update: controls ───────────────────────────────────────────────

/// Arrow keys walk a highlight through the vertex handles.
///
/// The vertex left behind gets back the color it had before the highlight,
/// unless it was repainted while highlighted.
pub fn step_highlight(
    keys: Res<ButtonInput<KeyCode>>,
    cfg: Res<FogConfig>,
    lattice_q: Query<&FogLattice>,
    mut cursor: ResMut<HighlightCursor>,
    mut writer: MessageWriter<RecolorVertex>,
) {
    let step = if keys.just_pressed(KeyCode::ArrowRight) {
        1
    } else if keys.just_pressed(KeyCode::ArrowLeft) {
        -1
    } else if keys.just_pressed(KeyCode::ArrowUp) {
        10
    } else if keys.just_pressed(KeyCode::ArrowDown) {
        -10
    } else {
        return;
    };
    let Ok(lattice) = lattice_q.single() else {
        return;
    };

    let surface = &lattice.surface;
    let highlight = cfg.highlight_color.to_linear();

    let previous = cursor.handle;
    let Some(next) = cursor.step(step, surface.index().len()) else {
        return;
    };
    if previous == Some(next) {
        return;
    }
    let restore = previous
        .and_then(|p| cursor.restore(surface.vertex_color(p), highlight).map(|c| (p, c)));
    if let Some((previous, color)) = restore {
        writer.write(RecolorVertex {
            target: RecolorTarget::Handle(previous),
            color: color.into(),
        });
    }
    cursor.saved = surface.vertex_color(next);
    writer.write(RecolorVertex {
        target: RecolorTarget::Handle(next),
        color: cfg.highlight_color,
    });
}

/// Left click paints the lattice vertex under the cursor, right click clears it.
pub fn click_recolor(
    mouse: Res<ButtonInput<MouseButton>>,
    cfg: Res<FogConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_q: Query<(&Camera, &GlobalTransform), With<FogCamera>>,
    lattice_q: Query<&FogLattice>,
    mut writer: MessageWriter<RecolorVertex>,
) {
    let color = if mouse.just_pressed(MouseButton::Left) {
        cfg.highlight_color
    } else if mouse.just_pressed(MouseButton::Right) {
        cfg.unset_color
    } else {
        return;
    };
    let (Ok(window), Ok((camera, cam_gt)), Ok(lattice)) =
        (windows.single(), camera_q.single(), lattice_q.single())
    else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(cam_gt, cursor) else {
        return;
    };
    let Some(distance) = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Z)) else {
        return;
    };

    let vertex = lattice.surface.nearest_vertex(ray.get_point(distance).truncate());
    writer.write(RecolorVertex {
        target: RecolorTarget::Position(vertex),
        color,
    });
}

// ── Debugging overlays ─────────────────────────────────────────────

/// Shows the lattice overlay on entering [`GameState::Debugging`](crate::GameState::Debugging).
pub fn show_lattice_overlay(mut overlay_q: Query<&mut Visibility, With<LatticeOverlay>>) {
    for mut vis in &mut overlay_q {
        *vis = Visibility::Visible;
    }
}

/// Hides it again on exit.
pub fn hide_lattice_overlay(mut overlay_q: Query<&mut Visibility, With<LatticeOverlay>>) {
    for mut vis in &mut overlay_q {
        *vis = Visibility::Hidden;
    }
}

/// Outlines every quadrant's bounds at the surface plane.
pub fn draw_quadrant_bounds(mut gizmos: Gizmos, lattice_q: Query<&FogLattice>) {
    let Ok(lattice) = lattice_q.single() else {
        return;
    };
    let grid = lattice.surface.grid();
    for id in grid.scan_order() {
        gizmos.rect(
            Isometry3d::from_translation(grid.center(id).extend(0.02)),
            Vec2::splat(grid.size()),
            Color::srgb(1.0, 0.8, 0.0),
        );
    }
}

/// Draws each quadrant's scan index and triangle count as a screen-projected
/// egui label.
pub fn draw_quadrant_labels(
    mut egui_ctx: Query<&mut bevy_egui::EguiContext>,
    camera_q: Query<(&Camera, &GlobalTransform), With<FogCamera>>,
    lattice_q: Query<&FogLattice>,
    mut ready: Local<bool>,
) {
    if !*ready {
        *ready = true;
        return;
    }
    let Ok((camera, cam_gt)) = camera_q.single() else {
        return;
    };
    let Ok(lattice) = lattice_q.single() else {
        return;
    };
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };

    let painter = ctx.get_mut().layer_painter(egui::LayerId::background());
    let grid = lattice.surface.grid();

    for (scan, quadrant) in lattice.surface.quadrants().iter().enumerate() {
        let world_pos = grid.center(quadrant.id).extend(0.0);
        if let Ok(viewport) = camera.world_to_viewport(cam_gt, world_pos) {
            painter.text(
                egui::pos2(viewport.x, viewport.y),
                egui::Align2::CENTER_CENTER,
                format!("#{scan} · {} tris", quadrant.triangle_count()),
                egui::FontId::proportional(12.0),
                egui::Color32::WHITE,
            );
        }
    }
}
