use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::render::view::Hdr;

use super::CameraConfig;
use super::entities::FogCamera;
use crate::fog::FogConfig;
use crate::math;

/// Spawns the camera centered over the quadrant grid, far enough back to frame
/// all of it, and a key light shining along -Z.
pub fn spawn_camera(mut commands: Commands, cfg: Res<CameraConfig>, fog: Res<FogConfig>) {
    let q = &fog.quadrants;
    let extent = Vec2::new(q.columns as f32, q.rows as f32) * q.size;
    let center = (extent / 2.0).extend(0.0);
    let distance = math::framing_distance(extent * cfg.margin, cfg.fov, 16.0 / 9.0)
        .max(cfg.min_distance);

    commands.spawn((
        Name::new("FogCamera"),
        Camera3d::default(),
        Hdr,
        Tonemapping::TonyMcMapface,
        Projection::Perspective(PerspectiveProjection {
            fov: cfg.fov,
            ..default()
        }),
        Transform::from_translation(center + Vec3::Z * distance).looking_at(center, Vec3::Y),
        FogCamera,
    ));

    commands.spawn((
        Name::new("KeyLight"),
        DirectionalLight {
            illuminance: cfg.light_illuminance,
            ..default()
        },
        Transform::from_translation(center + Vec3::new(-4.0, 4.0, 10.0)).looking_at(center, Vec3::Y),
    ));
}

/// WASD pan in the surface plane, scaled by the current distance.
pub fn pan(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    cfg: Res<CameraConfig>,
    mut query: Query<&mut Transform, With<FogCamera>>,
) {
    let Ok(mut transform) = query.single_mut() else {
        return;
    };

    let mut direction = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        direction.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        direction.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        direction.x += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        direction.x -= 1.0;
    }
    if direction == Vec2::ZERO {
        return;
    }

    let scale = (transform.translation.z / 10.0).max(0.1);
    let delta = direction.normalize() * cfg.pan_speed * scale * time.delta_secs();
    transform.translation += delta.extend(0.0);
}

/// Scroll moves the camera toward or away from the surface.
pub fn zoom(
    mut scroll: MessageReader<MouseWheel>,
    cfg: Res<CameraConfig>,
    mut query: Query<&mut Transform, With<FogCamera>>,
) {
    let Ok(mut transform) = query.single_mut() else {
        return;
    };
    for ev in scroll.read() {
        let lines = match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / 40.0,
        };
        let z = transform.translation.z * (1.0 - lines * cfg.zoom_step);
        transform.translation.z = z.max(cfg.min_distance);
    }
}
