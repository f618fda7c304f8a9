//! Top-down camera over the fog surface.
//!
//! Spawns a Camera3d above the quadrant grid looking down -Z, plus the key
//! light. WASD pans, the scroll wheel zooms.

mod entities;
mod systems;

pub use entities::FogCamera;

use bevy::prelude::*;

use crate::GameState;

/// Per-plugin configuration for the camera rig.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct CameraConfig {
    /// Pan speed in world-units per second at the initial zoom.
    pub pan_speed: f32,
    /// Distance change per scroll line, as a fraction of the current distance.
    pub zoom_step: f32,
    /// Closest the camera may get to the surface.
    pub min_distance: f32,
    /// Extra room around the surface when framing it at startup.
    pub margin: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Key light illuminance in lux.
    pub light_illuminance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pan_speed: 12.0,
            zoom_step: 0.1,
            min_distance: 2.0,
            margin: 1.1,
            fov: std::f32::consts::FRAC_PI_4,
            light_illuminance: 8_000.0,
        }
    }
}

/// Top-down camera with WASD pan and scroll zoom.
pub struct CameraPlugin(pub CameraConfig);

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<FogCamera>()
            .register_type::<CameraConfig>()
            .insert_resource(self.0.clone())
            .add_systems(Startup, systems::spawn_camera)
            .add_systems(
                Update,
                (systems::pan, systems::zoom).run_if(in_state(GameState::Running)),
            );
    }
}
