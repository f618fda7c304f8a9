use bevy::prelude::*;

/// Marker component for the camera looking at the fog surface.
#[derive(Component, Reflect)]
pub struct FogCamera;
