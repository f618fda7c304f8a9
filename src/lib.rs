#![warn(missing_docs)]
//! Fog-of-war surface built from a hexagon-split triangle lattice.
//!
//! The lattice is cut into square quadrant meshes; a vertex color index lets a
//! single logical vertex be recolored across every quadrant that shares it.

pub mod camera;
pub mod error;
pub mod fog;
pub mod math;

use bevy::prelude::*;

/// Application-wide state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum GameState {
    /// Normal viewing: camera controls and vertex highlighting.
    #[default]
    Running,
    /// Debug overlays and the world inspector (Tab to toggle).
    Debugging,
}
