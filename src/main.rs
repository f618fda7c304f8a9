#![warn(missing_docs)]
//! Fog-of-war viewer.
//!
//! Renders the quadrant meshes of a hexagon-split triangle lattice. Arrow keys
//! walk a highlight through the vertices, clicks paint the vertex under the
//! cursor, Tab toggles the debug overlays.

#[cfg(feature = "native")]
mod cli;

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use hex_fog::GameState;
use hex_fog::camera::{CameraConfig, CameraPlugin};
use hex_fog::fog::{FogControlsPlugin, FogPlugin};

fn main() {
    #[cfg(feature = "native")]
    let config = {
        use clap::Parser;
        cli::Args::parse().into_config()
    };
    #[cfg(not(feature = "native"))]
    let config = hex_fog::fog::FogConfig::default();

    if let Err(err) = config.validate() {
        eprintln!("hex-fog: {err}");
        std::process::exit(2);
    }

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hex Fog".into(),
            ..default()
        }),
        ..default()
    }))
    .register_type::<GameState>()
    .init_state::<GameState>()
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(FogPlugin(config))
    .add_plugins(FogControlsPlugin)
    .add_plugins(CameraPlugin(CameraConfig::default()))
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(GameState::Debugging)));

    #[cfg(feature = "native")]
    {
        use bevy::remote::{RemotePlugin, http::RemoteHttpPlugin};
        app.add_plugins(RemotePlugin::default())
            .add_plugins(RemoteHttpPlugin::default());
    }

    app.run();
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        next.set(match state.get() {
            GameState::Running => GameState::Debugging,
            GameState::Debugging => GameState::Running,
        });
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
