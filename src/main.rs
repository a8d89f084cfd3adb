mod audio;
mod config;
mod feeder;
mod pointer;
mod scene;
mod shared;
mod sim;
mod ui;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Ostrich Feeder".into(),
                resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                present_mode: PresentMode::AutoVsync,
                resizable: true,
                // Let the page own the canvas size on web.
                fit_canvas_to_parent: true,
                prevent_default_event_handling: true,
                ..default()
            }),
            ..default()
        }))
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<MouthTarget>()
        .init_resource::<MotionPreference>()
        .init_resource::<AudioSettings>()
        // Domain plugins
        .add_plugins(feeder::FeederPlugin)
        .add_plugins(pointer::PointerPlugin)
        .add_plugins(scene::ScenePlugin)
        .add_plugins(audio::SoundPlugin)
        .add_plugins(ui::UiPlugin)
        // Config loading
        .add_plugins(config::ConfigPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
