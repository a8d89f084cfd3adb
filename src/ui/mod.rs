mod mute_badge;
mod start_screen;

use bevy::prelude::*;
use crate::shared::*;

pub use mute_badge::{MuteBadge, MuteBadgeLabel};
pub use start_screen::StartScreenRoot;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioSettings>()
            .add_event::<UnlockAudioEvent>();

        // ─── START SCREEN ───
        app.add_systems(OnEnter(GameState::StartScreen), start_screen::spawn_start_screen);
        app.add_systems(OnExit(GameState::StartScreen), start_screen::despawn_start_screen);
        app.add_systems(
            Update,
            start_screen::start_screen_input.run_if(in_state(GameState::StartScreen)),
        );

        // ─── MUTE BADGE — visible during Playing ───
        app.add_systems(OnEnter(GameState::Playing), mute_badge::spawn_mute_badge);
        app.add_systems(OnExit(GameState::Playing), mute_badge::despawn_mute_badge);
        app.add_systems(
            Update,
            (mute_badge::click_mute_badge, mute_badge::update_mute_badge)
                .chain()
                .run_if(in_state(GameState::Playing)),
        );
    }
}
