//! Audio domain — procedural sound cues.
//!
//! Playback stays locked until the first user interaction (start screen
//! tap or first pickup) and is skipped entirely while muted. Cues are built
//! from short sine tones, so no audio files ship with the game.

use bevy::audio::{Pitch, Volume};
use bevy::prelude::*;
use std::time::Duration;

use crate::feeder::FeederTick;
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    pub duration: Duration,
    pub volume: f32,
}

const QUACK: [Tone; 2] = [
    Tone {
        frequency: 200.0,
        duration: Duration::from_millis(200),
        volume: 0.3,
    },
    Tone {
        frequency: 400.0,
        duration: Duration::from_millis(120),
        volume: 0.15,
    },
];

/// The layered tones that make up a cue. They start together.
pub fn sfx_tones(sound: SoundId) -> &'static [Tone] {
    match sound {
        SoundId::Quack => &QUACK,
    }
}

pub struct SoundPlugin;

impl Plugin for SoundPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioSettings>()
            .add_event::<PlaySfxEvent>()
            .add_event::<UnlockAudioEvent>()
            .add_systems(
                Update,
                (toggle_mute, handle_unlock_audio, handle_play_sfx)
                    .chain()
                    .after(FeederTick),
            );
    }
}

pub fn handle_unlock_audio(
    mut events: EventReader<UnlockAudioEvent>,
    mut settings: ResMut<AudioSettings>,
) {
    if events.read().count() == 0 || settings.unlocked {
        return;
    }
    settings.unlocked = true;
    info!("[Audio] Unlocked");
}

/// Listen for PlaySfxEvent and spawn one-shot tone players that auto-despawn.
pub fn handle_play_sfx(
    mut events: EventReader<PlaySfxEvent>,
    mut commands: Commands,
    settings: Res<AudioSettings>,
    mut pitches: ResMut<Assets<Pitch>>,
) {
    for event in events.read() {
        if !settings.can_play() {
            debug!(
                "[Audio] Skipping {:?} (muted={}, unlocked={})",
                event.sound, settings.muted, settings.unlocked
            );
            continue;
        }
        for tone in sfx_tones(event.sound) {
            commands.spawn((
                AudioPlayer(pitches.add(Pitch::new(tone.frequency, tone.duration))),
                PlaybackSettings::DESPAWN.with_volume(Volume::new(tone.volume)),
            ));
        }
    }
}

pub fn toggle_mute(keys: Res<ButtonInput<KeyCode>>, mut settings: ResMut<AudioSettings>) {
    if keys.just_pressed(KeyCode::KeyM) {
        settings.muted = !settings.muted;
        info!("[Audio] {}", if settings.muted { "Muted" } else { "Unmuted" });
    }
}
