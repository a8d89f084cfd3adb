//! Shared components, resources, events, and states for the feeder.
//!
//! This is the type contract. The simulation core and every collaborator
//! plugin (pointer input, scene, audio, ui) import from here.
//! Collaborators may also reach the core (`sim`, `feeder`), never each other.

use bevy::prelude::*;
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    StartScreen,
    Playing,
}

// ═══════════════════════════════════════════════════════════════════════
// FOOD
// ═══════════════════════════════════════════════════════════════════════

/// Identity key of a live food item. Assigned monotonically, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FoodId(pub u64);

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The snack catalogue. Purely cosmetic: every kind behaves the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodKind {
    Strawberry,
    Banana,
    Cookie,
    Carrot,
    Apple,
}

impl FoodKind {
    pub const ALL: [FoodKind; 5] = [
        FoodKind::Strawberry,
        FoodKind::Banana,
        FoodKind::Cookie,
        FoodKind::Carrot,
        FoodKind::Apple,
    ];

    pub fn color(self) -> Color {
        match self {
            FoodKind::Strawberry => Color::srgb_u8(0xFF, 0x6B, 0x9D),
            FoodKind::Banana => Color::srgb_u8(0xFF, 0xE6, 0x6D),
            FoodKind::Cookie => Color::srgb_u8(0xD4, 0xA5, 0x74),
            FoodKind::Carrot => Color::srgb_u8(0xFF, 0x8C, 0x42),
            FoodKind::Apple => Color::srgb_u8(0xFF, 0x6B, 0x6B),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FoodKind::Strawberry => "strawberry",
            FoodKind::Banana => "banana",
            FoodKind::Cookie => "cookie",
            FoodKind::Carrot => "carrot",
            FoodKind::Apple => "apple",
        }
    }
}

/// Exactly one of these holds for every live food item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Falling,
    Dragging,
}

/// A single falling/draggable snack.
///
/// Positions are in percent of the viewport (x in vw, y in vh), y grows
/// downward. `velocity` is vh per tick and only applies while falling.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodEntity {
    pub id: FoodId,
    pub kind: FoodKind,
    pub position: Vec2,
    pub velocity: f32,
    pub rotation: f32,       // degrees
    pub rotation_speed: f32, // degrees per tick
    pub lifecycle: Lifecycle,
}

impl FoodEntity {
    pub fn is_dragging(&self) -> bool {
        self.lifecycle == Lifecycle::Dragging
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MOOD
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mood {
    #[default]
    Idle,
    Anticipation,
    Happy,
}

// ═══════════════════════════════════════════════════════════════════════
// COMMANDS — the single input queue into the simulation
// ═══════════════════════════════════════════════════════════════════════

/// Intents queued by pointer input and deferred timers. The tick applies
/// them in received order before the frame's physics step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedCommand {
    StartDrag { id: FoodId },
    MoveDrag { id: FoodId, x: f32, y: f32 },
    EndDrag { id: FoodId, x: f32, y: f32 },
    CancelDrag { id: FoodId },
    MoodDeferredReset { generation: u64 },
}

// ═══════════════════════════════════════════════════════════════════════
// AUDIO
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundId {
    /// The bird's reaction to every eat.
    Quack,
}

/// Playback gate shared by the audio domain and the mute badge.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioSettings {
    pub muted: bool,
    /// Set by the first user interaction.
    pub unlocked: bool,
}

impl AudioSettings {
    pub fn can_play(&self) -> bool {
        self.unlocked && !self.muted
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES — external inputs to the core
// ═══════════════════════════════════════════════════════════════════════

/// Latest mouth position in viewport percent, published by the scene.
/// `None` until the bird has been laid out at least once.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct MouthTarget(pub Option<Vec2>);

/// Whether decorative particle effects should be suppressed.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionPreference {
    pub reduced: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — core outputs forwarded to collaborators
// ═══════════════════════════════════════════════════════════════════════

/// One item was eaten. The scene answers with the bird's gulp.
#[derive(Event, Debug, Clone)]
pub struct FoodEatenEvent {
    pub id: FoodId,
    pub kind: FoodKind,
    pub position: Vec2,
}

#[derive(Event, Debug, Clone)]
pub struct PlaySfxEvent {
    pub sound: SoundId,
}

/// First user interaction; the audio collaborator unlocks on it.
#[derive(Event, Debug, Clone, Default)]
pub struct UnlockAudioEvent;

#[derive(Event, Debug, Clone)]
pub struct SparkleBurstEvent {
    pub position: Vec2,
}

// ═══════════════════════════════════════════════════════════════════════
// VIEWPORT HELPERS
// ═══════════════════════════════════════════════════════════════════════

pub const SCREEN_WIDTH: f32 = 540.0;
pub const SCREEN_HEIGHT: f32 = 900.0;

/// Window-space logical pixels (origin top-left) to viewport percent.
pub fn screen_to_percent(screen: Vec2, window_size: Vec2) -> Vec2 {
    if window_size.x <= 0.0 || window_size.y <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        screen.x / window_size.x * 100.0,
        screen.y / window_size.y * 100.0,
    )
}

/// Viewport percent to 2D world space (default camera: origin centre, y up).
pub fn percent_to_world(percent: Vec2, window_size: Vec2) -> Vec2 {
    Vec2::new(
        percent.x / 100.0 * window_size.x - window_size.x / 2.0,
        window_size.y / 2.0 - percent.y / 100.0 * window_size.y,
    )
}
