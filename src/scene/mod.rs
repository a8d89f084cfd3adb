//! Scene domain — the renderer and the mouth-position provider.
//!
//! Reads the simulation's food list and mood each frame and mirrors them
//! onto 2D meshes. Owns the bird's layout, so it is also the one place that
//! publishes [`MouthTarget`] (on startup and on every window resize).

mod bird;
mod food;
mod motion;

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::feeder::FeederTick;
use crate::shared::*;

pub use bird::{Bird, BirdBeak, BirdEye, BirdHead, BlinkTimer, Gulp};
pub use food::{drawn_percent, FoodMeshes, FoodSprite, Sparkle};
pub use motion::detect_motion_preference;

pub const SKY_COLOR: Color = Color::srgb(0.68, 0.86, 0.95);
pub const GROUND_COLOR: Color = Color::srgb(0.56, 0.78, 0.45);

/// Share of the window height the bird occupies.
pub const BIRD_HEIGHT_FRACTION: f32 = 0.42;
/// Gap between the bird's feet and the bottom edge, as a share of height.
pub const BIRD_BOTTOM_MARGIN: f32 = 0.04;
/// Width over height of the bird's drawing box.
pub const BIRD_ASPECT: f32 = 200.0 / 280.0;
/// The mouth sits this far down from the top of the bird's box.
pub const MOUTH_DEPTH: f32 = 0.08;

/// Where the bird's box lands in window pixels (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirdLayout {
    pub center_x: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BirdLayout {
    pub fn for_window(size: Vec2) -> Self {
        let mut height = size.y * BIRD_HEIGHT_FRACTION;
        let mut width = height * BIRD_ASPECT;
        // Narrow portrait windows: fit the width instead.
        let max_width = size.x * 0.9;
        if width > max_width {
            width = max_width;
            height = width / BIRD_ASPECT;
        }
        let bottom = size.y * (1.0 - BIRD_BOTTOM_MARGIN);
        Self {
            center_x: size.x / 2.0,
            top: bottom - height,
            width,
            height,
        }
    }

    pub fn mouth_screen(&self) -> Vec2 {
        Vec2::new(self.center_x, self.top + self.height * MOUTH_DEPTH)
    }

    /// Centre of the box in window pixels.
    pub fn center_screen(&self) -> Vec2 {
        Vec2::new(self.center_x, self.top + self.height / 2.0)
    }
}

/// Mouth position in viewport percent, `None` for a collapsed window.
pub fn mouth_percent(window_size: Vec2) -> Option<Vec2> {
    if window_size.x <= 0.0 || window_size.y <= 0.0 {
        return None;
    }
    let layout = BirdLayout::for_window(window_size);
    Some(screen_to_percent(layout.mouth_screen(), window_size))
}

#[derive(Component)]
pub struct Ground;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(SKY_COLOR))
            .init_resource::<FoodMeshes>()
            .add_systems(
                Startup,
                (
                    detect_motion_preference,
                    spawn_ground,
                    bird::spawn_bird,
                ),
            )
            .add_systems(
                Update,
                (
                    apply_layout,
                    bird::start_gulp,
                    bird::pose_bird,
                    bird::blink_eyes,
                    food::sync_food_visuals.run_if(in_state(GameState::Playing)),
                    food::spawn_sparkles,
                    food::animate_sparkles,
                )
                    .chain()
                    .after(FeederTick),
            )
            .add_systems(OnExit(GameState::Playing), food::despawn_food_visuals);
    }
}

fn spawn_ground(mut commands: Commands) {
    commands.spawn((
        Ground,
        Sprite::from_color(GROUND_COLOR, Vec2::ONE),
        Transform::from_xyz(0.0, 0.0, -10.0),
    ));
}

/// Re-lays out the bird and ground and republishes the mouth position.
/// Runs on every resize, and until a first position has been published.
fn apply_layout(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut resized: EventReader<WindowResized>,
    mut mouth: ResMut<MouthTarget>,
    mut birds: Query<&mut Transform, (With<Bird>, Without<Ground>)>,
    mut grounds: Query<&mut Transform, (With<Ground>, Without<Bird>)>,
) {
    let resized = resized.read().count() > 0;
    if !resized && mouth.0.is_some() {
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    let Some(target) = mouth_percent(size) else {
        return;
    };

    mouth.0 = Some(target);
    info!("[Scene] Mouth at ({:.1}%, {:.1}%)", target.x, target.y);

    let layout = BirdLayout::for_window(size);
    let center = percent_to_world(screen_to_percent(layout.center_screen(), size), size);
    for mut transform in &mut birds {
        transform.translation = center.extend(0.0);
        transform.scale = Vec3::splat(layout.height / bird::BOX_HEIGHT);
    }

    let ground_height = size.y * 0.18;
    for mut transform in &mut grounds {
        transform.translation = Vec3::new(0.0, -size.y / 2.0 + ground_height / 2.0, -10.0);
        transform.scale = Vec3::new(size.x, ground_height, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouth_is_centred_near_the_top_of_the_bird() {
        let size = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        let mouth = mouth_percent(size).unwrap();
        assert!((mouth.x - 50.0).abs() < 1e-4);

        let layout = BirdLayout::for_window(size);
        let top_percent = layout.top / size.y * 100.0;
        let bottom_percent = (layout.top + layout.height) / size.y * 100.0;
        assert!(mouth.y > top_percent && mouth.y < bottom_percent);
        assert!(mouth.y > 0.0 && mouth.y < 100.0);
    }

    #[test]
    fn mouth_percent_is_scale_invariant() {
        let small = mouth_percent(Vec2::new(400.0, 800.0)).unwrap();
        let large = mouth_percent(Vec2::new(800.0, 1600.0)).unwrap();
        assert!((small - large).length() < 1e-3);
    }

    #[test]
    fn narrow_window_fits_bird_width() {
        let size = Vec2::new(200.0, 1000.0);
        let layout = BirdLayout::for_window(size);
        assert!(layout.width <= size.x * 0.9 + 1e-3);
        assert!((layout.width / layout.height - BIRD_ASPECT).abs() < 1e-4);
    }

    #[test]
    fn collapsed_window_publishes_nothing() {
        assert_eq!(mouth_percent(Vec2::new(0.0, 600.0)), None);
    }
}
