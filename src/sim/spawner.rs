use bevy::prelude::*;
use rand::Rng;
use std::time::Duration;

use super::food::random_band_x;
use crate::config::FeedConfig;
use crate::shared::*;

/// Last-spawn bookkeeping. `None` means "eligible immediately", which is
/// both the starting state and the state after every eat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnTimer {
    last_spawn: Option<Duration>,
}

impl SpawnTimer {
    pub fn last_spawn(&self) -> Option<Duration> {
        self.last_spawn
    }

    pub fn record(&mut self, now: Duration) {
        self.last_spawn = Some(now);
    }

    pub fn reset_eligible(&mut self) {
        self.last_spawn = None;
    }

    pub fn elapsed(&self, now: Duration) -> Option<Duration> {
        self.last_spawn.map(|last| now.saturating_sub(last))
    }
}

/// Base interval, halved while the scene is less than half full.
pub fn required_interval(live: usize, config: &FeedConfig) -> Duration {
    let base = config.spawn_interval();
    if live * 2 < config.max_items {
        base / 2
    } else {
        base
    }
}

pub fn should_spawn(live: usize, timer: &SpawnTimer, now: Duration, config: &FeedConfig) -> bool {
    if live >= config.max_items {
        return false;
    }
    match timer.elapsed(now) {
        None => true,
        Some(elapsed) => elapsed >= required_interval(live, config),
    }
}

/// Rolls a fresh item above the top edge.
pub fn roll_food<R: Rng + ?Sized>(id: FoodId, config: &FeedConfig, rng: &mut R) -> FoodEntity {
    let kind = FoodKind::ALL[rng.gen_range(0..FoodKind::ALL.len())];
    let position = Vec2::new(random_band_x(config, rng), config.spawn_height);
    let mut food = FoodEntity::new(id, kind, position, config.fall_speed);
    food.rotation = rng.gen_range(0.0..360.0);
    food.rotation_speed = (rng.gen::<f32>() - 0.5) * 2.0;
    food
}
