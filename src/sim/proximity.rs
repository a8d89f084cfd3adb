use bevy::prelude::*;

use crate::config::FeedConfig;

/// Euclidean distance in viewport-percent space.
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Strict radius test: a point exactly on the edge is outside.
pub fn within(a: Vec2, b: Vec2, radius: f32) -> bool {
    distance(a, b) < radius
}

/// How close a dragged item is to the mouth, innermost zone first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proximity {
    Far,
    Nearby,
    /// Inside the passive auto-eat radius (implies nearby).
    Mouth,
}

impl Proximity {
    pub fn is_nearby(self) -> bool {
        !matches!(self, Proximity::Far)
    }
}

pub fn classify(food: Vec2, target: Vec2, config: &FeedConfig) -> Proximity {
    let d = distance(food, target);
    if d < config.auto_eat_radius() {
        Proximity::Mouth
    } else if d < config.anticipation_radius {
        Proximity::Nearby
    } else {
        Proximity::Far
    }
}

/// Whether a release at `point` lands close enough to be eaten.
pub fn release_eats(point: Vec2, target: Vec2, config: &FeedConfig) -> bool {
    within(point, target, config.release_eat_radius())
}
