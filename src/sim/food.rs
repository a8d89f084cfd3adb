use bevy::prelude::*;
use rand::Rng;

use super::SimError;
use crate::config::FeedConfig;
use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Food lifecycle
// Falling items advance by their velocity every tick and wrap back to the top
// when they pass the recycle line. Dragged items only move when the pointer
// moves them; a drop puts them back to falling from wherever they were let go.
// ─────────────────────────────────────────────────────────────────────────────

/// Uniform x inside the safe horizontal band.
pub fn random_band_x<R: Rng + ?Sized>(config: &FeedConfig, rng: &mut R) -> f32 {
    let lo = config.spawn_margin;
    let hi = 100.0 - config.spawn_margin;
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

impl FoodEntity {
    pub fn new(id: FoodId, kind: FoodKind, position: Vec2, velocity: f32) -> Self {
        Self {
            id,
            kind,
            position,
            velocity,
            rotation: 0.0,
            rotation_speed: 0.0,
            lifecycle: Lifecycle::Falling,
        }
    }

    /// One falling step. Returns `true` when the item wrapped to the top.
    /// Dragged items are left untouched.
    pub fn advance<R: Rng + ?Sized>(&mut self, config: &FeedConfig, rng: &mut R) -> bool {
        if self.lifecycle != Lifecycle::Falling {
            return false;
        }

        let next_y = self.position.y + self.velocity;
        if next_y > config.recycle_line {
            self.position = Vec2::new(random_band_x(config, rng), config.spawn_height);
            self.rotation = rng.gen_range(0.0..360.0);
            return true;
        }

        self.position.y = next_y;
        self.rotation += self.rotation_speed;
        false
    }

    pub fn start_drag(&mut self) -> Result<(), SimError> {
        if self.is_dragging() {
            return Err(SimError::AlreadyDragging { id: self.id });
        }
        self.lifecycle = Lifecycle::Dragging;
        Ok(())
    }

    pub fn drag_to(&mut self, position: Vec2) -> Result<(), SimError> {
        if !self.is_dragging() {
            return Err(SimError::NotDragging { id: self.id });
        }
        self.position = position;
        Ok(())
    }

    /// Back to falling at nominal speed; the position is kept.
    pub fn release(&mut self, fall_speed: f32) -> Result<(), SimError> {
        if !self.is_dragging() {
            return Err(SimError::NotDragging { id: self.id });
        }
        self.lifecycle = Lifecycle::Falling;
        self.velocity = fall_speed;
        Ok(())
    }
}
