//! The feeder simulation core.
//!
//! Everything the game loop mutates lives in one explicit
//! [`SimulationContext`]: the live food, the spawn timer, the bird's mood,
//! the latest mouth position and the queue of pending pointer/timer
//! commands. A tick takes the context, the current time and an RNG and
//! returns a [`FrameReport`] describing what happened, so the loop can be
//! driven and inspected without a window, GPU or Bevy schedule.

use bevy::prelude::*;
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

mod drag;
mod food;
mod mood;
mod proximity;
mod spawner;
mod tick;

pub use food::random_band_x;
pub use mood::MoodMachine;
pub use proximity::{classify, distance, release_eats, within, Proximity};
pub use spawner::{required_interval, roll_food, should_spawn, SpawnTimer};

use crate::config::FeedConfig;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// ERRORS & REPORTS
// ═══════════════════════════════════════════════════════════════════════

/// Faults raised while applying a frame. They are collected into the
/// report and logged by the frame loop; none of them stop the loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("non-finite pointer position ({x}, {y}) for food {id}")]
    NonFinitePosition { id: FoodId, x: f32, y: f32 },
    #[error("food {id} is not being dragged")]
    NotDragging { id: FoodId },
    #[error("food {id} is already being dragged")]
    AlreadyDragging { id: FoodId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EatCause {
    /// Released within the widened eat radius.
    Release,
    /// Held inside the mouth radius while still dragging.
    AutoEat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Spawned { id: FoodId, kind: FoodKind, position: Vec2 },
    Recycled { id: FoodId },
    DragStarted { id: FoodId },
    Dropped { id: FoodId, position: Vec2 },
    Eaten { id: FoodId, kind: FoodKind, position: Vec2, cause: EatCause },
    MoodChanged { from: Mood, to: Mood },
    PlaySound(SoundId),
    UnlockAudio,
    SparkleBurst { position: Vec2 },
}

/// Everything one tick produced, in the order it happened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub events: Vec<SimEvent>,
    pub faults: Vec<SimError>,
    /// Some dragged item sat inside the anticipation radius this frame.
    pub nearby: bool,
}

impl FrameReport {
    pub fn eaten(&self) -> Vec<FoodId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SimEvent::Eaten { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn spawned(&self) -> Vec<FoodId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SimEvent::Spawned { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn sounds(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SimEvent::PlaySound(_)))
            .count()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SIMULATION CONTEXT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone)]
pub struct SimulationContext {
    config: FeedConfig,
    items: Vec<FoodEntity>,
    next_id: u64,
    spawn_timer: SpawnTimer,
    mood: MoodMachine,
    target: Option<Vec2>,
    reduced_motion: bool,
    queue: VecDeque<FeedCommand>,
    running: bool,
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::new(FeedConfig::default())
    }
}

impl SimulationContext {
    /// A stopped context with no food. Call [`SimulationContext::start`]
    /// before ticking.
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            items: Vec::new(),
            next_id: 0,
            spawn_timer: SpawnTimer::default(),
            mood: MoodMachine::default(),
            target: None,
            reduced_motion: false,
            queue: VecDeque::new(),
            running: false,
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn items(&self) -> &[FoodEntity] {
        &self.items
    }

    pub fn get(&self, id: FoodId) -> Option<&FoodEntity> {
        self.items.iter().find(|f| f.id == id)
    }

    pub fn live_count(&self) -> usize {
        self.items.len()
    }

    pub fn mood(&self) -> Mood {
        self.mood.mood()
    }

    pub fn mood_machine(&self) -> &MoodMachine {
        &self.mood
    }

    pub fn spawn_timer(&self) -> SpawnTimer {
        self.spawn_timer
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<Vec2>) {
        self.target = target;
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    /// Queues an intent for the next tick. Rejected once shut down.
    pub fn enqueue(&mut self, command: FeedCommand) -> bool {
        if !self.running {
            return false;
        }
        self.queue.push_back(command);
        true
    }

    /// Places a falling item at `position` outside the spawn cadence.
    pub fn insert_food(&mut self, kind: FoodKind, position: Vec2) -> FoodId {
        let id = self.allocate_id();
        self.items
            .push(FoodEntity::new(id, kind, position, self.config.fall_speed));
        id
    }

    /// Topmost non-dragged item whose centre lies within `radius` of `point`.
    pub fn pick_food(&self, point: Vec2, radius: f32) -> Option<FoodId> {
        self.items
            .iter()
            .rev()
            .filter(|f| !f.is_dragging())
            .map(|f| (f.id, distance(f.position, point)))
            .filter(|(_, d)| *d < radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn allocate_id(&mut self) -> FoodId {
        let id = FoodId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Rolls a new item and records the spawn time.
    fn spawn_food<R: rand::Rng + ?Sized>(
        &mut self,
        now: Duration,
        rng: &mut R,
        report: &mut FrameReport,
    ) -> FoodId {
        let id = self.allocate_id();
        let food = roll_food(id, &self.config, rng);
        report.events.push(SimEvent::Spawned {
            id,
            kind: food.kind,
            position: food.position,
        });
        self.items.push(food);
        self.spawn_timer.record(now);
        id
    }

    /// The eat handler. Removes `id` if it is still live and fires every
    /// eat side effect exactly once; a second call for the same id is a
    /// no-op returning `false`.
    fn consume(
        &mut self,
        id: FoodId,
        at: Vec2,
        now: Duration,
        cause: EatCause,
        report: &mut FrameReport,
    ) -> bool {
        let Some(index) = self.items.iter().position(|f| f.id == id) else {
            debug!("[Feeder] Food {} already gone, skipping eat", id);
            return false;
        };
        let food = self.items.remove(index);

        self.spawn_timer.reset_eligible();
        let previous = self.mood.on_eat(now, self.config.happy_duration());

        report.events.push(SimEvent::Eaten {
            id,
            kind: food.kind,
            position: at,
            cause,
        });
        report.events.push(SimEvent::PlaySound(SoundId::Quack));
        if previous != Mood::Happy {
            report.events.push(SimEvent::MoodChanged {
                from: previous,
                to: Mood::Happy,
            });
        }
        if !self.reduced_motion {
            report.events.push(SimEvent::SparkleBurst { position: at });
        }
        true
    }
}
