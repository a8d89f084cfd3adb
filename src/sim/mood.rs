use std::time::Duration;

use crate::shared::Mood;

// ─────────────────────────────────────────────────────────────────────────────
// Mood state machine
//
//   Idle ──nearby──▶ Anticipation ──not nearby / drop──▶ Idle
//   any ──eat──▶ Happy ──deferred reset (latest eat only)──▶ Idle
//
// Every eat schedules exactly one deferred reset tagged with a generation.
// Only the reset carrying the current generation changes the mood, so a
// second eat during the happy window extends it instead of being cut short.
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingReset {
    due: Duration,
    generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MoodMachine {
    mood: Mood,
    generation: u64,
    pending: Vec<PendingReset>,
}

impl MoodMachine {
    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_resets(&self) -> usize {
        self.pending.len()
    }

    /// Goes Happy immediately and schedules the return to Idle.
    /// Returns the mood before the eat.
    pub fn on_eat(&mut self, now: Duration, happy_for: Duration) -> Mood {
        let previous = self.mood;
        self.mood = Mood::Happy;
        self.generation += 1;
        self.pending.push(PendingReset {
            due: now + happy_for,
            generation: self.generation,
        });
        previous
    }

    /// Removes and returns the generations of every reset due by `now`,
    /// oldest first.
    pub fn take_due(&mut self, now: Duration) -> Vec<u64> {
        let mut due: Vec<PendingReset> = Vec::new();
        self.pending.retain(|reset| {
            if reset.due <= now {
                due.push(*reset);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|reset| (reset.due, reset.generation));
        due.into_iter().map(|reset| reset.generation).collect()
    }

    /// Applies a fired reset. Stale generations are no-ops.
    pub fn deferred_reset(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.mood != Mood::Happy {
            return false;
        }
        self.mood = Mood::Idle;
        true
    }

    /// Proximity rules; never touch Happy. Returns the transition, if any.
    pub fn apply_proximity(&mut self, nearby: bool) -> Option<(Mood, Mood)> {
        let next = match (self.mood, nearby) {
            (Mood::Happy, _) => return None,
            (Mood::Idle, true) => Mood::Anticipation,
            (Mood::Anticipation, false) => Mood::Idle,
            _ => return None,
        };
        let previous = self.mood;
        self.mood = next;
        Some((previous, next))
    }

    /// A drop away from the mouth calms an anticipating bird.
    pub fn on_drop(&mut self) -> bool {
        if self.mood == Mood::Anticipation {
            self.mood = Mood::Idle;
            true
        } else {
            false
        }
    }
}
