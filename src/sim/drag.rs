use bevy::prelude::*;
use rand::Rng;
use std::time::Duration;

use super::{release_eats, EatCause, FrameReport, SimError, SimEvent, SimulationContext};
use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Drag controller
//
// Pointer intents are applied here, one at a time, at the start of a tick.
// Commands naming an id that is no longer live (eaten by another path) are
// silent no-ops. A cancelled drag is always a plain drop, never an eat.
// ─────────────────────────────────────────────────────────────────────────────

fn finite_point(id: FoodId, x: f32, y: f32) -> Result<Vec2, SimError> {
    if x.is_finite() && y.is_finite() {
        Ok(Vec2::new(x, y))
    } else {
        Err(SimError::NonFinitePosition { id, x, y })
    }
}

impl SimulationContext {
    pub(super) fn apply_command<R: Rng + ?Sized>(
        &mut self,
        command: FeedCommand,
        now: Duration,
        rng: &mut R,
        report: &mut FrameReport,
    ) -> Result<(), SimError> {
        match command {
            FeedCommand::StartDrag { id } => self.start_drag(id, report),
            FeedCommand::MoveDrag { id, x, y } => {
                let point = finite_point(id, x, y)?;
                self.move_drag(id, point)
            }
            FeedCommand::EndDrag { id, x, y } => {
                let point = finite_point(id, x, y)?;
                self.end_drag(id, point, now, rng, report)
            }
            FeedCommand::CancelDrag { id } => self.cancel_drag(id, report),
            FeedCommand::MoodDeferredReset { generation } => {
                let from = self.mood.mood();
                if self.mood.deferred_reset(generation) {
                    report.events.push(SimEvent::MoodChanged {
                        from,
                        to: self.mood.mood(),
                    });
                }
                Ok(())
            }
        }
    }

    fn food_mut(&mut self, id: FoodId) -> Option<&mut FoodEntity> {
        self.items.iter_mut().find(|f| f.id == id)
    }

    fn start_drag(&mut self, id: FoodId, report: &mut FrameReport) -> Result<(), SimError> {
        let Some(food) = self.food_mut(id) else {
            return Ok(());
        };
        food.start_drag()?;
        report.events.push(SimEvent::UnlockAudio);
        report.events.push(SimEvent::DragStarted { id });
        Ok(())
    }

    fn move_drag(&mut self, id: FoodId, point: Vec2) -> Result<(), SimError> {
        match self.food_mut(id) {
            Some(food) => food.drag_to(point),
            None => Ok(()),
        }
    }

    fn end_drag<R: Rng + ?Sized>(
        &mut self,
        id: FoodId,
        point: Vec2,
        now: Duration,
        rng: &mut R,
        report: &mut FrameReport,
    ) -> Result<(), SimError> {
        let Some(food) = self.get(id) else {
            return Ok(());
        };
        if !food.is_dragging() {
            return Err(SimError::NotDragging { id });
        }

        let eats = self
            .target
            .is_some_and(|target| release_eats(point, target, &self.config));
        if eats {
            if self.consume(id, point, now, EatCause::Release, report)
                && self.items.len() < self.config.max_items
            {
                // Replace right away rather than waiting for the spawn pass.
                self.spawn_food(now, rng, report);
            }
            return Ok(());
        }

        self.drop_food(id, report)
    }

    fn cancel_drag(&mut self, id: FoodId, report: &mut FrameReport) -> Result<(), SimError> {
        match self.get(id) {
            Some(food) if food.is_dragging() => self.drop_food(id, report),
            Some(_) => Err(SimError::NotDragging { id }),
            None => Ok(()),
        }
    }

    fn drop_food(&mut self, id: FoodId, report: &mut FrameReport) -> Result<(), SimError> {
        let fall_speed = self.config.fall_speed;
        let Some(food) = self.food_mut(id) else {
            return Ok(());
        };
        food.release(fall_speed)?;
        let position = food.position;
        report.events.push(SimEvent::Dropped { id, position });

        if self.mood.on_drop() {
            report.events.push(SimEvent::MoodChanged {
                from: Mood::Anticipation,
                to: Mood::Idle,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const MOUTH: Vec2 = Vec2::new(50.0, 20.0);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn running_context() -> SimulationContext {
        let mut sim = SimulationContext::new(FeedConfig::default());
        sim.set_target(Some(MOUTH));
        sim.start();
        sim
    }

    fn apply(sim: &mut SimulationContext, command: FeedCommand) -> (FrameReport, Result<(), SimError>) {
        let mut rng = StdRng::seed_from_u64(11);
        let mut report = FrameReport::default();
        let result = sim.apply_command(command, ms(5_000), &mut rng, &mut report);
        (report, result)
    }

    #[test]
    fn start_drag_unlocks_audio_and_flags_dragging() {
        let mut sim = running_context();
        let id = sim.insert_food(FoodKind::Cookie, Vec2::new(30.0, 30.0));
        let (report, result) = apply(&mut sim, FeedCommand::StartDrag { id });
        assert!(result.is_ok());
        assert!(sim.get(id).unwrap().is_dragging());
        assert_eq!(report.events[0], SimEvent::UnlockAudio);
    }

    #[test]
    fn move_overwrites_position() {
        let mut sim = running_context();
        let id = sim.insert_food(FoodKind::Cookie, Vec2::new(30.0, 30.0));
        apply(&mut sim, FeedCommand::StartDrag { id });
        apply(&mut sim, FeedCommand::MoveDrag { id, x: 61.0, y: 42.5 });
        assert_eq!(sim.get(id).unwrap().position, Vec2::new(61.0, 42.5));
    }

    #[test]
    fn release_near_mouth_eats_and_replaces() {
        let mut sim = running_context();
        let id = sim.insert_food(FoodKind::Banana, Vec2::new(30.0, 30.0));
        apply(&mut sim, FeedCommand::StartDrag { id });
        let (report, result) = apply(&mut sim, FeedCommand::EndDrag { id, x: 55.0, y: 25.0 });

        assert!(result.is_ok());
        assert!(sim.get(id).is_none());
        assert_eq!(report.eaten(), vec![id]);
        assert_eq!(report.sounds(), 1);
        assert_eq!(report.spawned().len(), 1, "replacement spawns immediately");
        assert_eq!(sim.live_count(), 1);
        assert_eq!(sim.mood(), Mood::Happy);
        assert_eq!(sim.spawn_timer().last_spawn(), Some(ms(5_000)));
    }

    #[test]
    fn release_eat_at_capacity_skips_replacement() {
        let mut sim = running_context();
        let max = sim.config().max_items;
        let id = sim.insert_food(FoodKind::Banana, Vec2::new(30.0, 30.0));
        for _ in 1..=max {
            // One over the limit so capacity is still full after the eat.
            sim.insert_food(FoodKind::Apple, Vec2::new(20.0, 5.0));
        }
        apply(&mut sim, FeedCommand::StartDrag { id });
        let (report, _) = apply(&mut sim, FeedCommand::EndDrag { id, x: 50.0, y: 20.0 });
        assert!(report.spawned().is_empty());
        assert_eq!(sim.live_count(), max);
    }

    #[test]
    fn release_far_from_mouth_drops_in_place() {
        let mut sim = running_context();
        let id = sim.insert_food(FoodKind::Carrot, Vec2::new(30.0, 30.0));
        apply(&mut sim, FeedCommand::StartDrag { id });
        apply(&mut sim, FeedCommand::MoveDrag { id, x: 80.0, y: 70.0 });
        sim.mood.apply_proximity(true);

        let (report, result) = apply(&mut sim, FeedCommand::EndDrag { id, x: 80.0, y: 70.0 });
        assert!(result.is_ok());
        let food = sim.get(id).unwrap();
        assert_eq!(food.lifecycle, Lifecycle::Falling);
        assert!(!food.is_dragging());
        assert_eq!(food.position, Vec2::new(80.0, 70.0));
        assert_eq!(food.velocity, sim.config().fall_speed);
        assert_eq!(sim.mood(), Mood::Idle);
        assert!(report.eaten().is_empty());
    }

    #[test]
    fn release_without_known_mouth_never_eats() {
        let mut sim = running_context();
        sim.set_target(None);
        let id = sim.insert_food(FoodKind::Carrot, MOUTH);
        apply(&mut sim, FeedCommand::StartDrag { id });
        let (report, _) = apply(&mut sim, FeedCommand::EndDrag { id, x: 50.0, y: 20.0 });
        assert!(report.eaten().is_empty());
        assert!(sim.get(id).is_some());
    }

    #[test]
    fn cancel_on_the_mouth_is_still_a_drop() {
        let mut sim = running_context();
        let id = sim.insert_food(FoodKind::Strawberry, Vec2::new(30.0, 30.0));
        apply(&mut sim, FeedCommand::StartDrag { id });
        apply(&mut sim, FeedCommand::MoveDrag { id, x: 50.0, y: 20.0 });
        let (report, result) = apply(&mut sim, FeedCommand::CancelDrag { id });

        assert!(result.is_ok());
        assert!(report.eaten().is_empty());
        let food = sim.get(id).unwrap();
        assert!(!food.is_dragging());
        assert_eq!(food.position, MOUTH);
    }

    #[test]
    fn commands_for_eaten_food_are_silent() {
        let mut sim = running_context();
        let gone = FoodId(999);
        for command in [
            FeedCommand::StartDrag { id: gone },
            FeedCommand::MoveDrag { id: gone, x: 1.0, y: 1.0 },
            FeedCommand::EndDrag { id: gone, x: 50.0, y: 20.0 },
            FeedCommand::CancelDrag { id: gone },
        ] {
            let (report, result) = apply(&mut sim, command);
            assert!(result.is_ok());
            assert!(report.events.is_empty());
        }
    }

    #[test]
    fn non_finite_pointer_is_a_fault() {
        let mut sim = running_context();
        let id = sim.insert_food(FoodKind::Apple, Vec2::new(30.0, 30.0));
        apply(&mut sim, FeedCommand::StartDrag { id });
        let (_, result) = apply(&mut sim, FeedCommand::MoveDrag { id, x: f32::NAN, y: 3.0 });
        assert!(matches!(result, Err(SimError::NonFinitePosition { .. })));
        assert_eq!(sim.get(id).unwrap().position, Vec2::new(30.0, 30.0));
    }

    #[test]
    fn ending_a_drag_that_never_started_is_a_fault() {
        let mut sim = running_context();
        let id = sim.insert_food(FoodKind::Apple, MOUTH);
        let (report, result) = apply(&mut sim, FeedCommand::EndDrag { id, x: 50.0, y: 20.0 });
        assert_eq!(result, Err(SimError::NotDragging { id }));
        assert!(report.eaten().is_empty());
    }

    #[test]
    fn pick_prefers_closest_and_skips_dragged() {
        let mut sim = running_context();
        let far = sim.insert_food(FoodKind::Apple, Vec2::new(40.0, 40.0));
        let near = sim.insert_food(FoodKind::Apple, Vec2::new(44.0, 40.0));
        assert_eq!(sim.pick_food(Vec2::new(45.0, 40.0), 7.0), Some(near));

        apply(&mut sim, FeedCommand::StartDrag { id: near });
        assert_eq!(sim.pick_food(Vec2::new(45.0, 40.0), 7.0), Some(far));
        assert_eq!(sim.pick_food(Vec2::new(90.0, 90.0), 7.0), None);
    }
}
