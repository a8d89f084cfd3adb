use bevy::prelude::*;
use rand::Rng;
use std::time::Duration;

use super::{classify, should_spawn, EatCause, FrameReport, Proximity, SimEvent, SimulationContext};
use crate::shared::*;

impl SimulationContext {
    /// Starts the loop. Returns `false` if it was already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        info!("[Feeder] Frame loop started (max_items={})", self.config.max_items);
        true
    }

    /// Stops the loop and drops anything still queued. Safe to call any
    /// number of times; only the first call reports `true`.
    pub fn shutdown(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        let dropped = self.queue.len();
        self.queue.clear();
        info!(
            "[Feeder] Frame loop stopped ({} live items, {} queued commands dropped)",
            self.items.len(),
            dropped
        );
        true
    }

    /// Advances the simulation by one frame.
    ///
    /// Order: queued commands (including due mood resets), falling physics
    /// and proximity, passive eats, the spawner, then mood proximity rules.
    /// A fault in one command is recorded and the rest of the frame still
    /// runs. A stopped context returns an empty report.
    pub fn tick<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) -> FrameReport {
        let mut report = FrameReport::default();
        if !self.running {
            return report;
        }

        for generation in self.mood.take_due(now) {
            self.queue
                .push_back(FeedCommand::MoodDeferredReset { generation });
        }
        while let Some(command) = self.queue.pop_front() {
            if let Err(fault) = self.apply_command(command, now, rng, &mut report) {
                report.faults.push(fault);
            }
        }

        let mut auto_eat = Vec::new();
        for food in self.items.iter_mut() {
            if food.is_dragging() {
                let Some(target) = self.target else {
                    continue;
                };
                let zone = classify(food.position, target, &self.config);
                report.nearby |= zone.is_nearby();
                if zone == Proximity::Mouth && self.config.auto_eat_while_dragging {
                    auto_eat.push((food.id, food.position));
                }
            } else if food.advance(&self.config, rng) {
                report.events.push(SimEvent::Recycled { id: food.id });
            }
        }

        for (id, position) in auto_eat {
            self.consume(id, position, now, EatCause::AutoEat, &mut report);
        }

        if should_spawn(self.items.len(), &self.spawn_timer, now, &self.config) {
            self.spawn_food(now, rng, &mut report);
        }

        if let Some((from, to)) = self.mood.apply_proximity(report.nearby) {
            report.events.push(SimEvent::MoodChanged { from, to });
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;
    use crate::sim::SimError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const MOUTH: Vec2 = Vec2::new(50.0, 20.0);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn context(config: FeedConfig) -> SimulationContext {
        let mut sim = SimulationContext::new(config);
        sim.set_target(Some(MOUTH));
        sim.start();
        sim
    }

    fn drag_to(sim: &mut SimulationContext, id: FoodId, at: Vec2) {
        sim.enqueue(FeedCommand::StartDrag { id });
        sim.enqueue(FeedCommand::MoveDrag { id, x: at.x, y: at.y });
    }

    #[test]
    fn first_tick_spawns_immediately() {
        let mut sim = context(FeedConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        let report = sim.tick(ms(0), &mut rng);
        assert_eq!(report.spawned().len(), 1);
        assert_eq!(sim.live_count(), 1);
    }

    #[test]
    fn live_count_never_exceeds_max() {
        let mut sim = context(FeedConfig::default());
        let mut rng = StdRng::seed_from_u64(2);
        for frame in 0..20_000u64 {
            sim.tick(ms(frame * 16), &mut rng);
            assert!(sim.live_count() <= sim.config().max_items);
        }
        assert_eq!(sim.live_count(), sim.config().max_items);
    }

    #[test]
    fn sparse_scene_refills_at_half_interval() {
        let mut sim = context(FeedConfig::default());
        let mut rng = StdRng::seed_from_u64(3);
        sim.tick(ms(0), &mut rng);
        assert!(sim.tick(ms(999), &mut rng).spawned().is_empty());
        assert_eq!(sim.tick(ms(1_000), &mut rng).spawned().len(), 1);
    }

    #[test]
    fn falling_items_move_and_recycle() {
        let mut sim = context(FeedConfig {
            max_items: 1,
            ..FeedConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(4);
        let id = sim.insert_food(FoodKind::Apple, Vec2::new(40.0, 109.9));

        let report = sim.tick(ms(0), &mut rng);
        assert_eq!(report.events, vec![SimEvent::Recycled { id }]);
        let food = sim.get(id).unwrap();
        assert_eq!(food.position.y, sim.config().spawn_height);
        assert!(food.position.x >= 10.0 && food.position.x < 90.0);
    }

    #[test]
    fn dragging_near_mouth_anticipates_then_calms() {
        let mut sim = context(FeedConfig {
            max_items: 1,
            ..FeedConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(5);
        let id = sim.insert_food(FoodKind::Cookie, Vec2::new(20.0, 60.0));

        drag_to(&mut sim, id, Vec2::new(50.0, 30.0));
        let report = sim.tick(ms(0), &mut rng);
        assert!(report.nearby);
        assert_eq!(sim.mood(), Mood::Anticipation);
        assert!(report.events.contains(&SimEvent::MoodChanged {
            from: Mood::Idle,
            to: Mood::Anticipation,
        }));

        sim.enqueue(FeedCommand::MoveDrag { id, x: 50.0, y: 60.0 });
        let report = sim.tick(ms(16), &mut rng);
        assert!(!report.nearby);
        assert_eq!(sim.mood(), Mood::Idle);
    }

    #[test]
    fn holding_at_the_mouth_waits_for_release_by_default() {
        let mut sim = context(FeedConfig {
            max_items: 1,
            ..FeedConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(6);
        let id = sim.insert_food(FoodKind::Banana, Vec2::new(20.0, 60.0));
        drag_to(&mut sim, id, MOUTH);

        let report = sim.tick(ms(0), &mut rng);
        assert!(report.eaten().is_empty());
        assert!(sim.get(id).is_some());
        assert_eq!(sim.mood(), Mood::Anticipation);
    }

    #[test]
    fn auto_eat_then_late_release_eats_once() {
        let mut sim = context(FeedConfig {
            auto_eat_while_dragging: true,
            ..FeedConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(7);
        let id = sim.insert_food(FoodKind::Carrot, Vec2::new(20.0, 60.0));
        drag_to(&mut sim, id, Vec2::new(51.0, 21.0));

        let first = sim.tick(ms(0), &mut rng);
        assert_eq!(first.eaten(), vec![id]);
        assert_eq!(first.sounds(), 1);
        assert!(first.events.contains(&SimEvent::Eaten {
            id,
            kind: FoodKind::Carrot,
            position: Vec2::new(51.0, 21.0),
            cause: EatCause::AutoEat,
        }));

        // The pointer release arrives after the tick already ate the item.
        sim.enqueue(FeedCommand::EndDrag { id, x: 51.0, y: 21.0 });
        let second = sim.tick(ms(16), &mut rng);
        assert!(second.eaten().is_empty());
        assert_eq!(second.sounds(), 0);
        assert!(second.faults.is_empty());
        assert_eq!(sim.mood_machine().generation(), 1);
    }

    #[test]
    fn release_in_the_same_frame_beats_auto_eat() {
        let mut sim = context(FeedConfig {
            auto_eat_while_dragging: true,
            ..FeedConfig::default()
        });
        let mut rng = StdRng::seed_from_u64(8);
        let id = sim.insert_food(FoodKind::Apple, Vec2::new(20.0, 60.0));
        drag_to(&mut sim, id, MOUTH);
        sim.enqueue(FeedCommand::EndDrag { id, x: MOUTH.x, y: MOUTH.y });

        let report = sim.tick(ms(0), &mut rng);
        assert_eq!(report.eaten(), vec![id]);
        assert_eq!(report.sounds(), 1);
        assert!(report.events.iter().any(|e| matches!(
            e,
            SimEvent::Eaten { cause: EatCause::Release, .. }
        )));
    }

    #[test]
    fn consume_is_idempotent() {
        let mut sim = context(FeedConfig::default());
        let id = sim.insert_food(FoodKind::Apple, MOUTH);
        let mut report = FrameReport::default();
        assert!(sim.consume(id, MOUTH, ms(0), EatCause::Release, &mut report));
        assert!(!sim.consume(id, MOUTH, ms(0), EatCause::AutoEat, &mut report));
        assert_eq!(report.eaten(), vec![id]);
        assert_eq!(report.sounds(), 1);
    }

    #[test]
    fn end_to_end_feed_cycle() {
        let mut sim = context(FeedConfig::default());
        let mut rng = StdRng::seed_from_u64(9);
        let id = sim.insert_food(FoodKind::Strawberry, Vec2::new(50.0, -10.0));

        drag_to(&mut sim, id, Vec2::new(50.5, 20.5));
        sim.enqueue(FeedCommand::EndDrag { id, x: 50.5, y: 20.5 });
        let report = sim.tick(ms(1_000), &mut rng);

        assert!(sim.get(id).is_none());
        assert_eq!(report.eaten(), vec![id]);
        assert_eq!(sim.mood(), Mood::Happy);
        assert_eq!(report.spawned().len(), 1, "replacement appears right away");
        assert_eq!(sim.live_count(), 1);
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, SimEvent::SparkleBurst { .. })));

        sim.tick(ms(1_699), &mut rng);
        assert_eq!(sim.mood(), Mood::Happy);
        let report = sim.tick(ms(1_700), &mut rng);
        assert_eq!(sim.mood(), Mood::Idle);
        assert!(report.events.contains(&SimEvent::MoodChanged {
            from: Mood::Happy,
            to: Mood::Idle,
        }));
    }

    #[test]
    fn second_eat_extends_happy() {
        let mut sim = context(FeedConfig::default());
        let mut rng = StdRng::seed_from_u64(10);
        let first = sim.insert_food(FoodKind::Apple, Vec2::new(20.0, 60.0));
        let second = sim.insert_food(FoodKind::Apple, Vec2::new(30.0, 60.0));

        drag_to(&mut sim, first, MOUTH);
        sim.enqueue(FeedCommand::EndDrag { id: first, x: MOUTH.x, y: MOUTH.y });
        sim.tick(ms(0), &mut rng);

        drag_to(&mut sim, second, MOUTH);
        sim.enqueue(FeedCommand::EndDrag { id: second, x: MOUTH.x, y: MOUTH.y });
        sim.tick(ms(500), &mut rng);

        sim.tick(ms(700), &mut rng);
        assert_eq!(sim.mood(), Mood::Happy, "first timer is superseded");
        sim.tick(ms(1_200), &mut rng);
        assert_eq!(sim.mood(), Mood::Idle);
    }

    #[test]
    fn reduced_motion_suppresses_sparkles_but_not_sound() {
        let mut sim = context(FeedConfig::default());
        sim.set_reduced_motion(true);
        let mut rng = StdRng::seed_from_u64(11);
        let id = sim.insert_food(FoodKind::Cookie, Vec2::new(20.0, 60.0));
        drag_to(&mut sim, id, MOUTH);
        sim.enqueue(FeedCommand::EndDrag { id, x: MOUTH.x, y: MOUTH.y });

        let report = sim.tick(ms(0), &mut rng);
        assert_eq!(report.sounds(), 1);
        assert!(!report
            .events
            .iter()
            .any(|e| matches!(e, SimEvent::SparkleBurst { .. })));
    }

    #[test]
    fn a_bad_command_does_not_stop_the_frame() {
        let mut sim = context(FeedConfig::default());
        let mut rng = StdRng::seed_from_u64(12);
        let id = sim.insert_food(FoodKind::Banana, Vec2::new(20.0, 60.0));
        sim.enqueue(FeedCommand::StartDrag { id });
        sim.enqueue(FeedCommand::MoveDrag { id, x: f32::INFINITY, y: 1.0 });
        sim.enqueue(FeedCommand::MoveDrag { id, x: 25.0, y: 65.0 });

        let report = sim.tick(ms(0), &mut rng);
        assert_eq!(report.faults.len(), 1);
        assert!(matches!(report.faults[0], SimError::NonFinitePosition { .. }));
        assert_eq!(sim.get(id).unwrap().position, Vec2::new(25.0, 65.0));
        assert_eq!(report.spawned().len(), 1, "spawner still ran");
    }

    #[test]
    fn shutdown_is_idempotent_and_freezes_state() {
        let mut sim = context(FeedConfig::default());
        let mut rng = StdRng::seed_from_u64(13);
        let id = sim.insert_food(FoodKind::Apple, Vec2::new(40.0, 40.0));
        sim.enqueue(FeedCommand::StartDrag { id });

        assert!(sim.shutdown());
        assert!(!sim.shutdown());
        assert_eq!(sim.pending_commands(), 0);
        assert!(!sim.enqueue(FeedCommand::StartDrag { id }));

        let report = sim.tick(ms(5_000), &mut rng);
        assert_eq!(report, FrameReport::default());
        assert_eq!(sim.get(id).unwrap().position, Vec2::new(40.0, 40.0));
        assert_eq!(sim.live_count(), 1);
    }

    #[test]
    fn start_twice_is_a_no_op() {
        let mut sim = SimulationContext::default();
        assert!(sim.start());
        assert!(!sim.start());
        assert!(sim.is_running());
    }
}
