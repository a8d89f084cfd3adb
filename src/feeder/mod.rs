//! Feeder domain — drives the simulation core from the Bevy schedule.
//!
//! The [`SimulationContext`] resource is rebuilt from [`FeedConfig`] every
//! time play begins, ticked once per `Update` while `Playing`, and shut down
//! on leaving `Playing` or on app exit. Each frame report is logged and fanned
//! out as Bevy events for the audio and scene collaborators.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::FeedConfig;
use crate::shared::*;
use crate::sim::{EatCause, FrameReport, SimEvent, SimulationContext};

/// RNG for spawn and recycle rolls. Tests swap in a seeded one.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

impl Default for SimRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Anything reading or writing the context orders itself around this set.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeederTick;

pub struct FeederPlugin;

impl Plugin for FeederPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationContext>()
            .init_resource::<SimRng>()
            .init_resource::<FeedConfig>()
            .init_resource::<MouthTarget>()
            .init_resource::<MotionPreference>()
            .add_event::<FoodEatenEvent>()
            .add_event::<PlaySfxEvent>()
            .add_event::<UnlockAudioEvent>()
            .add_event::<SparkleBurstEvent>()
            .add_systems(OnEnter(GameState::Playing), start_frame_loop)
            .add_systems(OnExit(GameState::Playing), stop_frame_loop)
            .add_systems(
                Update,
                run_frame
                    .in_set(FeederTick)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Last, stop_on_app_exit);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LIFECYCLE
// ═══════════════════════════════════════════════════════════════════════

fn start_frame_loop(config: Res<FeedConfig>, mut sim: ResMut<SimulationContext>) {
    *sim = SimulationContext::new(config.clone());
    sim.start();
}

fn stop_frame_loop(mut sim: ResMut<SimulationContext>) {
    sim.shutdown();
}

fn stop_on_app_exit(mut exits: EventReader<AppExit>, mut sim: ResMut<SimulationContext>) {
    if exits.read().next().is_some() {
        sim.shutdown();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FRAME
// ═══════════════════════════════════════════════════════════════════════

#[allow(clippy::too_many_arguments)]
fn run_frame(
    time: Res<Time>,
    mouth: Res<MouthTarget>,
    motion: Res<MotionPreference>,
    mut sim: ResMut<SimulationContext>,
    mut rng: ResMut<SimRng>,
    mut eaten_events: EventWriter<FoodEatenEvent>,
    mut sfx_events: EventWriter<PlaySfxEvent>,
    mut unlock_events: EventWriter<UnlockAudioEvent>,
    mut sparkle_events: EventWriter<SparkleBurstEvent>,
) {
    sim.set_target(mouth.0);
    sim.set_reduced_motion(motion.reduced);

    let report = sim.tick(time.elapsed(), &mut rng.0);
    log_report(&report);

    for event in report.events {
        match event {
            SimEvent::Eaten { id, kind, position, .. } => {
                eaten_events.send(FoodEatenEvent { id, kind, position });
            }
            SimEvent::PlaySound(sound) => {
                sfx_events.send(PlaySfxEvent { sound });
            }
            SimEvent::UnlockAudio => {
                unlock_events.send(UnlockAudioEvent);
            }
            SimEvent::SparkleBurst { position } => {
                sparkle_events.send(SparkleBurstEvent { position });
            }
            SimEvent::Spawned { .. }
            | SimEvent::Recycled { .. }
            | SimEvent::DragStarted { .. }
            | SimEvent::Dropped { .. }
            | SimEvent::MoodChanged { .. } => {}
        }
    }
}

/// Faults are logged here and nowhere else; the loop carries on.
fn log_report(report: &FrameReport) {
    for fault in &report.faults {
        warn!("[Feeder] Frame fault: {}", fault);
    }
    for event in &report.events {
        match event {
            SimEvent::Eaten { id, kind, cause, .. } => {
                let how = match cause {
                    EatCause::Release => "released at the mouth",
                    EatCause::AutoEat => "held at the mouth",
                };
                info!("[Feeder] Ate {} {} ({})", kind.label(), id, how);
            }
            SimEvent::Spawned { id, kind, position } => {
                debug!("[Feeder] Spawned {} {} at x={:.1}", kind.label(), id, position.x);
            }
            SimEvent::Recycled { id } => debug!("[Feeder] Recycled {}", id),
            SimEvent::MoodChanged { from, to } => debug!("[Feeder] Mood {:?} -> {:?}", from, to),
            _ => {}
        }
    }
}
