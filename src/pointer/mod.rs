//! Pointer input — mouse and touch become queued drag commands.
//!
//! Presses hit-test the live food within the grab radius. While held, the
//! item keeps the offset it had from the pointer at pickup. Nothing here
//! mutates food directly: every intent goes through the simulation's
//! command queue and is applied at the start of the next tick.

use bevy::input::touch::Touches;
use bevy::input::InputSystem;
use bevy::prelude::*;
use bevy::window::{CursorLeft, PrimaryWindow};
use std::collections::HashMap;

use crate::shared::*;
use crate::sim::SimulationContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveDrag {
    pub food: FoodId,
    /// Item position minus pointer position at pickup.
    pub offset: Vec2,
    /// Where the item was last sent, used when the pointer vanishes.
    pub last: Vec2,
}

/// Which pointer holds which item.
#[derive(Resource, Debug, Default)]
pub struct PointerDrags {
    active: HashMap<PointerId, ActiveDrag>,
}

impl PointerDrags {
    pub fn get(&self, pointer: PointerId) -> Option<&ActiveDrag> {
        self.active.get(&pointer)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Picks up the nearest free item under `at`, if any.
    pub fn begin(
        &mut self,
        pointer: PointerId,
        at: Vec2,
        sim: &mut SimulationContext,
    ) -> Option<FoodId> {
        if self.active.contains_key(&pointer) {
            return None;
        }
        let id = sim.pick_food(at, sim.config().grab_radius)?;
        // Another pointer may have claimed it earlier this frame.
        if self.active.values().any(|drag| drag.food == id) {
            return None;
        }
        let position = sim.get(id)?.position;
        if !sim.enqueue(FeedCommand::StartDrag { id }) {
            return None;
        }
        self.active.insert(
            pointer,
            ActiveDrag {
                food: id,
                offset: position - at,
                last: position,
            },
        );
        Some(id)
    }

    pub fn move_to(&mut self, pointer: PointerId, at: Vec2, sim: &mut SimulationContext) {
        let Some(drag) = self.active.get_mut(&pointer) else {
            return;
        };
        let target = at + drag.offset;
        if target == drag.last {
            return;
        }
        drag.last = target;
        sim.enqueue(FeedCommand::MoveDrag {
            id: drag.food,
            x: target.x,
            y: target.y,
        });
    }

    /// Lets go at `at`, or at the last sent position when the pointer is gone.
    pub fn release(
        &mut self,
        pointer: PointerId,
        at: Option<Vec2>,
        sim: &mut SimulationContext,
    ) -> Option<FoodId> {
        let drag = self.active.remove(&pointer)?;
        let point = at.map_or(drag.last, |at| at + drag.offset);
        sim.enqueue(FeedCommand::EndDrag {
            id: drag.food,
            x: point.x,
            y: point.y,
        });
        Some(drag.food)
    }

    pub fn cancel(&mut self, pointer: PointerId, sim: &mut SimulationContext) -> Option<FoodId> {
        let drag = self.active.remove(&pointer)?;
        sim.enqueue(FeedCommand::CancelDrag { id: drag.food });
        Some(drag.food)
    }
}

pub struct PointerPlugin;

impl Plugin for PointerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerDrags>()
            .add_systems(
                PreUpdate,
                (read_mouse, read_touches)
                    .chain()
                    .after(InputSystem)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(OnExit(GameState::Playing), clear_drags);
    }
}

fn window_size(window: &Window) -> Vec2 {
    Vec2::new(window.width(), window.height())
}

fn read_mouse(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cursor_left: EventReader<CursorLeft>,
    mut drags: ResMut<PointerDrags>,
    mut sim: ResMut<SimulationContext>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let size = window_size(window);
    let cursor = window
        .cursor_position()
        .map(|screen| screen_to_percent(screen, size));

    if cursor_left.read().count() > 0 {
        drags.release(PointerId::Mouse, None, &mut sim);
        return;
    }

    let Some(at) = cursor else {
        return;
    };
    if buttons.just_pressed(MouseButton::Left) {
        drags.begin(PointerId::Mouse, at, &mut sim);
    }
    // A quick click can press and release within one frame.
    if buttons.just_released(MouseButton::Left) {
        drags.release(PointerId::Mouse, Some(at), &mut sim);
    } else if buttons.pressed(MouseButton::Left) {
        drags.move_to(PointerId::Mouse, at, &mut sim);
    }
}

fn read_touches(
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut drags: ResMut<PointerDrags>,
    mut sim: ResMut<SimulationContext>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let size = window_size(window);

    for touch in touches.iter_just_pressed() {
        let at = screen_to_percent(touch.position(), size);
        drags.begin(PointerId::Touch(touch.id()), at, &mut sim);
    }
    for touch in touches.iter() {
        if touch.delta() != Vec2::ZERO {
            let at = screen_to_percent(touch.position(), size);
            drags.move_to(PointerId::Touch(touch.id()), at, &mut sim);
        }
    }
    for touch in touches.iter_just_released() {
        let at = screen_to_percent(touch.position(), size);
        drags.release(PointerId::Touch(touch.id()), Some(at), &mut sim);
    }
    for touch in touches.iter_just_canceled() {
        drags.cancel(PointerId::Touch(touch.id()), &mut sim);
    }
}

fn clear_drags(mut drags: ResMut<PointerDrags>) {
    drags.clear();
}
