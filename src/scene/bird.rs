use bevy::prelude::*;
use rand::Rng;
use std::time::Duration;

use crate::shared::*;
use crate::sim::SimulationContext;

// The bird is drawn in a 200 x 280 box, origin at its centre, y up, and the
// root transform scales that box to the window layout.
pub const BOX_HEIGHT: f32 = 280.0;

const BODY_COLOR: Color = Color::srgb(0x6B as f32 / 255.0, 0x5B as f32 / 255.0, 0x7D as f32 / 255.0);
const WING_COLOR: Color = Color::srgb(0x55 as f32 / 255.0, 0x47 as f32 / 255.0, 0x66 as f32 / 255.0);
const NECK_COLOR: Color = Color::srgb(0xF2 as f32 / 255.0, 0xC1 as f32 / 255.0, 0xB6 as f32 / 255.0);
const BEAK_COLOR: Color = Color::srgb(0xF4 as f32 / 255.0, 0xA2 as f32 / 255.0, 0x61 as f32 / 255.0);
const LEG_COLOR: Color = Color::srgb(0xE9 as f32 / 255.0, 0xA0 as f32 / 255.0, 0x7A as f32 / 255.0);

const HEAD_REST: Vec2 = Vec2::new(0.0, 96.0);
/// Lines up with the mouth point published to the simulation.
const BEAK_OFFSET: Vec2 = Vec2::new(0.0, 21.6);

const BLINK_LENGTH: f32 = 0.15;
const GULP_LENGTH: f32 = 0.25;
/// Peak neck stretch of a gulp, box units.
const GULP_LIFT: f32 = 8.0;

#[derive(Component)]
pub struct Bird;

#[derive(Component)]
pub struct BirdHead;

#[derive(Component)]
pub struct BirdBeak;

#[derive(Component)]
pub struct BirdEye;

#[derive(Component)]
pub struct BlinkTimer {
    pub until_blink: Timer,
    pub closing: Option<Timer>,
}

/// Neck stretch played once per eaten item.
#[derive(Component, Default)]
pub struct Gulp(pub Option<Timer>);

impl BlinkTimer {
    fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            until_blink: Timer::new(next_blink_delay(rng), TimerMode::Once),
            closing: None,
        }
    }
}

/// Blinks come every 3 to 6 seconds.
fn next_blink_delay<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    Duration::from_secs_f32(rng.gen_range(3.0..6.0))
}

/// Extra head lift `progress` of the way through a gulp: up, then back.
pub fn gulp_lift(progress: f32) -> f32 {
    if !(0.0..1.0).contains(&progress) {
        return 0.0;
    }
    (progress * std::f32::consts::PI).sin() * GULP_LIFT
}

/// Head lift in box units and how far the beak is open (1.0 = closed).
pub fn head_pose(mood: Mood, elapsed_secs: f32, reduced_motion: bool) -> (f32, f32) {
    match mood {
        Mood::Idle => (0.0, 1.0),
        Mood::Anticipation => (4.0, 2.2),
        Mood::Happy => {
            let bounce = if reduced_motion {
                0.0
            } else {
                (elapsed_secs * 14.0).sin().abs() * 10.0
            };
            (bounce, 1.6)
        }
    }
}

pub fn spawn_bird(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let mut rng = rand::thread_rng();

    let body = materials.add(ColorMaterial::from(BODY_COLOR));
    let wing = materials.add(ColorMaterial::from(WING_COLOR));
    let neck = materials.add(ColorMaterial::from(NECK_COLOR));
    let beak = materials.add(ColorMaterial::from(BEAK_COLOR));
    let leg = materials.add(ColorMaterial::from(LEG_COLOR));
    let white = materials.add(ColorMaterial::from(Color::WHITE));
    let black = materials.add(ColorMaterial::from(Color::BLACK));

    let leg_mesh = meshes.add(Rectangle::new(7.0, 60.0));
    let eye_mesh = meshes.add(Circle::new(5.0));
    let pupil_mesh = meshes.add(Circle::new(2.5));

    commands
        .spawn((
            Bird,
            BlinkTimer::new(&mut rng),
            Gulp::default(),
            Transform::default(),
            Visibility::default(),
        ))
        .with_children(|parent| {
            for x in [-20.0, 20.0] {
                parent.spawn((
                    Mesh2d(leg_mesh.clone()),
                    MeshMaterial2d(leg.clone()),
                    Transform::from_xyz(x, -110.0, 0.1),
                ));
            }
            parent.spawn((
                Mesh2d(meshes.add(Ellipse::new(70.0, 48.0))),
                MeshMaterial2d(body.clone()),
                Transform::from_xyz(0.0, -40.0, 0.2),
            ));
            parent.spawn((
                Mesh2d(meshes.add(Ellipse::new(30.0, 20.0))),
                MeshMaterial2d(wing),
                Transform::from_xyz(-40.0, -35.0, 0.3),
            ));
            parent.spawn((
                Mesh2d(meshes.add(Rectangle::new(16.0, 84.0))),
                MeshMaterial2d(neck.clone()),
                Transform::from_xyz(0.0, 38.0, 0.25),
            ));

            parent
                .spawn((
                    BirdHead,
                    Mesh2d(meshes.add(Circle::new(24.0))),
                    MeshMaterial2d(neck),
                    Transform::from_translation(HEAD_REST.extend(0.4)),
                ))
                .with_children(|head| {
                    head.spawn((
                        BirdBeak,
                        Mesh2d(meshes.add(Ellipse::new(14.0, 5.0))),
                        MeshMaterial2d(beak),
                        Transform::from_translation(BEAK_OFFSET.extend(0.1)),
                    ));
                    for x in [-10.0, 10.0] {
                        head.spawn((
                            BirdEye,
                            Mesh2d(eye_mesh.clone()),
                            MeshMaterial2d(white.clone()),
                            Transform::from_xyz(x, 2.0, 0.1),
                        ))
                        .with_children(|eye| {
                            eye.spawn((
                                Mesh2d(pupil_mesh.clone()),
                                MeshMaterial2d(black.clone()),
                                Transform::from_xyz(0.0, 0.0, 0.1),
                            ));
                        });
                    }
                });
        });
}

pub fn start_gulp(
    mut eaten: EventReader<FoodEatenEvent>,
    motion: Res<MotionPreference>,
    mut birds: Query<&mut Gulp, With<Bird>>,
) {
    let Some(last) = eaten.read().last() else {
        return;
    };
    if motion.reduced {
        return;
    }
    debug!("[Scene] Gulp for {}", last.id);
    for mut gulp in &mut birds {
        gulp.0 = Some(Timer::from_seconds(GULP_LENGTH, TimerMode::Once));
    }
}

pub fn pose_bird(
    time: Res<Time>,
    sim: Res<SimulationContext>,
    motion: Res<MotionPreference>,
    mut birds: Query<&mut Gulp, With<Bird>>,
    mut heads: Query<&mut Transform, (With<BirdHead>, Without<BirdBeak>)>,
    mut beaks: Query<&mut Transform, (With<BirdBeak>, Without<BirdHead>)>,
) {
    let mut gulping = 0.0;
    for mut gulp in &mut birds {
        if let Some(timer) = gulp.0.as_mut() {
            timer.tick(time.delta());
            gulping = gulp_lift(timer.fraction());
            if timer.finished() {
                gulp.0 = None;
            }
        }
    }

    let (lift, open) = head_pose(sim.mood(), time.elapsed_secs(), motion.reduced);
    for mut transform in &mut heads {
        transform.translation.y = HEAD_REST.y + lift + gulping;
    }
    for mut transform in &mut beaks {
        transform.scale.y = open;
    }
}

pub fn blink_eyes(
    time: Res<Time>,
    motion: Res<MotionPreference>,
    mut birds: Query<&mut BlinkTimer, With<Bird>>,
    mut eyes: Query<&mut Transform, With<BirdEye>>,
) {
    let Ok(mut blink) = birds.get_single_mut() else {
        return;
    };

    if motion.reduced {
        blink.closing = None;
    } else {
        if let Some(closing) = blink.closing.as_mut() {
            closing.tick(time.delta());
            if closing.finished() {
                blink.closing = None;
            }
        }
        blink.until_blink.tick(time.delta());
        if blink.until_blink.finished() {
            let delay = next_blink_delay(&mut rand::thread_rng());
            blink.until_blink = Timer::new(delay, TimerMode::Once);
            blink.closing = Some(Timer::from_seconds(BLINK_LENGTH, TimerMode::Once));
        }
    }

    let open = if blink.closing.is_some() { 0.1 } else { 1.0 };
    for mut transform in &mut eyes {
        transform.scale.y = open;
    }
}
