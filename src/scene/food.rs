use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use std::collections::{HashMap, HashSet};

use crate::shared::*;
use crate::sim::SimulationContext;

/// Food radius as a share of the window width.
const FOOD_RADIUS: f32 = 0.045;
const DRAG_SCALE: f32 = 1.1;
/// Sideways sway of falling items, in viewport percent.
const SWAY: f32 = 2.0;

const SPARKLE_COUNT: usize = 8;
const SPARKLE_STAGGER: f32 = 0.05;
const SPARKLE_LIFETIME: f32 = 0.6;
const SPARKLE_COLOR: Color = Color::srgb(1.0, 0.92, 0.45);

#[derive(Component)]
pub struct FoodSprite {
    pub id: FoodId,
}

#[derive(Component)]
pub struct Sparkle {
    pub delay: Timer,
    pub life: Timer,
    pub direction: Vec2,
}

/// Shared mesh and one material per food kind, built lazily on first use.
#[derive(Resource, Default)]
pub struct FoodMeshes {
    circle: Option<Handle<Mesh>>,
    sparkle: Option<Handle<Mesh>>,
    kinds: HashMap<FoodKind, Handle<ColorMaterial>>,
    sparkle_material: Option<Handle<ColorMaterial>>,
}

impl FoodMeshes {
    fn circle(&mut self, meshes: &mut Assets<Mesh>) -> Handle<Mesh> {
        self.circle
            .get_or_insert_with(|| meshes.add(Circle::new(1.0)))
            .clone()
    }

    fn material(&mut self, kind: FoodKind, materials: &mut Assets<ColorMaterial>) -> Handle<ColorMaterial> {
        self.kinds
            .entry(kind)
            .or_insert_with(|| materials.add(ColorMaterial::from(kind.color())))
            .clone()
    }

    fn sparkle(
        &mut self,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<ColorMaterial>,
    ) -> (Handle<Mesh>, Handle<ColorMaterial>) {
        let mesh = self
            .sparkle
            .get_or_insert_with(|| meshes.add(RegularPolygon::new(1.0, 4)))
            .clone();
        let material = self
            .sparkle_material
            .get_or_insert_with(|| materials.add(ColorMaterial::from(SPARKLE_COLOR)))
            .clone();
        (mesh, material)
    }
}

/// Where an item is drawn. Falling items sway with their spin; dragged
/// items sit exactly under the pointer.
pub fn drawn_percent(food: &FoodEntity) -> Vec2 {
    if food.is_dragging() {
        food.position
    } else {
        food.position + Vec2::new(food.rotation.to_radians().sin() * SWAY, 0.0)
    }
}

pub fn sync_food_visuals(
    mut commands: Commands,
    sim: Res<SimulationContext>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cache: ResMut<FoodMeshes>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut sprites: Query<(Entity, &FoodSprite, &mut Transform)>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    let radius = size.x * FOOD_RADIUS;

    let live: HashMap<FoodId, &FoodEntity> = sim.items().iter().map(|f| (f.id, f)).collect();
    let mut drawn = HashSet::new();

    for (entity, sprite, mut transform) in &mut sprites {
        match live.get(&sprite.id) {
            Some(food) => {
                *transform = food_transform(food, size, radius);
                drawn.insert(sprite.id);
            }
            None => commands.entity(entity).despawn_recursive(),
        }
    }

    for food in sim.items().iter().filter(|f| !drawn.contains(&f.id)) {
        commands.spawn((
            FoodSprite { id: food.id },
            Mesh2d(cache.circle(&mut meshes)),
            MeshMaterial2d(cache.material(food.kind, &mut materials)),
            food_transform(food, size, radius),
        ));
    }
}

fn food_transform(food: &FoodEntity, size: Vec2, radius: f32) -> Transform {
    let world = percent_to_world(drawn_percent(food), size);
    let scale = if food.is_dragging() { radius * DRAG_SCALE } else { radius };
    // Dragged items draw above falling ones.
    let z = if food.is_dragging() { 6.0 } else { 5.0 };
    Transform::from_translation(world.extend(z))
        .with_rotation(Quat::from_rotation_z(-food.rotation.to_radians()))
        .with_scale(Vec3::splat(scale))
}

pub fn despawn_food_visuals(mut commands: Commands, sprites: Query<Entity, With<FoodSprite>>) {
    for entity in &sprites {
        commands.entity(entity).despawn_recursive();
    }
}

pub fn spawn_sparkles(
    mut commands: Commands,
    mut events: EventReader<SparkleBurstEvent>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cache: ResMut<FoodMeshes>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let Ok(window) = windows.get_single() else {
        events.clear();
        return;
    };
    let size = Vec2::new(window.width(), window.height());

    for event in events.read() {
        let origin = percent_to_world(event.position, size);
        let (mesh, material) = cache.sparkle(&mut meshes, &mut materials);
        for i in 0..SPARKLE_COUNT {
            let angle = i as f32 / SPARKLE_COUNT as f32 * std::f32::consts::TAU;
            commands.spawn((
                Sparkle {
                    delay: Timer::from_seconds(i as f32 * SPARKLE_STAGGER, TimerMode::Once),
                    life: Timer::from_seconds(SPARKLE_LIFETIME, TimerMode::Once),
                    direction: Vec2::from_angle(angle),
                },
                Mesh2d(mesh.clone()),
                MeshMaterial2d(material.clone()),
                Transform::from_translation(origin.extend(8.0)).with_scale(Vec3::ZERO),
            ));
        }
    }
}

pub fn animate_sparkles(
    mut commands: Commands,
    time: Res<Time>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut sparkles: Query<(Entity, &mut Sparkle, &mut Transform)>,
) {
    let reach = windows
        .get_single()
        .map(|w| w.width() * 0.08)
        .unwrap_or(40.0);

    for (entity, mut sparkle, mut transform) in &mut sparkles {
        sparkle.delay.tick(time.delta());
        if !sparkle.delay.finished() {
            continue;
        }
        sparkle.life.tick(time.delta());
        if sparkle.life.finished() {
            commands.entity(entity).despawn_recursive();
            continue;
        }

        let t = sparkle.life.fraction();
        let step = sparkle.direction * reach * time.delta_secs() / SPARKLE_LIFETIME;
        transform.translation += step.extend(0.0);
        transform.scale = Vec3::splat(6.0 * (1.0 - t));
        transform.rotate_z(time.delta_secs() * 4.0);
    }
}
