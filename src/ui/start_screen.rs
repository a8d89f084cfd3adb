use bevy::input::touch::Touches;
use bevy::prelude::*;
use crate::shared::*;

#[derive(Component)]
pub struct StartScreenRoot;

// ═══════════════════════════════════════════════════════════════════════
// SPAWN / DESPAWN
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_start_screen(mut commands: Commands) {
    commands
        .spawn((
            StartScreenRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(24.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.1, 0.08, 0.15, 0.75)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Feed the Ostrich!"),
                TextFont {
                    font_size: 44.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.9, 0.5)),
            ));

            parent.spawn((
                Text::new("Tap to start"),
                TextFont {
                    font_size: 26.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));

            parent.spawn((
                Text::new("Drag snacks into the beak. Press M to mute."),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.75, 0.75, 0.85)),
            ));
        });
}

pub fn despawn_start_screen(mut commands: Commands, query: Query<Entity, With<StartScreenRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INPUT
// ═══════════════════════════════════════════════════════════════════════

/// Any tap, click or confirm key starts play. It also counts as the user
/// gesture that unlocks audio.
pub fn start_screen_input(
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    touches: Res<Touches>,
    mut unlock_events: EventWriter<UnlockAudioEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let tapped = mouse.just_pressed(MouseButton::Left)
        || touches.any_just_pressed()
        || keyboard.just_pressed(KeyCode::Space)
        || keyboard.just_pressed(KeyCode::Enter);
    if !tapped {
        return;
    }
    unlock_events.send(UnlockAudioEvent);
    next_state.set(GameState::Playing);
    info!("[UI] Start screen dismissed");
}
