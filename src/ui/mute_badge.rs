use bevy::prelude::*;
use crate::shared::*;

/// Corner button showing whether sound is on. Clicking or tapping it toggles mute.
#[derive(Component)]
pub struct MuteBadge;

#[derive(Component)]
pub struct MuteBadgeLabel;

const BADGE_IDLE: Color = Color::srgba(1.0, 1.0, 1.0, 0.55);
const BADGE_HOVER: Color = Color::srgba(1.0, 1.0, 1.0, 0.8);

pub fn badge_label(settings: &AudioSettings) -> &'static str {
    if settings.muted {
        "Sound off (M)"
    } else {
        "Sound on (M)"
    }
}

pub fn spawn_mute_badge(mut commands: Commands, settings: Res<AudioSettings>) {
    commands
        .spawn((
            MuteBadge,
            Button,
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                right: Val::Px(12.0),
                padding: UiRect::axes(Val::Px(10.0), Val::Px(6.0)),
                ..default()
            },
            BackgroundColor(BADGE_IDLE),
            BorderRadius::all(Val::Px(8.0)),
        ))
        .with_children(|badge| {
            badge.spawn((
                MuteBadgeLabel,
                Text::new(badge_label(&settings)),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgba(0.15, 0.15, 0.2, 0.9)),
            ));
        });
}

pub fn despawn_mute_badge(mut commands: Commands, query: Query<Entity, With<MuteBadge>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

/// A press on the badge is a user gesture, so it also unlocks audio.
pub fn click_mute_badge(
    mut interactions: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<MuteBadge>),
    >,
    mut settings: ResMut<AudioSettings>,
    mut unlock: EventWriter<UnlockAudioEvent>,
) {
    for (interaction, mut background) in &mut interactions {
        match *interaction {
            Interaction::Pressed => {
                settings.muted = !settings.muted;
                unlock.send(UnlockAudioEvent);
                info!("[UI] Badge {}", if settings.muted { "muted" } else { "unmuted" });
            }
            Interaction::Hovered => background.0 = BADGE_HOVER,
            Interaction::None => background.0 = BADGE_IDLE,
        }
    }
}

pub fn update_mute_badge(
    settings: Res<AudioSettings>,
    mut query: Query<&mut Text, With<MuteBadgeLabel>>,
) {
    if !settings.is_changed() {
        return;
    }
    for mut text in &mut query {
        text.0 = badge_label(&settings).to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_tracks_mute() {
        let mut settings = AudioSettings::default();
        assert_eq!(badge_label(&settings), "Sound on (M)");
        settings.muted = true;
        assert_eq!(badge_label(&settings), "Sound off (M)");
    }

    fn badge_app() -> App {
        let mut app = App::new();
        app.init_resource::<AudioSettings>()
            .add_event::<UnlockAudioEvent>()
            .add_systems(Update, (click_mute_badge, update_mute_badge).chain());
        app.world_mut()
            .spawn((MuteBadge, Interaction::None, BackgroundColor(BADGE_IDLE)))
            .with_children(|badge| {
                badge.spawn((MuteBadgeLabel, Text::new("Sound on (M)")));
            });
        app
    }

    fn press_badge(app: &mut App) {
        let mut badges = app
            .world_mut()
            .query_filtered::<&mut Interaction, With<MuteBadge>>();
        for mut interaction in badges.iter_mut(app.world_mut()) {
            *interaction = Interaction::Pressed;
        }
        app.update();
    }

    #[test]
    fn tapping_the_badge_toggles_mute_and_unlocks() {
        let mut app = badge_app();
        app.update();
        assert!(!app.world().resource::<AudioSettings>().muted);

        press_badge(&mut app);
        assert!(app.world().resource::<AudioSettings>().muted);
        let unlocks = app.world().resource::<Events<UnlockAudioEvent>>();
        assert_eq!(unlocks.len(), 1);

        let mut labels = app
            .world_mut()
            .query_filtered::<&Text, With<MuteBadgeLabel>>();
        assert_eq!(labels.single(app.world()).0, "Sound off (M)");
    }

    #[test]
    fn holding_the_badge_toggles_once() {
        let mut app = badge_app();
        press_badge(&mut app);
        app.update();
        app.update();
        assert!(app.world().resource::<AudioSettings>().muted);
    }
}
