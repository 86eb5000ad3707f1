//! Control panel: клавиатура → SimulationCommand + HUD со статусом
//!
//! Space — pause/resume, R — reset, B — bacterium в центре камеры, T — teardown

use bevy::prelude::*;
use microfluidic_simulation::{BacteriaEvicted, Lifecycle, Simulation, SimulationCommand};

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EvictionCounter>()
            .add_systems(Startup, setup_status_text)
            .add_systems(Update, (keyboard_commands, count_evictions, update_status_text));
    }
}

/// Marker: HUD-строка со статусом симуляции
#[derive(Component)]
pub struct StatusText;

/// Сколько бактерий покинуло камеру с последнего reset
#[derive(Resource, Default)]
pub struct EvictionCounter {
    pub total: usize,
}

/// Маппинг клавиш на команды (чистая функция — удобно тестировать)
pub fn command_for_key(key: KeyCode, chamber_center: Vec2) -> Option<SimulationCommand> {
    match key {
        KeyCode::Space => Some(SimulationCommand::TogglePause),
        KeyCode::KeyR => Some(SimulationCommand::Reset),
        KeyCode::KeyB => Some(SimulationCommand::Spawn {
            position: chamber_center,
        }),
        KeyCode::KeyT => Some(SimulationCommand::Teardown),
        _ => None,
    }
}

fn keyboard_commands(
    keys: Res<ButtonInput<KeyCode>>,
    simulation: Res<Simulation>,
    mut commands: EventWriter<SimulationCommand>,
    mut evictions: ResMut<EvictionCounter>,
) {
    let config = simulation.config();
    let center = Vec2::new(config.chamber_width * 0.5, config.chamber_height * 0.5);

    for key in keys.get_just_pressed() {
        if let Some(command) = command_for_key(*key, center) {
            if matches!(command, SimulationCommand::Reset) {
                evictions.total = 0;
            }
            commands.write(command);
        }
    }
}

fn count_evictions(mut events: EventReader<BacteriaEvicted>, mut counter: ResMut<EvictionCounter>) {
    for event in events.read() {
        counter.total += event.ids.len();
    }
}

fn setup_status_text(mut commands: Commands) {
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
        StatusText,
    ));
}

fn update_status_text(
    simulation: Res<Simulation>,
    evictions: Res<EvictionCounter>,
    mut query: Query<&mut Text, With<StatusText>>,
) {
    let state = match (simulation.lifecycle(), simulation.is_paused()) {
        (Lifecycle::Running, true) => "PAUSED",
        (Lifecycle::Running, false) => "RUNNING",
        (Lifecycle::Destroyed, _) => "TORN DOWN (R to restart)",
        (Lifecycle::Uninitialized, _) => "NOT INITIALIZED",
    };

    for mut text in query.iter_mut() {
        **text = format!(
            "{} | tick {} | bacteria {} | left chamber {}\n[Space] pause  [R] reset  [B] spawn  [T] teardown",
            state,
            simulation.tick_count(),
            simulation.population(),
            evictions.total
        );
    }
}
