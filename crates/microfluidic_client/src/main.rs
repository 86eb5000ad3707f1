use bevy::prelude::*;
use microfluidic_simulation::{logger, SimulationConfig, SimulationPlugin};

mod camera;
mod controls;
mod logging;
mod rendering;

use camera::CameraPlugin;
use controls::ControlsPlugin;
use logging::BevyLogger;
use rendering::RenderingSyncPlugin;

fn main() {
    // Логи симуляции → Bevy tracing (до SimulationPlugin, он логирует init)
    logger::set_logger(Box::new(BevyLogger));

    let config = match SimulationConfig::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(1);
        }
    };

    App::new()
        // Bevy defaults (rendering, input, time, etc.)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Microfluidic Chamber".to_string(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.05, 0.06, 0.08)))
        // Simulation (registry + Rapier, FixedUpdate)
        .add_plugins(SimulationPlugin::new(config))
        // Rendering sync (registry snapshot → capsule meshes)
        .add_plugins(RenderingSyncPlugin)
        // Camera + keyboard controls
        .add_plugins((CameraPlugin, ControlsPlugin))
        .add_systems(Startup, setup_scene)
        .run();
}

/// Свет + камера. Пол камеры строит RenderingSyncPlugin (зависит от config).
fn setup_scene(mut commands: Commands) {
    // Directional light (сверху, слегка наклонён для теней на полу камеры)
    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_3)),
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
        affects_lightmapped_meshes: false,
    });

    commands.spawn((Camera3d::default(), camera::ChamberCamera::default()));
}
