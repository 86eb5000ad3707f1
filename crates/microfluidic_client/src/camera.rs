use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use microfluidic_simulation::Simulation;

use crate::rendering::chamber_center;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostStartup, fit_camera_to_chamber)
            .add_systems(Update, (orbit_camera_controls, update_camera_transform).chain());
    }
}

/// Orbit-камера вокруг центра камеры (chamber), Y вверх
#[derive(Component)]
pub struct ChamberCamera {
    pub focus: Vec3,
    pub distance: f32,
    pub yaw: f32,   // Horizontal rotation (radians)
    pub pitch: f32, // Vertical rotation (radians)
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ChamberCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            distance: 120.0,
            yaw: 0.0,
            pitch: 1.2, // почти сверху, как под микроскопом
            sensitivity: 0.005,
            zoom_speed: 4.0,
            min_distance: 5.0,
            max_distance: 500.0,
        }
    }
}

/// Центрирует камеру на chamber и подбирает дистанцию под её размер
fn fit_camera_to_chamber(simulation: Res<Simulation>, mut query: Query<&mut ChamberCamera>) {
    let config = simulation.config();
    let extent = config.chamber_width.max(config.chamber_height);

    for mut camera in query.iter_mut() {
        camera.focus = chamber_center(config);
        camera.distance = extent * 1.1;
        camera.max_distance = extent * 5.0;
    }
}

/// Right mouse: orbit, wheel: zoom
fn orbit_camera_controls(
    mut query: Query<&mut ChamberCamera>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut mouse_wheel: EventReader<MouseWheel>,
) {
    let Ok(mut camera) = query.single_mut() else {
        return;
    };

    if mouse_buttons.pressed(MouseButton::Right) {
        for motion in mouse_motion.read() {
            camera.yaw -= motion.delta.x * camera.sensitivity;
            camera.pitch += motion.delta.y * camera.sensitivity;

            // Не уходим под пол камеры и не переворачиваемся через зенит
            camera.pitch = camera.pitch.clamp(0.1, std::f32::consts::FRAC_PI_2 - 0.01);
        }
    } else {
        // Consume motion events even when not orbiting
        mouse_motion.clear();
    }

    for wheel in mouse_wheel.read() {
        let (min, max) = (camera.min_distance, camera.max_distance);
        camera.distance = (camera.distance - wheel.y * camera.zoom_speed).clamp(min, max);
    }
}

fn update_camera_transform(
    mut query: Query<(&ChamberCamera, &mut Transform), Changed<ChamberCamera>>,
) {
    for (camera, mut transform) in query.iter_mut() {
        // Spherical → cartesian вокруг focus
        let offset = Vec3::new(
            camera.distance * camera.pitch.cos() * camera.yaw.sin(),
            camera.distance * camera.pitch.sin(),
            camera.distance * camera.pitch.cos() * camera.yaw.cos(),
        );

        *transform = Transform::from_translation(camera.focus + offset)
            .looking_at(camera.focus, Vec3::Y);
    }
}
