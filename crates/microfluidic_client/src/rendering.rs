//! Render sync: snapshot registry → пул capsule-мешей (1:1 по BacteriumId)
//!
//! Координаты: симуляция в плоскости (x, y) µm → мир Bevy (x, radius, y),
//! пол камеры лежит в плоскости Y = 0.

use bevy::prelude::*;
use microfluidic_simulation::{BacteriumId, BacteriumState, Simulation, SimulationConfig};
use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

/// Перестраиваем меш, когда длина ушла от отрисованной больше чем на 1%
const REMESH_THRESHOLD: f32 = 0.01;

const WALL_HEIGHT: f32 = 2.0;
const WALL_THICKNESS: f32 = 0.5;

pub struct RenderingSyncPlugin;

impl Plugin for RenderingSyncPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VisualPool>()
            .add_systems(Startup, setup_bacteria_palette)
            .add_systems(Update, (sync_chamber_geometry, sync_bacteria_visuals).chain());
    }
}

/// Пул визуалов: BacteriumId → mesh entity
#[derive(Resource, Default)]
pub struct VisualPool {
    pub visuals: HashMap<BacteriumId, Entity>,
}

/// Visual одной бактерии (свой mesh handle — длина у каждой своя)
#[derive(Component)]
pub struct BacteriumVisual {
    pub mesh: Handle<Mesh>,
    pub rendered_length: f32,
}

/// Marker: пол и стенки камеры
#[derive(Component)]
pub struct ChamberPart;

#[derive(Resource)]
pub struct BacteriaPalette {
    materials: Vec<Handle<StandardMaterial>>,
}

impl BacteriaPalette {
    fn material_for(&self, id: BacteriumId) -> Handle<StandardMaterial> {
        self.materials[(id.0 % self.materials.len() as u64) as usize].clone()
    }
}

fn setup_bacteria_palette(mut commands: Commands, mut materials: ResMut<Assets<StandardMaterial>>) {
    let tints = [
        Color::srgb(0.45, 0.85, 0.45),
        Color::srgb(0.35, 0.75, 0.55),
        Color::srgb(0.55, 0.90, 0.40),
        Color::srgb(0.40, 0.80, 0.70),
    ];

    let handles: Vec<_> = tints
        .into_iter()
        .map(|base_color| {
            materials.add(StandardMaterial {
                base_color,
                perceptual_roughness: 0.6,
                ..default()
            })
        })
        .collect();

    commands.insert_resource(BacteriaPalette { materials: handles });
}

pub fn chamber_center(config: &SimulationConfig) -> Vec3 {
    Vec3::new(config.chamber_width * 0.5, 0.0, config.chamber_height * 0.5)
}

/// Sim pose → Transform (капсула Bevy вдоль Y, кладём её в плоскость пола)
pub fn bacterium_transform(state: &BacteriumState) -> Transform {
    // rotation_x(π/2): ось капсулы Y → Z (= sim Y); затем поворот вокруг вертикали.
    // Sim-угол CCW в (x, y) соответствует -угол вокруг мировой Y.
    let rotation = Quat::from_rotation_y(-state.rotation) * Quat::from_rotation_x(FRAC_PI_2);

    Transform::from_translation(Vec3::new(state.position.x, state.radius, state.position.y))
        .with_rotation(rotation)
}

fn capsule_mesh(state: &BacteriumState) -> Mesh {
    // Capsule3d: длина цилиндрической части = 2 × half-length
    Mesh::from(Capsule3d::new(state.radius, 2.0 * state.length))
}

fn needs_remesh(rendered_length: f32, length: f32) -> bool {
    (length - rendered_length).abs() > rendered_length * REMESH_THRESHOLD
}

/// Пересобирает пол/стенки при смене размеров камеры (включая первый кадр)
fn sync_chamber_geometry(
    mut commands: Commands,
    simulation: Res<Simulation>,
    parts: Query<Entity, With<ChamberPart>>,
    mut built_for: Local<Option<(f32, f32)>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let config = simulation.config();
    let size = (config.chamber_width, config.chamber_height);
    if *built_for == Some(size) {
        return;
    }

    for entity in parts.iter() {
        commands.entity(entity).despawn();
    }

    let (width, height) = size;
    let center = chamber_center(config);

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::new(Vec3::Y, Vec2::new(width * 0.5, height * 0.5)))),
        MeshMaterial3d(materials.add(Color::srgb(0.12, 0.16, 0.22))),
        Transform::from_translation(center),
        ChamberPart,
    ));

    let wall_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.6, 0.75, 0.9, 0.35),
        alpha_mode: AlphaMode::Blend,
        ..default()
    });
    let half_wall = WALL_HEIGHT * 0.5;
    let walls = [
        // (size, position): вдоль X по краям y = 0 и y = height
        (Vec3::new(width, WALL_HEIGHT, WALL_THICKNESS), Vec3::new(center.x, half_wall, 0.0)),
        (Vec3::new(width, WALL_HEIGHT, WALL_THICKNESS), Vec3::new(center.x, half_wall, height)),
        // вдоль Z по краям x = 0 и x = width
        (Vec3::new(WALL_THICKNESS, WALL_HEIGHT, height), Vec3::new(0.0, half_wall, center.z)),
        (Vec3::new(WALL_THICKNESS, WALL_HEIGHT, height), Vec3::new(width, half_wall, center.z)),
    ];

    for (size, position) in walls {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::from_size(size))),
            MeshMaterial3d(wall_material.clone()),
            Transform::from_translation(position),
            ChamberPart,
        ));
    }

    *built_for = Some(size);
}

/// Reconcile пула мешей со snapshot registry
///
/// 1. despawn визуалов, чьих id больше нет
/// 2. spawn визуалов для новых id
/// 3. transform + размер капсулы для остальных
fn sync_bacteria_visuals(
    mut commands: Commands,
    simulation: Res<Simulation>,
    mut pool: ResMut<VisualPool>,
    mut visuals: Query<(&mut BacteriumVisual, &mut Transform)>,
    mut meshes: ResMut<Assets<Mesh>>,
    palette: Option<Res<BacteriaPalette>>,
) {
    let Some(palette) = palette else {
        return;
    };
    let snapshot = simulation.snapshot();

    pool.visuals.retain(|id, entity| {
        if snapshot.contains(*id) {
            true
        } else {
            commands.entity(*entity).despawn();
            false
        }
    });

    for (id, state) in snapshot.iter() {
        // Тело не читается: registry выселит его на следующем fixed tick
        if !state.position.is_finite() {
            continue;
        }
        let transform = bacterium_transform(&state);

        if let Some(&entity) = pool.visuals.get(&id) {
            let Ok((mut visual, mut current)) = visuals.get_mut(entity) else {
                continue; // spawn ещё не применён (Commands), обновим в следующем кадре
            };

            *current = transform;
            if needs_remesh(visual.rendered_length, state.length) {
                if let Some(mesh) = meshes.get_mut(&visual.mesh) {
                    *mesh = capsule_mesh(&state);
                }
                visual.rendered_length = state.length;
            }
        } else {
            let mesh = meshes.add(capsule_mesh(&state));
            let entity = commands
                .spawn((
                    Mesh3d(mesh.clone()),
                    MeshMaterial3d(palette.material_for(id)),
                    transform,
                    BacteriumVisual {
                        mesh,
                        rendered_length: state.length,
                    },
                ))
                .id();
            pool.visuals.insert(id, entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(rotation: f32) -> BacteriumState {
        BacteriumState {
            position: Vec2::new(10.0, 20.0),
            rotation,
            length: 1.0,
            radius: 0.5,
        }
    }

    #[test]
    fn test_transform_lies_on_chamber_floor() {
        let transform = bacterium_transform(&state(0.0));
        assert_eq!(transform.translation, Vec3::new(10.0, 0.5, 20.0));
    }

    #[test]
    fn test_unrotated_capsule_points_along_sim_y() {
        let transform = bacterium_transform(&state(0.0));
        let axis = transform.rotation * Vec3::Y;
        assert!((axis - Vec3::Z).length() < 1e-5, "axis = {:?}", axis);
    }

    #[test]
    fn test_quarter_turn_points_along_negative_sim_x() {
        // Sim: (0, 1) повернуть на +90° CCW → (-1, 0)
        let transform = bacterium_transform(&state(FRAC_PI_2));
        let axis = transform.rotation * Vec3::Y;
        assert!((axis - Vec3::NEG_X).length() < 1e-5, "axis = {:?}", axis);
    }

    #[test]
    fn test_remesh_threshold() {
        assert!(!needs_remesh(1.0, 1.005));
        assert!(needs_remesh(1.0, 1.02));
    }

    #[test]
    fn test_chamber_center() {
        let config = SimulationConfig::default();
        assert_eq!(chamber_center(&config), Vec3::new(50.0, 0.0, 30.0));
    }
}
