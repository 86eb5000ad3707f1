//! Rapier 2D реализация `PhysicsWorld`
//!
//! Микрофлюидная камера вид сверху: гравитации нет, среда вязкая (damping).
//! Детерминизм: fixed dt + rapier `enhanced-determinism`.

use bevy::math::Vec2;
use rapier2d::na::vector;
use rapier2d::prelude::*;

use super::{PhysicsError, PhysicsResult, PhysicsWorld};

/// Вязкость среды — тела быстро теряют импульс после столкновений
const LINEAR_DAMPING: f32 = 2.0;
const ANGULAR_DAMPING: f32 = 2.0;

const FRICTION: f32 = 0.3;
const RESTITUTION: f32 = 0.1;

/// Handle одной бактерии в Rapier (тело + его capsule collider)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RapierHandle {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

pub struct RapierWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld for RapierWorld {
    type Handle = RapierHandle;

    fn new(timestep: f32) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = timestep;

        Self {
            gravity: vector![0.0, 0.0],
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    fn create_capsule_body(
        &mut self,
        position: Vec2,
        rotation: f32,
        half_length: f32,
        radius: f32,
    ) -> RapierHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y])
            .rotation(rotation)
            .linear_damping(LINEAR_DAMPING)
            .angular_damping(ANGULAR_DAMPING)
            .build();
        let body_handle = self.bodies.insert(body);

        let collider = ColliderBuilder::capsule_y(half_length, radius)
            .friction(FRICTION)
            .restitution(RESTITUTION)
            .build();
        let collider_handle = self
            .colliders
            .insert_with_parent(collider, body_handle, &mut self.bodies);

        RapierHandle {
            body: body_handle,
            collider: collider_handle,
        }
    }

    fn resize_capsule(&mut self, handle: RapierHandle, half_length: f32, radius: f32) -> PhysicsResult<()> {
        let collider = self
            .colliders
            .get_mut(handle.collider)
            .ok_or(PhysicsError::MissingCollider)?;
        // Mass properties пересчитываются Rapier'ом на следующем step
        collider.set_shape(SharedShape::capsule_y(half_length, radius));
        Ok(())
    }

    fn linear_velocity(&self, handle: RapierHandle) -> PhysicsResult<Vec2> {
        let body = self.bodies.get(handle.body).ok_or(PhysicsError::MissingBody)?;
        let linvel = body.linvel();
        Ok(Vec2::new(linvel.x, linvel.y))
    }

    fn set_linear_velocity(&mut self, handle: RapierHandle, velocity: Vec2) -> PhysicsResult<()> {
        let body = self
            .bodies
            .get_mut(handle.body)
            .ok_or(PhysicsError::MissingBody)?;
        body.set_linvel(vector![velocity.x, velocity.y], true);
        Ok(())
    }

    fn translation(&self, handle: RapierHandle) -> PhysicsResult<Vec2> {
        let body = self.bodies.get(handle.body).ok_or(PhysicsError::MissingBody)?;
        let translation = body.translation();
        Ok(Vec2::new(translation.x, translation.y))
    }

    fn set_translation(&mut self, handle: RapierHandle, position: Vec2) -> PhysicsResult<()> {
        let body = self
            .bodies
            .get_mut(handle.body)
            .ok_or(PhysicsError::MissingBody)?;
        body.set_translation(vector![position.x, position.y], true);
        Ok(())
    }

    fn rotation(&self, handle: RapierHandle) -> PhysicsResult<f32> {
        let body = self.bodies.get(handle.body).ok_or(PhysicsError::MissingBody)?;
        Ok(body.rotation().angle())
    }

    fn remove_collider(&mut self, handle: RapierHandle) -> PhysicsResult<()> {
        self.colliders
            .remove(handle.collider, &mut self.island_manager, &mut self.bodies, true)
            .map(|_| ())
            .ok_or(PhysicsError::MissingCollider)
    }

    fn remove_body(&mut self, handle: RapierHandle) -> PhysicsResult<()> {
        self.bodies
            .remove(
                handle.body,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true, // подчистить collider, если его удаление ранее провалилось
            )
            .map(|_| ())
            .ok_or(PhysicsError::MissingBody)
    }

    fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl RapierWorld {
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_query_body() {
        let mut world = RapierWorld::new(1.0 / 60.0);
        let handle = world.create_capsule_body(Vec2::new(10.0, 20.0), 0.0, 0.5, 0.5);

        assert_eq!(world.body_count(), 1);
        assert_eq!(world.collider_count(), 1);
        assert_eq!(world.translation(handle).unwrap(), Vec2::new(10.0, 20.0));
        assert!(world.rotation(handle).unwrap().abs() < 1e-6);
    }

    #[test]
    fn test_zero_velocity_body_stays_put() {
        let mut world = RapierWorld::new(1.0 / 60.0);
        let handle = world.create_capsule_body(Vec2::new(5.0, 5.0), 0.0, 0.5, 0.5);
        world.set_linear_velocity(handle, Vec2::ZERO).unwrap();

        for _ in 0..60 {
            world.step();
        }

        // Без гравитации и скорости тело не двигается
        let position = world.translation(handle).unwrap();
        assert!((position - Vec2::new(5.0, 5.0)).length() < 1e-4, "position = {:?}", position);
    }

    #[test]
    fn test_velocity_moves_body() {
        let mut world = RapierWorld::new(1.0 / 60.0);
        let handle = world.create_capsule_body(Vec2::new(5.0, 5.0), 0.0, 0.5, 0.5);
        world.set_linear_velocity(handle, Vec2::new(1.0, 0.0)).unwrap();

        world.step();

        let position = world.translation(handle).unwrap();
        assert!(position.x > 5.0, "position = {:?}", position);
    }

    #[test]
    fn test_remove_collider_then_body() {
        let mut world = RapierWorld::new(1.0 / 60.0);
        let handle = world.create_capsule_body(Vec2::new(1.0, 1.0), 0.0, 0.5, 0.5);

        assert!(world.remove_collider(handle).is_ok());
        assert_eq!(world.collider_count(), 0);
        assert!(world.remove_body(handle).is_ok());
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_double_remove_reports_missing() {
        let mut world = RapierWorld::new(1.0 / 60.0);
        let handle = world.create_capsule_body(Vec2::new(1.0, 1.0), 0.0, 0.5, 0.5);

        world.remove_collider(handle).unwrap();
        world.remove_body(handle).unwrap();

        assert_eq!(world.remove_collider(handle), Err(PhysicsError::MissingCollider));
        assert_eq!(world.remove_body(handle), Err(PhysicsError::MissingBody));
        assert_eq!(world.translation(handle), Err(PhysicsError::MissingBody));
        assert_eq!(
            world.resize_capsule(handle, 1.0, 0.5),
            Err(PhysicsError::MissingCollider)
        );
    }

    #[test]
    fn test_teleport_body() {
        let mut world = RapierWorld::new(1.0 / 60.0);
        let handle = world.create_capsule_body(Vec2::new(5.0, 5.0), 0.0, 0.5, 0.5);

        world.set_translation(handle, Vec2::new(150.0, 5.0)).unwrap();

        assert_eq!(world.translation(handle).unwrap(), Vec2::new(150.0, 5.0));
    }
}
