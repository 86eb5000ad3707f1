//! Snapshot — read-only view registry для render layer
//!
//! Не копия: позиции/повороты читаются из physics world при обращении.
//! Entry с нечитаемым телом отдаётся с NaN позой (и будет выселена
//! следующим enforce_boundaries), так что `iter().count() == len()`.
//! Lifetime привязан к borrow registry, поэтому удержать snapshot
//! между кадрами нельзя.

use bevy::math::Vec2;

use crate::physics::PhysicsWorld;

use super::components::{BacteriumEntry, BacteriumId, BacteriumState};
use super::registry::BacteriumRegistry;

pub struct Snapshot<'a, P: PhysicsWorld> {
    registry: &'a BacteriumRegistry<P>,
}

impl<'a, P: PhysicsWorld> Snapshot<'a, P> {
    pub(crate) fn new(registry: &'a BacteriumRegistry<P>) -> Self {
        Self { registry }
    }

    pub fn len(&self) -> usize {
        self.registry.population()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: BacteriumId) -> bool {
        self.registry.contains(id)
    }

    pub fn get(&self, id: BacteriumId) -> Option<BacteriumState> {
        self.registry.entries().get(&id).map(|entry| self.project(entry))
    }

    /// Все живые бактерии в порядке возрастания id
    pub fn iter(&self) -> impl Iterator<Item = (BacteriumId, BacteriumState)> + '_ {
        self.registry
            .entries()
            .values()
            .map(move |entry| (entry.id, self.project(entry)))
    }

    pub fn ids(&self) -> impl Iterator<Item = BacteriumId> + '_ {
        self.registry.entries().keys().copied()
    }

    /// Owned копия (для тестов детерминизма и логов, не для рендера)
    pub fn to_vec(&self) -> Vec<(BacteriumId, BacteriumState)> {
        self.iter().collect()
    }

    fn project(&self, entry: &BacteriumEntry<P::Handle>) -> BacteriumState {
        let world = self.registry.world();
        let position = world
            .and_then(|world| world.translation(entry.handle).ok())
            .unwrap_or(Vec2::NAN);
        let rotation = world
            .and_then(|world| world.rotation(entry.handle).ok())
            .unwrap_or(f32::NAN);

        BacteriumState {
            position,
            rotation,
            length: entry.length,
            radius: entry.radius,
        }
    }
}
