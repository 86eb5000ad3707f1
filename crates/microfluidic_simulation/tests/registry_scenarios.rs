//! Сценарии registry поверх настоящего Rapier world
//!
//! Проверяем:
//! - рост ×growth_rate за тик, без дрейфа и eviction внутри камеры
//! - eviction после выхода за границу
//! - teardown → пустой snapshot + NotInitialized
//! - property-based: id монотонны, boundary-предикат точен, length не убывает

use bevy::math::Vec2;
use microfluidic_simulation::*;
use proptest::prelude::*;

const WIDTH: f32 = 100.0;
const HEIGHT: f32 = 60.0;

/// Пустая камера 100×60 (без стартовой популяции)
fn empty_chamber() -> BacteriumRegistry {
    init_logger();
    let config = SimulationConfig {
        chamber_width: WIDTH,
        chamber_height: HEIGHT,
        initial_count: 0,
        ..Default::default()
    };
    BacteriumRegistry::initialized(config).expect("valid config")
}

/// Один кадр в порядке sync loop: boundaries → tick
fn frame(registry: &mut BacteriumRegistry) -> Vec<BacteriumId> {
    let evicted = registry.enforce_boundaries(WIDTH, HEIGHT);
    registry.tick();
    evicted
}

#[test]
fn test_three_bacteria_grow_uniformly_for_100_ticks() {
    let mut registry = empty_chamber();
    let radius = registry.config().bacterium_radius;

    let ids = [
        registry.spawn(Vec2::new(20.0, 30.0), radius).unwrap(),
        registry.spawn(Vec2::new(50.0, 15.0), radius).unwrap(),
        registry.spawn(Vec2::new(80.0, 45.0), radius).unwrap(),
    ];
    let initial: Vec<f32> = ids
        .iter()
        .map(|id| registry.snapshot().get(*id).unwrap().length)
        .collect();

    for _ in 0..100 {
        let evicted = frame(&mut registry);
        assert!(evicted.is_empty(), "unexpected eviction: {:?}", evicted);
    }

    let factor = 1.001f32.powi(100);
    for (id, start) in ids.iter().zip(initial) {
        let state = registry.snapshot().get(*id).expect("bacterium survived");
        let ratio = state.length / start;
        assert!(
            (ratio - factor).abs() < 1e-4,
            "bacterium {}: ratio {} != {}",
            id,
            ratio,
            factor
        );
        assert!(chamber_contains(WIDTH, HEIGHT, state.position));
    }

    assert_eq!(registry.population(), 3);
    assert_eq!(registry.tick_count(), 100);
}

#[test]
fn test_velocity_reset_prevents_drift() {
    let mut registry = empty_chamber();
    let id = registry.spawn(Vec2::new(50.0, 30.0), 0.5).unwrap();

    for _ in 0..100 {
        frame(&mut registry);
    }

    // Velocity обнуляется до каждого step → тело стоит на месте
    let position = registry.snapshot().get(id).unwrap().position;
    assert!(
        (position - Vec2::new(50.0, 30.0)).length() < 1e-3,
        "bacterium drifted to {:?}",
        position
    );
}

#[test]
fn test_bacterium_moved_outside_is_evicted() {
    let mut registry = empty_chamber();
    let id = registry.spawn(Vec2::new(5.0, 5.0), 0.5).unwrap();

    registry.teleport(id, Vec2::new(150.0, 5.0)).unwrap();
    let evicted = registry.enforce_boundaries(WIDTH, HEIGHT);

    assert_eq!(evicted, vec![id]);
    assert!(!registry.snapshot().contains(id));
    assert_eq!(registry.world().unwrap().body_count(), 0);
    assert_eq!(registry.world().unwrap().collider_count(), 0);
}

#[test]
fn test_teardown_then_spawn_fails() {
    let mut registry = empty_chamber();
    for i in 0..5 {
        registry.spawn(Vec2::new(10.0 + 10.0 * i as f32, 30.0), 0.5).unwrap();
    }

    registry.teardown();

    assert!(registry.snapshot().is_empty());
    assert_eq!(registry.snapshot().iter().count(), 0);
    assert_eq!(
        registry.spawn(Vec2::new(5.0, 5.0), 0.5),
        Err(SimulationError::NotInitialized)
    );
    assert_eq!(registry.tick(), TickStatus::Uninitialized);
    assert_eq!(registry.lifecycle(), Lifecycle::Destroyed);
}

#[test]
fn test_spawn_adds_exactly_one_entry() {
    let mut registry = empty_chamber();
    registry.spawn(Vec2::new(10.0, 10.0), 0.5).unwrap();
    let before: Vec<BacteriumId> = registry.snapshot().ids().collect();

    let id = registry.spawn(Vec2::new(40.0, 40.0), 0.7).unwrap();
    let after: Vec<BacteriumId> = registry.snapshot().ids().collect();

    assert_eq!(after.len(), before.len() + 1);
    assert!(!before.contains(&id));
    assert_eq!(
        registry.snapshot().get(id).unwrap().length,
        0.7 * INITIAL_HALF_LENGTH_RATIO
    );
}

#[test]
fn test_default_population_stays_consistent_with_engine() {
    init_logger();
    let mut registry: BacteriumRegistry =
        BacteriumRegistry::initialized(SimulationConfig::default()).unwrap();
    assert_eq!(registry.population(), SimulationConfig::default().initial_count);

    for _ in 0..300 {
        frame(&mut registry);
        // Инвариант 1:1: тел в engine ровно столько, сколько entries
        assert_eq!(registry.world().unwrap().body_count(), registry.population());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_spawn_ids_strictly_increase(
        positions in proptest::collection::vec((0.0f32..=WIDTH, 0.0f32..=HEIGHT), 1..30)
    ) {
        let mut registry = empty_chamber();

        let ids: Vec<BacteriumId> = positions
            .iter()
            .map(|(x, y)| registry.spawn(Vec2::new(*x, *y), 0.5).unwrap())
            .collect();

        for pair in ids.windows(2) {
            prop_assert!(pair[0] < pair[1], "ids not increasing: {:?}", ids);
        }
        prop_assert_eq!(registry.population(), ids.len());
    }

    #[test]
    fn prop_eviction_iff_outside(x in -50.0f32..150.0, y in -50.0f32..110.0) {
        let mut registry = empty_chamber();
        let id = registry.spawn(Vec2::new(50.0, 30.0), 0.5).unwrap();

        let target = Vec2::new(x, y);
        registry.teleport(id, target).unwrap();
        let evicted = registry.enforce_boundaries(WIDTH, HEIGHT);

        let inside = chamber_contains(WIDTH, HEIGHT, target);
        prop_assert_eq!(evicted.is_empty(), inside);
        prop_assert_eq!(registry.contains(id), inside);
    }

    #[test]
    fn prop_length_monotonic_and_frozen_when_paused(ticks in 1usize..50, paused_ticks in 1usize..20) {
        let mut registry = empty_chamber();
        let id = registry.spawn(Vec2::new(50.0, 30.0), 0.5).unwrap();

        let mut previous = registry.snapshot().get(id).unwrap().length;
        for _ in 0..ticks {
            registry.tick();
            let length = registry.snapshot().get(id).unwrap().length;
            prop_assert!(length > previous);
            previous = length;
        }

        registry.pause();
        for _ in 0..paused_ticks {
            prop_assert_eq!(registry.tick(), TickStatus::Paused);
        }
        prop_assert_eq!(registry.snapshot().get(id).unwrap().length, previous);
    }
}
