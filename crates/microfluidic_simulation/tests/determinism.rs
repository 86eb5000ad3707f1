//! Тесты детерминизма
//!
//! Проверяем что симуляция с одинаковым seed даёт идентичные snapshots

use microfluidic_simulation::*;

/// Прогоняет registry и возвращает owned snapshot
fn run_simulation(seed: u64, tick_count: usize) -> Vec<(BacteriumId, BacteriumState)> {
    init_logger();
    let config = SimulationConfig {
        seed,
        initial_count: 40, // плотнее → есть столкновения
        ..Default::default()
    };
    let mut registry: BacteriumRegistry = BacteriumRegistry::initialized(config).unwrap();
    let (width, height) = (registry.config().chamber_width, registry.config().chamber_height);

    for _ in 0..tick_count {
        registry.enforce_boundaries(width, height);
        registry.tick();
    }

    registry.snapshot().to_vec()
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;
    const TICK_COUNT: usize = 300;

    let snapshot1 = run_simulation(SEED, TICK_COUNT);
    let snapshot2 = run_simulation(SEED, TICK_COUNT);

    assert!(!snapshot1.is_empty());
    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const TICK_COUNT: usize = 200;

    // Запускаем 5 раз — все должны быть идентичны
    let snapshots: Vec<_> = (0..5).map(|_| run_simulation(SEED, TICK_COUNT)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}

#[test]
fn test_different_seeds_differ() {
    let snapshot1 = run_simulation(1, 10);
    let snapshot2 = run_simulation(2, 10);

    // Стартовые позиции зависят от seed
    assert_ne!(snapshot1, snapshot2);
}

#[test]
fn test_headless_app_determinism() {
    fn run_app(seed: u64) -> Vec<(BacteriumId, BacteriumState)> {
        let mut app = create_headless_app(SimulationConfig {
            seed,
            ..Default::default()
        });
        for _ in 0..120 {
            run_fixed_tick(&mut app);
        }
        app.world().resource::<Simulation>().snapshot().to_vec()
    }

    assert_eq!(run_app(7), run_app(7));
}
