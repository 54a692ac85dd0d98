//! Invariants that must hold on every step of full forest runs
//!
//! Runs every rule variant with lightning, growth and wind enabled and checks
//! conservation of cells, the water and burning invariants, counter accuracy
//! and seed determinism. With humidity a fire damped exactly to zero leaves the
//! burnt counter high until the next recount, so that counter is only an upper
//! bound there.

use ctor::ctor;
use forest_fire_core::{
    CellState, Features, ForestConfig, ForestState, GridDims, RiverShape, Wind, WindDirection,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn busy_config(features: Features) -> ForestConfig {
    ForestConfig {
        dims: GridDims::new(40, 30),
        tree_ratio: 0.6,
        humidity: 0.3,
        lightning: 0.002,
        new_growth: 0.05,
        wind: Wind::new(WindDirection::South, 2),
        features,
        river: RiverShape::Sine,
        river_width: 3,
        lakes: 2,
        lake_radius: 3,
        reconcile_interval: None,
        ..ForestConfig::default()
    }
}

fn variants() -> Vec<Features> {
    let mut all = Vec::new();
    for water in [false, true] {
        for aging in [false, true] {
            for humidity in [false, true] {
                all.push(Features {
                    water,
                    aging,
                    humidity,
                });
            }
        }
    }
    all
}

fn assert_invariants(forest: &ForestState, step: usize) {
    let dims = forest.dims();
    let stats = forest.stats();
    let land = (dims.cell_count() - forest.water_cell_count()) as f64;
    assert_eq!(
        stats.tree_count + stats.empty_count,
        land,
        "cell conservation broken at step {step}"
    );

    let mut burning = 0.0;
    for y in 0..dims.ny {
        for x in 0..dims.nx {
            let cell = forest.get_cell(x, y);
            if cell.is_water {
                assert_eq!((cell.tree_age, cell.burn_state), (0, 0), "water at ({x}, {y})");
            }
            if cell.burn_state > 0 {
                assert!(cell.tree_age > 0, "fire without tree at ({x}, {y})");
                burning += 1.0;
            }
            if !forest.config().features.humidity {
                assert!(cell.burn_state <= 1, "burn flag above 1 at ({x}, {y})");
            }
            assert!(cell.tree_age <= forest.config().effective_max_age());
        }
    }
    if forest.config().features.humidity {
        assert!(stats.burnt_count >= burning, "burning counter low at step {step}");
    } else {
        assert_eq!(stats.burnt_count, burning, "burning counter at step {step}");
    }
}

#[test]
fn test_invariants_hold_for_every_variant() {
    for (i, features) in variants().into_iter().enumerate() {
        let mut forest =
            ForestState::with_rng(busy_config(features), StdRng::seed_from_u64(100 + i as u64))
                .expect("valid config");
        assert_invariants(&forest, 0);

        for step in 1..=60 {
            forest.update();
            assert_invariants(&forest, step);
        }

        let drifted = forest.reconcile_counters();
        assert!(features.humidity || !drifted, "drift in {features:?}");
        let recounted = forest.stats();
        assert!(!forest.reconcile_counters());
        assert_eq!(forest.stats(), recounted);
    }
}

#[test]
fn test_water_never_changes() {
    let config = busy_config(Features::all());
    let mut forest = ForestState::with_rng(config, StdRng::seed_from_u64(7)).unwrap();
    let water_before = forest.water().clone();
    assert!(water_before.count() > 0);

    for _ in 0..40 {
        forest.update();
    }

    assert_eq!(forest.water(), &water_before);
    let dims = forest.dims();
    for y in 0..dims.ny {
        for x in 0..dims.nx {
            if water_before.is_water(x, y) {
                assert_eq!(forest.get_cell(x, y).state(), CellState::Water);
            }
        }
    }
}

#[test]
fn test_same_seed_same_history() {
    let config = busy_config(Features::all());
    let mut a = ForestState::with_rng(config.clone(), StdRng::seed_from_u64(2024)).unwrap();
    let mut b = ForestState::with_rng(config, StdRng::seed_from_u64(2024)).unwrap();

    for _ in 0..25 {
        a.update();
        b.update();
        assert_eq!(a.trees(), b.trees());
        assert_eq!(a.burning(), b.burning());
        assert_eq!(a.stats(), b.stats());
    }
}

#[test]
fn test_config_seed_is_reproducible() {
    let config = ForestConfig {
        seed: Some(99),
        ..busy_config(Features::default())
    };
    let mut a = ForestState::new(config.clone()).unwrap();
    let mut b = ForestState::new(config).unwrap();
    for _ in 0..10 {
        a.update();
        b.update();
    }
    assert_eq!(a.trees(), b.trees());
    assert_eq!(a.burning(), b.burning());
}

#[test]
fn test_runtime_parameter_changes_take_effect() {
    let config = ForestConfig {
        tree_ratio: 0.0,
        ..ForestConfig::quiet(10, 10)
    };
    let mut forest = ForestState::with_rng(config, StdRng::seed_from_u64(1)).unwrap();
    forest.update();
    assert_eq!(forest.stats().tree_count, 0.0);

    forest.set_new_growth(1.0).unwrap();
    forest.update();
    assert_eq!(forest.stats().tree_count, 100.0);

    forest.set_lightning(1.0).unwrap();
    forest.update();
    assert_eq!(forest.stats().burnt_count, 100.0);
}

#[test]
fn test_invalid_config_fails_fast() {
    let config = ForestConfig {
        wind: Wind::new(WindDirection::East, 5),
        ..ForestConfig::default()
    };
    assert!(ForestState::new(config).is_err());

    let config = ForestConfig {
        dims: GridDims::new(0, 0),
        ..ForestConfig::default()
    };
    assert!(ForestState::new(config).is_err());
}
