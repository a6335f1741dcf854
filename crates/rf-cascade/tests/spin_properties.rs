//! Spin Resolution Property Tests
//!
//! Runs the standard engine across many seeds and checks:
//! - Grid completeness and cluster membership
//! - Progressive and accumulated multiplier behaviour
//! - Reproducibility and the serialized record shape

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rf_cascade::{COLS, CascadeEngine, GameConfig, Grid, ROWS, SpinRequest, SpinResult};

const SEEDS: u64 = 300;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assert_grid_complete(engine: &CascadeEngine, grid: &Grid) {
    assert_eq!(grid.rows().len(), ROWS);
    for row in grid.rows() {
        assert_eq!(row.len(), COLS);
        for cell in row {
            assert!(engine.catalog().contains(cell.id()), "unknown symbol {}", cell.id());
        }
    }
}

fn assert_clusters_well_formed(result: &SpinResult) {
    for step in &result.cascades {
        assert!(!step.clusters.is_empty());
        for cluster in &step.clusters {
            assert!(cluster.size >= 6);
            assert_eq!(cluster.size, cluster.positions.len());
            for &pos in &cluster.positions {
                let cell = step.grid.get(pos);
                assert!(
                    cell.id() == cluster.symbol_id || cell.symbol.is_wild(),
                    "{} inside a {} cluster",
                    cell.id(),
                    cluster.symbol_id
                );
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BASE GAME
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_base_game_properties() {
    init_logging();
    let engine = CascadeEngine::standard();

    for seed in 0..SEEDS {
        let result = engine.resolve_seeded(&SpinRequest::base(1.0), seed).unwrap();
        assert_grid_complete(&engine, &result.grid);
        assert_clusters_well_formed(&result);

        for (i, step) in result.cascades.iter().enumerate() {
            assert_eq!(step.progressive_multiplier as usize, i + 1);
            assert_eq!(step.accumulated_multiplier, None);
            assert_grid_complete(&engine, &step.grid);
        }

        let summed: f64 = result.cascades.iter().map(|s| s.win).sum();
        assert!((result.total_win - summed).abs() < 1e-9);
        assert_eq!(result.accumulated_multiplier, 1.0);
        assert!(result.sticky_wilds.is_empty());
        assert_eq!(result.retriggered_free_spins, 0);
        assert!(!result.cascade_cap_reached);
    }
}

#[test]
fn test_scatter_awards_follow_count() {
    let engine = CascadeEngine::standard();

    for seed in 0..SEEDS {
        let result = engine.resolve_seeded(&SpinRequest::base(1.0), seed).unwrap();
        let expected = if result.scatter_count >= 3 { 10 } else { 0 };
        assert_eq!(result.triggered_free_spins, expected);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BONUS MODE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_bonus_multiplier_never_decreases() {
    init_logging();
    let engine = CascadeEngine::standard();

    for seed in 0..SEEDS {
        let carried = 1.0 + (seed % 4) as f64;
        let result = engine
            .resolve_seeded(&SpinRequest::bonus(1.0, carried), seed)
            .unwrap();
        assert_clusters_well_formed(&result);

        let mut previous = carried;
        for step in &result.cascades {
            let accumulated = step.accumulated_multiplier.unwrap();
            assert!(accumulated >= previous);
            previous = accumulated;
        }
        assert_eq!(result.accumulated_multiplier, previous);
        assert_eq!(result.triggered_free_spins, 0);

        for &pos in &result.sticky_wilds {
            assert!(result.grid.get(pos).symbol.is_wild());
        }
    }
}

#[test]
fn test_bonus_sequence_carries_multiplier() {
    let engine = CascadeEngine::standard();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut carried = 1.0;
    let mut remaining = 10u32;
    let mut played = 0;

    let first = SpinRequest::bonus(1.0, carried).with_guaranteed_win();
    let mut request = first;
    while remaining > 0 && played < 100 {
        let result = engine.resolve_spin(&request, &mut rng).unwrap();
        if played == 0 {
            assert!(result.is_win());
        }
        assert!(result.accumulated_multiplier >= carried);

        carried = result.accumulated_multiplier;
        remaining = remaining - 1 + result.retriggered_free_spins;
        played += 1;
        request = SpinRequest::bonus(1.0, carried);
    }
    assert!(played >= 10);
}

// ═══════════════════════════════════════════════════════════════════════════════
// DETERMINISM & OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_same_seed_same_result() {
    let engine = CascadeEngine::standard();
    for seed in [0, 1, 99, 12_345] {
        for request in [SpinRequest::base(2.0), SpinRequest::bonus(0.5, 3.0)] {
            let a = engine.resolve_seeded(&request, seed).unwrap();
            let b = engine.resolve_seeded(&request, seed).unwrap();
            assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
        }
    }
}

#[test]
fn test_concurrent_spins_need_only_their_own_rng() {
    let engine = CascadeEngine::standard();
    let expected: Vec<_> = (0..8)
        .map(|seed| engine.resolve_seeded(&SpinRequest::base(1.0), seed).unwrap().total_win)
        .collect();

    let actual: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|seed| {
                let engine = &engine;
                scope.spawn(move || {
                    engine
                        .resolve_seeded(&SpinRequest::base(1.0), seed)
                        .unwrap()
                        .total_win
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(actual, expected);
}

#[test]
fn test_result_json_shape() {
    let engine = CascadeEngine::standard();
    let request = SpinRequest::bonus(1.0, 1.0).with_guaranteed_win();
    let json = engine.resolve_seeded(&request, 3).unwrap().to_json().unwrap();

    let grid = json["grid"].as_array().unwrap();
    assert_eq!(grid.len(), ROWS);
    let cell = &grid[0][0];
    assert!(cell["id"].is_string());
    assert!(cell["uniqueId"].is_u64());
    assert!(cell["name"].is_string());

    for key in [
        "totalWin",
        "winRatio",
        "scatterCount",
        "triggeredFreeSpins",
        "retriggeredFreeSpins",
        "chestTransforms",
        "stickyWilds",
        "accumulatedMultiplier",
        "cascadeCapReached",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }

    let step = &json["cascades"][0];
    assert_eq!(step["index"], 0);
    assert_eq!(step["progressiveMultiplier"], 1);
    assert!(step["accumulatedMultiplier"].is_number());
    let position = &step["clusters"][0]["positions"][0];
    assert_eq!(position.as_array().unwrap().len(), 2);
}

#[test]
fn test_engine_from_yaml_config() {
    let yaml = r#"
rules:
  min_cluster_size: 8
  max_cascades: 5
"#;
    let config = GameConfig::from_yaml(yaml).unwrap();
    let engine = CascadeEngine::new(config).unwrap();
    assert_eq!(engine.config().rules.min_cluster_size, 8);

    for seed in 0..100 {
        let result = engine.resolve_seeded(&SpinRequest::base(1.0), seed).unwrap();
        assert!(result.cascade_count() <= 5);
        for step in &result.cascades {
            assert!(step.clusters.iter().all(|c| c.size >= 8));
        }
    }
}
