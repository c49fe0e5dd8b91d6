mod common;

use anyhow::Result;
use terrain_wfc::{
    generate, CollapseLog, GenerationConfig, GridPos, RuleSet, RunOutcome, SinkEvent,
    TerrainGenerator,
};

#[test]
fn fixture_config_loads_and_runs() -> Result<()> {
    let config = GenerationConfig::from_file(&common::fixture("test_generation_config.json"))?;
    assert_eq!((config.width, config.height), (24, 10));

    let rules = RuleSet::builtin();
    let compiled = rules.compile()?;
    let mut log = CollapseLog::new();
    let report = TerrainGenerator::new(&config, &rules)?.run(&mut log)?;

    assert_eq!(log.outcome(), Some(report.outcome));
    assert_eq!(report.metrics.pinned_collapses, 1);
    let (first, _) = log.collapses().next().expect("pin announced first");
    assert_eq!(first, GridPos::new(0, 0));

    match report.outcome {
        RunOutcome::Solved => {
            let map = report.map.expect("solved map");
            assert_eq!(map.verify(&compiled.adjacency), Ok(()));
            assert_eq!(map.render().lines().count(), 10);
            assert!(map.render().starts_with('~'));
        }
        RunOutcome::Contradiction { pos } => {
            assert!(log.events.contains(&SinkEvent::Contradiction { pos }));
        }
        RunOutcome::BudgetExhausted { .. } => panic!("fixture sets no budget"),
    }
    Ok(())
}

#[test]
fn file_rules_accept_aliases_and_mixed_case() -> Result<()> {
    let rules = RuleSet::from_file(&common::fixture("coastline_rules.json"))?;
    let compiled = rules.compile()?;
    assert_eq!(compiled.catalog.len(), 3);
    assert!(compiled.catalog.lookup("coast").is_some());

    for seed in 0..12 {
        let config = GenerationConfig {
            width: 16,
            height: 8,
            seed,
            ..GenerationConfig::default()
        };
        let report = generate(&config, &rules, &mut CollapseLog::new())?;
        if let Some(map) = report.map {
            assert_eq!(map.verify(&compiled.adjacency), Ok(()));
        }
    }
    Ok(())
}

#[test]
fn every_solved_builtin_map_is_consistent() -> Result<()> {
    let rules = RuleSet::builtin();
    let compiled = rules.compile()?;
    let mut solved = 0;
    for seed in 0..24 {
        let config = GenerationConfig {
            width: 20,
            height: 8,
            seed,
            ..GenerationConfig::default()
        };
        let report = generate(&config, &rules, &mut CollapseLog::new())?;
        if let Some(map) = report.map {
            solved += 1;
            assert_eq!(map.verify(&compiled.adjacency), Ok(()));
            let total: usize = map.histogram().iter().map(|(_, count)| count).sum();
            assert_eq!(total, 160);
        }
    }
    assert!(solved > 0);
    Ok(())
}
