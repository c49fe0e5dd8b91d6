use std::sync::Arc;

use terrain_wfc::{
    AdjacencyTable, CandidateSet, CategoryCatalog, CollapseEngine, CollapseLog, Direction,
    GridPos, NullSink, RuleSet, RunOptions, RunOutcome, RunState, SeededPicker,
};

fn chain_ab() -> (Arc<CategoryCatalog>, Arc<AdjacencyTable>) {
    let catalog = CategoryCatalog::from_names(["a", "b"]).unwrap();
    let a = catalog.lookup("a").unwrap();
    let b = catalog.lookup("b").unwrap();
    let mut table = AdjacencyTable::new(&catalog);
    table.declare_rule(a, b, Direction::Right).unwrap();
    (Arc::new(catalog), Arc::new(table))
}

fn permissive(names: &[&str]) -> (Arc<CategoryCatalog>, Arc<AdjacencyTable>) {
    let catalog = CategoryCatalog::from_names(names.iter().copied()).unwrap();
    let mut table = AdjacencyTable::new(&catalog);
    for a in catalog.categories() {
        for b in catalog.categories() {
            for direction in Direction::ALL {
                table.declare_rule(a, b, direction).unwrap();
            }
        }
    }
    (Arc::new(catalog), Arc::new(table))
}

fn builtin_engine(width: u32, height: u32, seed: u64) -> CollapseEngine {
    let compiled = RuleSet::builtin().compile().unwrap();
    CollapseEngine::new(
        compiled.catalog,
        compiled.adjacency,
        width,
        height,
        SeededPicker::from_seed(seed),
        RunOptions::default(),
    )
    .unwrap()
}

#[test]
fn two_cell_chain_solves_as_ab_or_fails_opposite_the_start() {
    let (catalog, table) = chain_ab();
    let mut solved = 0;
    let mut failed = 0;
    for seed in 0..64 {
        let mut engine = CollapseEngine::new(
            Arc::clone(&catalog),
            Arc::clone(&table),
            2,
            1,
            SeededPicker::from_seed(seed),
            RunOptions::default(),
        )
        .unwrap();
        let mut log = CollapseLog::new();
        match engine.run(&mut log) {
            RunOutcome::Solved => {
                solved += 1;
                let map = engine.map().unwrap();
                assert_eq!(map.render(), "ab");
                assert_eq!(log.collapses().count(), 2);
            }
            RunOutcome::Contradiction { pos } => {
                failed += 1;
                let (start, _) = log.collapses().next().unwrap();
                assert_ne!(pos, start);
                assert_eq!(log.collapses().count(), 1);
            }
            RunOutcome::BudgetExhausted { .. } => panic!("no budget configured"),
        }
    }
    assert!(solved > 0 && failed > 0);
}

#[test]
fn self_only_rules_fill_uniformly() {
    let catalog = CategoryCatalog::from_names(["a", "b", "c"]).unwrap();
    let mut table = AdjacencyTable::new(&catalog);
    for category in catalog.categories() {
        for direction in Direction::ALL {
            table.declare_rule(category, category, direction).unwrap();
        }
    }
    let (catalog, table) = (Arc::new(catalog), Arc::new(table));

    let mut fills = Vec::new();
    for seed in 0..12 {
        let mut engine = CollapseEngine::new(
            Arc::clone(&catalog),
            Arc::clone(&table),
            5,
            4,
            SeededPicker::from_seed(seed),
            RunOptions::default(),
        )
        .unwrap();
        let mut log = CollapseLog::new();
        assert_eq!(engine.run(&mut log), RunOutcome::Solved);
        assert_eq!(log.collapses().count(), 20);
        assert_eq!(engine.metrics().steps, 1);

        let map = engine.map().unwrap();
        let first = map.cells()[0];
        assert!(map.cells().iter().all(|&category| category == first));
        fills.push(first);
    }
    fills.sort();
    fills.dedup();
    assert!(fills.len() > 1, "every seed filled with {:?}", fills);
}

#[test]
fn single_category_notifies_every_cell_once() {
    let (catalog, table) = permissive(&["grass"]);
    let mut engine = CollapseEngine::new(
        catalog,
        table,
        4,
        3,
        SeededPicker::from_seed(0),
        RunOptions::default(),
    )
    .unwrap();
    let mut log = CollapseLog::new();
    assert_eq!(engine.run(&mut log), RunOutcome::Solved);

    let mut seen: Vec<GridPos> = log.collapses().map(|(pos, _)| pos).collect();
    seen.sort_by_key(|pos| (pos.y, pos.x));
    seen.dedup();
    assert_eq!(seen.len(), 12);
    assert_eq!(log.collapses().count(), 12);
}

#[test]
fn lowest_entropy_cell_is_chosen_regardless_of_seed() {
    let (catalog, table) = permissive(&["a", "b", "c"]);
    let a = catalog.lookup("a").unwrap();
    let b = catalog.lookup("b").unwrap();
    for seed in 0..8 {
        let mut engine = CollapseEngine::new(
            Arc::clone(&catalog),
            Arc::clone(&table),
            3,
            1,
            SeededPicker::from_seed(seed),
            RunOptions::default(),
        )
        .unwrap();
        let mut log = CollapseLog::new();
        engine.pin(GridPos::new(0, 0), a, &mut log).unwrap();
        engine
            .constrain(
                GridPos::new(1, 0),
                CandidateSet::single(a).with(b),
                &mut log,
            )
            .unwrap();
        assert_eq!(engine.grid().entropy(GridPos::new(2, 0)), 3);
        assert_eq!(engine.select_next(), Some(GridPos::new(1, 0)));

        engine.step(&mut log);
        let (pos, category) = log.collapses().nth(1).unwrap();
        assert_eq!(pos, GridPos::new(1, 0));
        assert!(category == a || category == b);
    }
}

#[test]
fn domains_only_shrink_across_steps() {
    let mut engine = builtin_engine(10, 6, 5);
    let mut previous = engine.grid().domains().to_vec();
    while let RunState::Running = engine.step(&mut NullSink) {
        let current = engine.grid().domains();
        for (before, after) in previous.iter().zip(current) {
            assert_eq!(after.intersect(*before), *after);
        }
        previous = current.to_vec();
    }
}

#[test]
fn propagation_is_a_no_op_on_a_consistent_grid() {
    for seed in 0..8 {
        let mut engine = builtin_engine(8, 5, seed);
        if engine.step(&mut NullSink) != RunState::Running {
            continue;
        }
        let before = engine.grid().domains().to_vec();
        let positions: Vec<GridPos> = engine.grid().positions().collect();
        for pos in positions {
            assert_eq!(engine.propagate_from(pos, &mut NullSink), Ok(0));
        }
        assert_eq!(engine.grid().domains(), &before[..]);
    }
}

#[test]
fn runs_terminate_within_one_step_per_cell() {
    for seed in 0..16 {
        let mut engine = builtin_engine(12, 7, seed);
        let outcome = engine.run(&mut NullSink);
        assert!(engine.metrics().steps <= 12 * 7, "seed {seed}: {outcome:?}");
        if outcome == RunOutcome::Solved {
            let map = engine.map().unwrap();
            assert_eq!(map.verify(engine.adjacency()), Ok(()));
        }
    }
}

#[test]
fn redeclaring_rules_changes_nothing() {
    let (catalog, table) = chain_ab();
    let mut again = (*table).clone();
    let a = catalog.lookup("a").unwrap();
    let b = catalog.lookup("b").unwrap();
    again.declare_rule(a, b, Direction::Right).unwrap();
    again.declare_rule(b, a, Direction::Left).unwrap();
    for category in catalog.categories() {
        for direction in Direction::ALL {
            assert_eq!(
                again.compatible_set(category, direction),
                table.compatible_set(category, direction)
            );
        }
    }
}
