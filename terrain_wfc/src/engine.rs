//! Selection, collapse and propagation over a [`DomainGrid`].
//!
//! One top-level step picks the lowest-entropy open cell, collapses it with a
//! random draw, then propagates the change outward until every domain is
//! consistent with its neighbors again. Propagation is a FIFO worklist of dirty
//! cells; every enqueue follows a strict shrink of some domain, so the pass
//! always terminates.

use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::{
    adjacency::AdjacencyTable,
    candidate_set::CandidateSet,
    category::{CatalogError, Category, CategoryCatalog},
    direction::Direction,
    grid::{DomainGrid, GridError, GridPos},
    map::TerrainMap,
    metrics::RunMetrics,
    picker::{CategoryPicker, SeededPicker},
    sink::RenderSink,
};

const LOG_TARGET: &str = "terrain_wfc::engine";

/// What the engine does once a domain becomes empty. Both policies end the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionPolicy {
    /// Stop and report the offending cell.
    #[default]
    Abort,
    /// Tell the sink which cell failed so it can be marked, then stop.
    ReportAndStop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunBudget {
    pub max_steps: Option<u64>,
    pub time_limit: Option<Duration>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub on_contradiction: ContradictionPolicy,
    pub budget: RunBudget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Solved,
    Contradiction { pos: GridPos },
    BudgetExhausted { steps: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Finished(RunOutcome),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("adjacency table covers {table_len} categories but the catalog has {catalog_len}")]
    TableMismatch {
        catalog_len: usize,
        table_len: usize,
    },
    #[error("position {pos} is outside the {width}x{height} grid")]
    OutOfBounds { pos: GridPos, width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollapseKind {
    Initial,
    Random,
    Forced,
    Pinned,
}

pub struct CollapseEngine<P = SeededPicker> {
    catalog: Arc<CategoryCatalog>,
    adjacency: Arc<AdjacencyTable>,
    grid: DomainGrid,
    picker: P,
    options: RunOptions,
    state: RunState,
    initialized: bool,
    announced: Vec<bool>,
    worklist: VecDeque<GridPos>,
    metrics: RunMetrics,
    started_at: Option<Instant>,
}

impl<P: CategoryPicker> CollapseEngine<P> {
    /// Build an engine over a fresh `width` x `height` grid where every cell
    /// may still hold any catalog category.
    pub fn new(
        catalog: Arc<CategoryCatalog>,
        adjacency: Arc<AdjacencyTable>,
        width: u32,
        height: u32,
        picker: P,
        options: RunOptions,
    ) -> Result<Self, EngineError> {
        if catalog.is_empty() {
            return Err(CatalogError::Empty.into());
        }
        if adjacency.category_count() != catalog.len() {
            return Err(EngineError::TableMismatch {
                catalog_len: catalog.len(),
                table_len: adjacency.category_count(),
            });
        }
        let grid = DomainGrid::new(width, height, catalog.full_set())?;
        let cell_count = grid.cell_count();
        Ok(Self {
            catalog,
            adjacency,
            grid,
            picker,
            options,
            state: RunState::Running,
            initialized: false,
            announced: vec![false; cell_count],
            worklist: VecDeque::new(),
            metrics: RunMetrics::default(),
            started_at: None,
        })
    }

    pub fn catalog(&self) -> &Arc<CategoryCatalog> {
        &self.catalog
    }

    pub fn adjacency(&self) -> &Arc<AdjacencyTable> {
        &self.adjacency
    }

    pub fn grid(&self) -> &DomainGrid {
        &self.grid
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, RunState::Finished(_))
    }

    /// Solved output, if every cell has collapsed.
    pub fn map(&self) -> Option<TerrainMap> {
        TerrainMap::from_grid(&self.grid, Arc::clone(&self.catalog))
    }

    pub fn into_map(self) -> Option<TerrainMap> {
        TerrainMap::from_grid(&self.grid, self.catalog)
    }

    /// Lowest-entropy cell that has not collapsed yet, first in row-major
    /// order on ties. `None` means every cell holds exactly one category.
    ///
    /// This never consumes randomness.
    pub fn select_next(&self) -> Option<GridPos> {
        let mut best: Option<(u32, usize)> = None;
        for (index, domain) in self.grid.domains().iter().enumerate() {
            let entropy = domain.len();
            if entropy == 1 {
                continue;
            }
            if best.map_or(true, |(min, _)| entropy < min) {
                best = Some((entropy, index));
                if entropy == 0 {
                    break;
                }
            }
        }
        best.map(|(_, index)| self.grid.position_at(index))
    }

    /// Run steps until the engine reaches a terminal outcome.
    pub fn run(&mut self, sink: &mut dyn RenderSink) -> RunOutcome {
        loop {
            if let RunState::Finished(outcome) = self.step(sink) {
                return outcome;
            }
        }
    }

    /// One select/collapse/propagate cycle.
    pub fn step(&mut self, sink: &mut dyn RenderSink) -> RunState {
        if self.is_finished() {
            return self.state;
        }
        let started_at = *self.started_at.get_or_insert_with(Instant::now);
        if let Err(pos) = self.initialize(sink) {
            return self.contradiction(pos, sink);
        }

        let Some(selected) = self.select_next() else {
            return self.finish(RunOutcome::Solved, sink);
        };
        if self.grid.entropy(selected) == 0 {
            return self.contradiction(selected, sink);
        }

        let budget = self.options.budget;
        if budget.max_steps.is_some_and(|max| self.metrics.steps >= max)
            || budget
                .time_limit
                .is_some_and(|limit| started_at.elapsed() >= limit)
        {
            let steps = self.metrics.steps;
            return self.finish(RunOutcome::BudgetExhausted { steps }, sink);
        }

        let target = if self.metrics.steps == 0 && self.is_pristine() {
            let cell_count = self.grid.cell_count();
            let index = self.picker.pick_index(cell_count).min(cell_count - 1);
            self.grid.position_at(index)
        } else {
            selected
        };

        self.collapse(target, sink);
        self.metrics.steps += 1;
        if let Err(pos) = self.propagate(target, sink) {
            return self.contradiction(pos, sink);
        }
        self.state
    }

    /// Narrow the domain at `pos` by `mask` from outside the random loop, then
    /// propagate. A cell narrowed to one category counts as a pinned collapse.
    pub fn constrain(
        &mut self,
        pos: GridPos,
        mask: CandidateSet,
        sink: &mut dyn RenderSink,
    ) -> Result<RunState, EngineError> {
        self.check_bounds(pos)?;
        if self.is_finished() {
            return Ok(self.state);
        }
        self.started_at.get_or_insert_with(Instant::now);
        if let Err(failed) = self.initialize(sink) {
            return Ok(self.contradiction(failed, sink));
        }

        if !self.grid.intersect_narrow(pos, mask) {
            return Ok(self.state);
        }
        match self.grid.entropy(pos) {
            0 => return Ok(self.contradiction(pos, sink)),
            1 => self.announce(pos, CollapseKind::Pinned, sink),
            _ => {}
        }
        if let Err(failed) = self.propagate(pos, sink) {
            return Ok(self.contradiction(failed, sink));
        }
        Ok(self.state)
    }

    pub fn pin(
        &mut self,
        pos: GridPos,
        category: Category,
        sink: &mut dyn RenderSink,
    ) -> Result<RunState, EngineError> {
        self.constrain(pos, CandidateSet::single(category), sink)
    }

    /// Re-run propagation starting at `pos` and return how many domains shrank.
    ///
    /// On a grid that is already consistent this changes nothing. A domain
    /// emptied here finishes the run and is returned as the error.
    pub fn propagate_from(
        &mut self,
        pos: GridPos,
        sink: &mut dyn RenderSink,
    ) -> Result<u64, GridPos> {
        if self.is_finished() {
            return Ok(0);
        }
        let before = self.metrics.narrowings;
        match self.propagate(pos, sink) {
            Ok(()) => Ok(self.metrics.narrowings - before),
            Err(failed) => {
                self.contradiction(failed, sink);
                Err(failed)
            }
        }
    }

    fn collapse(&mut self, pos: GridPos, sink: &mut dyn RenderSink) {
        let domain = self.grid.domain(pos);
        let len = domain.len() as usize;
        let choice = self.picker.pick_index(len).min(len.saturating_sub(1));
        let Some(category) = domain.iter().nth(choice) else {
            return;
        };
        debug!(
            target: LOG_TARGET,
            x = pos.x,
            y = pos.y,
            entropy = domain.len(),
            category = self.catalog.name(category).unwrap_or("?"),
            "engine.step.collapse"
        );
        self.grid
            .intersect_narrow(pos, CandidateSet::single(category));
        self.announce(pos, CollapseKind::Random, sink);
    }

    /// Worklist arc-consistency pass seeded at `origin`.
    ///
    /// Stops at the first emptied domain without pushing it further; the
    /// emptied cell is returned so the caller can end the run there.
    fn propagate(&mut self, origin: GridPos, sink: &mut dyn RenderSink) -> Result<(), GridPos> {
        self.worklist.clear();
        self.worklist.push_back(origin);

        while let Some(pos) = self.worklist.pop_front() {
            self.metrics.propagation_visits += 1;
            let domain = self.grid.domain(pos);
            for direction in Direction::ALL {
                let Some(neighbor) = self.grid.neighbor(pos, direction) else {
                    continue;
                };
                let allowed = self.adjacency.allowed_around(domain, direction);
                if !self.grid.intersect_narrow(neighbor, allowed) {
                    continue;
                }
                self.metrics.narrowings += 1;
                match self.grid.entropy(neighbor) {
                    0 => {
                        self.worklist.clear();
                        return Err(neighbor);
                    }
                    1 => {
                        trace!(
                            target: LOG_TARGET,
                            x = neighbor.x,
                            y = neighbor.y,
                            from_x = pos.x,
                            from_y = pos.y,
                            "engine.propagate.forced"
                        );
                        self.announce(neighbor, CollapseKind::Forced, sink);
                    }
                    _ => {}
                }
                self.worklist.push_back(neighbor);
            }
        }
        Ok(())
    }

    fn announce(&mut self, pos: GridPos, kind: CollapseKind, sink: &mut dyn RenderSink) {
        let index = self.grid.index(pos);
        if self.announced[index] {
            return;
        }
        let Some(category) = self.grid.domain(pos).single_category() else {
            return;
        };
        self.announced[index] = true;
        match kind {
            CollapseKind::Initial => {}
            CollapseKind::Random => self.metrics.random_collapses += 1,
            CollapseKind::Forced => self.metrics.forced_collapses += 1,
            CollapseKind::Pinned => self.metrics.pinned_collapses += 1,
        }
        sink.on_cell_collapsed(pos, category);
    }

    /// Runs once, on the first call that touches the grid.
    ///
    /// With a one-category catalog every cell starts as a singleton, so no
    /// collapse would ever check it against the rules. Propagate from every
    /// cell first; a missing self-rule empties a neighbor and is returned.
    /// Surviving cells then get their single notification.
    fn initialize(&mut self, sink: &mut dyn RenderSink) -> Result<(), GridPos> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;
        if self.catalog.len() != 1 {
            return Ok(());
        }
        let positions: Vec<GridPos> = self.grid.positions().collect();
        for &pos in &positions {
            self.propagate(pos, sink)?;
        }
        for pos in positions {
            self.announce(pos, CollapseKind::Initial, sink);
        }
        Ok(())
    }

    fn is_pristine(&self) -> bool {
        let full = self.catalog.full_set();
        self.grid.domains().iter().all(|&domain| domain == full)
    }

    fn contradiction(&mut self, pos: GridPos, sink: &mut dyn RenderSink) -> RunState {
        warn!(
            target: LOG_TARGET,
            x = pos.x,
            y = pos.y,
            policy = ?self.options.on_contradiction,
            steps = self.metrics.steps,
            "engine.run.contradiction"
        );
        if self.options.on_contradiction == ContradictionPolicy::ReportAndStop {
            sink.on_contradiction(pos);
        }
        self.finish(RunOutcome::Contradiction { pos }, sink)
    }

    fn finish(&mut self, outcome: RunOutcome, sink: &mut dyn RenderSink) -> RunState {
        self.metrics.elapsed = self
            .started_at
            .map(|started| started.elapsed())
            .unwrap_or_default();
        self.state = RunState::Finished(outcome);
        info!(
            target: LOG_TARGET,
            outcome = ?outcome,
            width = self.grid.width(),
            height = self.grid.height(),
            steps = self.metrics.steps,
            random = self.metrics.random_collapses,
            forced = self.metrics.forced_collapses,
            pinned = self.metrics.pinned_collapses,
            visits = self.metrics.propagation_visits,
            elapsed_us = self.metrics.elapsed.as_micros() as u64,
            "engine.run.finished"
        );
        sink.on_run_finished(&outcome);
        self.state
    }

    fn check_bounds(&self, pos: GridPos) -> Result<(), EngineError> {
        if self.grid.contains(pos.x as i64, pos.y as i64) {
            Ok(())
        } else {
            Err(EngineError::OutOfBounds {
                pos,
                width: self.grid.width(),
                height: self.grid.height(),
            })
        }
    }
}
