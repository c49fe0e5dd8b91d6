//! Constraint-propagation terrain generator.
//!
//! Fills a fixed-size grid with terrain categories so that every pair of
//! axis-adjacent cells satisfies a declared directional rule. Cells collapse in
//! lowest-entropy order and each collapse is propagated through the grid
//! before the next one; see [`CollapseEngine`] for the full cycle.

mod adjacency;
mod candidate_set;
mod category;
pub mod config;
mod direction;
mod engine;
mod generator;
mod grid;
pub mod hashing;
mod map;
pub mod metrics;
mod picker;
pub mod rule_set;
mod sink;

pub use adjacency::{AdjacencyError, AdjacencyRule, AdjacencyTable};
pub use candidate_set::{CandidateIter, CandidateSet};
pub use category::{CatalogError, Category, CategoryCatalog, CategoryEntry};
pub use config::{load_generation_config_from_env, GenerationConfig, GenerationConfigError, PinConfig};
pub use direction::Direction;
pub use engine::{
    CollapseEngine, ContradictionPolicy, EngineError, RunBudget, RunOptions, RunOutcome, RunState,
};
pub use generator::{generate, BuildError, GenerationReport, TerrainGenerator};
pub use grid::{DomainGrid, GridError, GridPos};
pub use map::{ConsistencyViolation, TerrainMap};
pub use metrics::RunMetrics;
pub use picker::{CategoryPicker, SeededPicker};
pub use rule_set::{load_rule_set, CompiledRules, RuleSet, RuleSetError};
pub use sink::{CollapseLog, NullSink, RenderSink, SinkEvent};
