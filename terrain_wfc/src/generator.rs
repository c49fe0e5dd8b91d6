use std::sync::Arc;

use thiserror::Error;

use crate::{
    candidate_set::CandidateSet,
    config::GenerationConfig,
    engine::{CollapseEngine, EngineError, RunOutcome, RunState},
    grid::GridPos,
    map::TerrainMap,
    metrics::RunMetrics,
    picker::SeededPicker,
    rule_set::{CompiledRules, RuleSet, RuleSetError},
    sink::RenderSink,
};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Rules(#[from] RuleSetError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("pin at {pos} names undeclared category '{category}'")]
    UnknownPinCategory { pos: GridPos, category: String },
}

/// Result of one full generation pass.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub outcome: RunOutcome,
    pub map: Option<TerrainMap>,
    pub metrics: RunMetrics,
}

/// Engine seeded from a [`GenerationConfig`] with its pins resolved.
pub struct TerrainGenerator {
    engine: CollapseEngine,
    pins: Vec<(GridPos, CandidateSet)>,
}

impl TerrainGenerator {
    pub fn new(config: &GenerationConfig, rules: &RuleSet) -> Result<Self, BuildError> {
        let compiled = rules.compile()?;
        Self::from_compiled(config, compiled)
    }

    pub fn from_compiled(
        config: &GenerationConfig,
        compiled: CompiledRules,
    ) -> Result<Self, BuildError> {
        let CompiledRules { catalog, adjacency } = compiled;

        let mut pins = Vec::with_capacity(config.pins.len());
        for pin in &config.pins {
            let pos = GridPos::new(pin.x, pin.y);
            if pin.x >= config.width || pin.y >= config.height {
                return Err(EngineError::OutOfBounds {
                    pos,
                    width: config.width,
                    height: config.height,
                }
                .into());
            }
            let category = catalog
                .lookup(&pin.category.to_ascii_lowercase())
                .ok_or_else(|| BuildError::UnknownPinCategory {
                    pos,
                    category: pin.category.clone(),
                })?;
            pins.push((pos, CandidateSet::single(category)));
        }

        let engine = CollapseEngine::new(
            Arc::clone(&catalog),
            adjacency,
            config.width,
            config.height,
            SeededPicker::from_seed(config.seed),
            config.run_options(),
        )?;
        Ok(Self { engine, pins })
    }

    pub fn engine(&self) -> &CollapseEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut CollapseEngine {
        &mut self.engine
    }

    /// Apply pins, run to a terminal outcome and collect the output.
    pub fn run(mut self, sink: &mut dyn RenderSink) -> Result<GenerationReport, BuildError> {
        for (pos, mask) in std::mem::take(&mut self.pins) {
            if let RunState::Finished(_) = self.engine.constrain(pos, mask, sink)? {
                break;
            }
        }
        let outcome = self.engine.run(sink);
        let metrics = self.engine.metrics().clone();
        let map = self.engine.into_map();
        Ok(GenerationReport {
            outcome,
            map,
            metrics,
        })
    }
}

/// Compile `rules`, build the engine from `config` and run it once.
pub fn generate(
    config: &GenerationConfig,
    rules: &RuleSet,
    sink: &mut dyn RenderSink,
) -> Result<GenerationReport, BuildError> {
    TerrainGenerator::new(config, rules)?.run(sink)
}
