//! Rule authoring input: the category list and adjacency declarations.
//!
//! Loaded from `terrain_rules.json` with support for an environment variable
//! override. Category ids are case-insensitive and normalised to lowercase.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    adjacency::{AdjacencyError, AdjacencyTable},
    category::{CatalogError, CategoryCatalog},
    direction::Direction,
};

pub const BUILTIN_TERRAIN_RULES: &str = include_str!("data/terrain_rules.json");

pub const RULES_PATH_ENV: &str = "TERRAIN_WFC_RULES_PATH";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub version: u32,
    pub categories: Vec<CategoryDecl>,
    pub rules: Vec<RuleDecl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDecl {
    pub id: String,
    #[serde(default)]
    pub glyph: Option<char>,
}

/// `b` may sit in `direction` from `a`; the mirror is implied.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDecl {
    pub a: String,
    pub b: String,
    pub direction: Direction,
}

/// Catalog and rule table ready to hand to the engine.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub catalog: Arc<CategoryCatalog>,
    pub adjacency: Arc<AdjacencyTable>,
}

#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("failed to parse terrain rule set: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read terrain rule set from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("rule {rule_index} references undeclared category '{category}'")]
    UnknownCategory { rule_index: usize, category: String },
    #[error(transparent)]
    Adjacency(#[from] AdjacencyError),
}

impl RuleSet {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            Self::from_json_str(BUILTIN_TERRAIN_RULES)
                .expect("builtin terrain rule set should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, RuleSetError> {
        let mut rule_set: RuleSet = serde_json::from_str(json)?;
        rule_set.normalize();
        Ok(rule_set)
    }

    pub fn from_file(path: &Path) -> Result<Self, RuleSetError> {
        let contents = fs::read_to_string(path).map_err(|source| RuleSetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    fn normalize(&mut self) {
        self.categories
            .iter_mut()
            .for_each(|category| category.id.make_ascii_lowercase());
        for rule in &mut self.rules {
            rule.a.make_ascii_lowercase();
            rule.b.make_ascii_lowercase();
        }
    }

    /// Register every category and declare every rule, failing on the first
    /// configuration error.
    pub fn compile(&self) -> Result<CompiledRules, RuleSetError> {
        let mut catalog = CategoryCatalog::new();
        for decl in &self.categories {
            match decl.glyph {
                Some(glyph) => catalog.register_with_glyph(&decl.id, glyph)?,
                None => catalog.register(&decl.id)?,
            };
        }
        if catalog.is_empty() {
            return Err(CatalogError::Empty.into());
        }

        let mut adjacency = AdjacencyTable::new(&catalog);
        for (rule_index, rule) in self.rules.iter().enumerate() {
            let resolve = |name: &str| {
                catalog
                    .lookup(name)
                    .ok_or_else(|| RuleSetError::UnknownCategory {
                        rule_index,
                        category: name.to_string(),
                    })
            };
            let a = resolve(&rule.a)?;
            let b = resolve(&rule.b)?;
            adjacency.declare_rule(a, b, rule.direction)?;
        }

        Ok(CompiledRules {
            catalog: Arc::new(catalog),
            adjacency: Arc::new(adjacency),
        })
    }
}

/// Load the rule set from `explicit`, then the environment override, then the
/// builtin copy. Returns the path actually used, if any.
pub fn load_rule_set(explicit: Option<&Path>) -> (Arc<RuleSet>, Option<PathBuf>) {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var(RULES_PATH_ENV).ok().map(PathBuf::from));

    if let Some(path) = path {
        match RuleSet::from_file(&path) {
            Ok(rule_set) => {
                tracing::info!(
                    target: "terrain_wfc::config",
                    path = %path.display(),
                    categories = rule_set.categories.len(),
                    rules = rule_set.rules.len(),
                    "rule_set.loaded=file"
                );
                return (Arc::new(rule_set), Some(path));
            }
            Err(err) => {
                tracing::warn!(
                    target: "terrain_wfc::config",
                    path = %path.display(),
                    error = %err,
                    "rule_set.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "terrain_wfc::config", "rule_set.loaded=builtin");
    (RuleSet::builtin(), None)
}
