//! Directed compatibility rules between categories.
//!
//! A rule `(a, b, dir)` states that `b` may sit in direction `dir` from `a`.
//! Declaring it also records the mirror `(b, a, dir.inverse())`, so the table
//! is always consistent from both sides of an edge.

use thiserror::Error;

use crate::{
    candidate_set::CandidateSet,
    category::{Category, CategoryCatalog},
    direction::Direction,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacencyRule {
    pub source: Category,
    pub target: Category,
    pub direction: Direction,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdjacencyError {
    #[error("rule references category {category} outside a catalog of {catalog_len}")]
    UnknownCategory {
        category: Category,
        catalog_len: usize,
    },
}

/// Rule table indexed by `[source category][direction]`.
#[derive(Debug, Clone)]
pub struct AdjacencyTable {
    allowed: Vec<[CandidateSet; 4]>,
}

impl AdjacencyTable {
    pub fn new(catalog: &CategoryCatalog) -> Self {
        Self {
            allowed: vec![[CandidateSet::empty(); 4]; catalog.len()],
        }
    }

    pub fn category_count(&self) -> usize {
        self.allowed.len()
    }

    /// Record that `b` may sit in `direction` from `a`, plus the mirror rule.
    ///
    /// Declaring a rule twice has no further effect.
    pub fn declare_rule(
        &mut self,
        a: Category,
        b: Category,
        direction: Direction,
    ) -> Result<(), AdjacencyError> {
        for category in [a, b] {
            if category.index() >= self.allowed.len() {
                return Err(AdjacencyError::UnknownCategory {
                    category,
                    catalog_len: self.allowed.len(),
                });
            }
        }
        self.allowed[a.index()][direction.index()] |= CandidateSet::single(b);
        self.allowed[b.index()][direction.inverse().index()] |= CandidateSet::single(a);
        Ok(())
    }

    pub fn declare(&mut self, rule: AdjacencyRule) -> Result<(), AdjacencyError> {
        self.declare_rule(rule.source, rule.target, rule.direction)
    }

    /// Categories allowed in `direction` next to `category`.
    pub fn compatible_set(&self, category: Category, direction: Direction) -> CandidateSet {
        self.allowed
            .get(category.index())
            .map(|row| row[direction.index()])
            .unwrap_or_default()
    }

    /// Union of [`Self::compatible_set`] over every category still in `domain`.
    pub fn allowed_around(&self, domain: CandidateSet, direction: Direction) -> CandidateSet {
        domain
            .iter()
            .fold(CandidateSet::empty(), |acc, category| {
                acc | self.compatible_set(category, direction)
            })
    }

    pub fn allows(&self, a: Category, direction: Direction, b: Category) -> bool {
        self.compatible_set(a, direction).contains(b)
    }

    /// Every stored rule, mirrors included, in table order.
    pub fn rules(&self) -> impl Iterator<Item = AdjacencyRule> + '_ {
        self.allowed.iter().enumerate().flat_map(|(index, row)| {
            let source = Category::from_index(index as u8);
            Direction::ALL.into_iter().flat_map(move |direction| {
                row[direction.index()]
                    .iter()
                    .map(move |target| AdjacencyRule {
                        source,
                        target,
                        direction,
                    })
            })
        })
    }
}
