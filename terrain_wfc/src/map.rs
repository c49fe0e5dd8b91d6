use std::sync::Arc;

use thiserror::Error;

use crate::{
    adjacency::AdjacencyTable,
    category::{Category, CategoryCatalog},
    direction::Direction,
    grid::{DomainGrid, GridPos},
    hashing::digest_cells,
};

/// Fully collapsed grid: exactly one category per cell.
#[derive(Debug, Clone)]
pub struct TerrainMap {
    width: u32,
    height: u32,
    cells: Vec<Category>,
    catalog: Arc<CategoryCatalog>,
}

/// A pair of neighbors whose categories no declared rule allows.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{source_category} at {pos} may not have {neighbor_category} to its {direction} at {neighbor}")]
pub struct ConsistencyViolation {
    pub pos: GridPos,
    pub neighbor: GridPos,
    pub direction: Direction,
    pub source_category: Category,
    pub neighbor_category: Category,
}

impl TerrainMap {
    /// Snapshot a grid whose domains are all singletons; `None` otherwise.
    pub fn from_grid(grid: &DomainGrid, catalog: Arc<CategoryCatalog>) -> Option<Self> {
        let cells = grid
            .domains()
            .iter()
            .map(|domain| domain.single_category())
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            width: grid.width(),
            height: grid.height(),
            cells,
            catalog,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    pub fn get(&self, pos: GridPos) -> Option<Category> {
        if pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        self.cells
            .get(pos.y as usize * self.width as usize + pos.x as usize)
            .copied()
    }

    /// Row-major categories.
    pub fn cells(&self) -> &[Category] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Category]> {
        self.cells.chunks(self.width as usize)
    }

    /// Check every right and down edge against `adjacency`. Left and up edges
    /// are the mirrors of those and need no separate pass.
    pub fn verify(&self, adjacency: &AdjacencyTable) -> Result<(), ConsistencyViolation> {
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = GridPos::new(x, y);
                let Some(source) = self.get(pos) else {
                    continue;
                };
                for direction in [Direction::Right, Direction::Down] {
                    let (dx, dy) = direction.offset();
                    let neighbor = GridPos::new(x + dx as u32, y + dy as u32);
                    let Some(target) = self.get(neighbor) else {
                        continue;
                    };
                    if !adjacency.allows(source, direction, target) {
                        return Err(ConsistencyViolation {
                            pos,
                            neighbor,
                            direction,
                            source_category: source,
                            neighbor_category: target,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// FNV-1a digest of the layout; equal seeds and rules give equal digests.
    pub fn digest(&self) -> u64 {
        digest_cells(self.width, self.height, self.cells.iter().copied())
    }

    /// Count of cells per category, in catalog order.
    pub fn histogram(&self) -> Vec<(Category, usize)> {
        let mut counts = vec![0usize; self.catalog.len()];
        for category in &self.cells {
            counts[category.index()] += 1;
        }
        self.catalog.categories().zip(counts).collect()
    }

    /// One line of catalog glyphs per row.
    pub fn render(&self) -> String {
        self.rows()
            .map(|row| {
                row.iter()
                    .map(|&category| self.catalog.glyph(category).unwrap_or('?'))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
