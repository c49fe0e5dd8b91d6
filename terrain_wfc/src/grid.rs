use std::fmt;

use thiserror::Error;

use crate::{candidate_set::CandidateSet, direction::Direction};

/// In-bounds cell coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
}

impl GridPos {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },
}

/// Candidate sets for every cell of a fixed `width` x `height` grid.
///
/// Domains only ever shrink: [`DomainGrid::intersect_narrow`] is the single
/// mutator and it can clear bits but never set them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainGrid {
    width: u32,
    height: u32,
    cells: Vec<CandidateSet>,
}

impl DomainGrid {
    pub fn new(width: u32, height: u32, initial: CandidateSet) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![initial; (width as usize) * (height as usize)],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// Domain at signed coordinates; anything outside the grid is all-permissive.
    pub fn get(&self, x: i64, y: i64) -> CandidateSet {
        if self.contains(x, y) {
            self.cells[self.index(GridPos::new(x as u32, y as u32))]
        } else {
            CandidateSet::outside()
        }
    }

    pub fn domain(&self, pos: GridPos) -> CandidateSet {
        self.get(pos.x as i64, pos.y as i64)
    }

    pub fn entropy(&self, pos: GridPos) -> u32 {
        self.domain(pos).len()
    }

    /// Narrow the domain at `pos` to `current & mask`.
    ///
    /// Returns `true` when the domain shrank. Out-of-bounds positions are left
    /// untouched and report `false`.
    pub fn intersect_narrow(&mut self, pos: GridPos, mask: CandidateSet) -> bool {
        if !self.contains(pos.x as i64, pos.y as i64) {
            return false;
        }
        let index = self.index(pos);
        let current = self.cells[index];
        let narrowed = current & mask;
        if narrowed == current {
            return false;
        }
        self.cells[index] = narrowed;
        true
    }

    pub fn neighbor(&self, pos: GridPos, direction: Direction) -> Option<GridPos> {
        let (dx, dy) = direction.offset();
        let x = pos.x as i64 + dx as i64;
        let y = pos.y as i64 + dy as i64;
        self.contains(x, y).then(|| GridPos::new(x as u32, y as u32))
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| GridPos::new(x, y)))
    }

    pub fn position_at(&self, index: usize) -> GridPos {
        let width = self.width as usize;
        GridPos::new((index % width) as u32, (index / width) as u32)
    }

    /// Row-major cell domains.
    pub fn domains(&self) -> &[CandidateSet] {
        &self.cells
    }

    pub fn is_fully_collapsed(&self) -> bool {
        self.cells.iter().all(|domain| domain.is_singleton())
    }

    pub(crate) fn index(&self, pos: GridPos) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }
}
