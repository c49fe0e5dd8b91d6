use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

use crate::category::Category;

/// Set of categories still possible for a cell, stored as a 32-bit mask.
///
/// Bit `i` set means the category with id `i` is still a candidate.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CandidateSet(u32);

impl CandidateSet {
    /// Maximum number of categories a set can describe.
    pub const CAPACITY: usize = u32::BITS as usize;

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Set holding the first `count` category ids.
    pub fn full(count: usize) -> Self {
        if count >= Self::CAPACITY {
            Self(u32::MAX)
        } else {
            Self((1u32 << count) - 1)
        }
    }

    /// All-permissive domain reported for positions beyond the grid.
    pub const fn outside() -> Self {
        Self(u32::MAX)
    }

    pub fn single(category: Category) -> Self {
        Self(category.bit())
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, category: Category) -> bool {
        self.0 & category.bit() != 0
    }

    pub fn with(self, category: Category) -> Self {
        Self(self.0 | category.bit())
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn intersect(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Population count; this is the cell's entropy.
    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_singleton(self) -> bool {
        self.0.is_power_of_two()
    }

    /// The only remaining category, if exactly one is left.
    pub fn single_category(self) -> Option<Category> {
        if self.is_singleton() {
            Some(Category::from_index(self.0.trailing_zeros() as u8))
        } else {
            None
        }
    }

    /// Categories in ascending id order.
    pub fn iter(self) -> CandidateIter {
        CandidateIter(self.0)
    }
}

impl From<Category> for CandidateSet {
    fn from(category: Category) -> Self {
        Self::single(category)
    }
}

impl FromIterator<Category> for CandidateSet {
    fn from_iter<T: IntoIterator<Item = Category>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, category| set.with(category))
    }
}

impl IntoIterator for CandidateSet {
    type Item = Category;
    type IntoIter = CandidateIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl BitOr for CandidateSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for CandidateSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CandidateSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersect(rhs)
    }
}

impl BitAndAssign for CandidateSet {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl fmt::Debug for CandidateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|c| c.index())).finish()
    }
}

/// Iterator over the set bits of a [`CandidateSet`], lowest id first.
#[derive(Clone, Debug)]
pub struct CandidateIter(u32);

impl Iterator for CandidateIter {
    type Item = Category;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros();
        self.0 &= self.0 - 1;
        Some(Category::from_index(index as u8))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.0.count_ones() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CandidateIter {}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(index: u8) -> Category {
        Category::from_index(index)
    }

    #[test]
    fn full_sets_cover_requested_width() {
        assert_eq!(CandidateSet::full(0), CandidateSet::empty());
        assert_eq!(CandidateSet::full(3).bits(), 0b111);
        assert_eq!(CandidateSet::full(32).len(), 32);
        assert_eq!(CandidateSet::full(40), CandidateSet::outside());
    }

    #[test]
    fn iterates_in_ascending_order() {
        let set: CandidateSet = [cat(5), cat(0), cat(3)].into_iter().collect();
        let ids: Vec<usize> = set.iter().map(|c| c.index()).collect();
        assert_eq!(ids, vec![0, 3, 5]);
        assert_eq!(set.iter().len(), 3);
    }

    #[test]
    fn singleton_detection() {
        assert_eq!(CandidateSet::single(cat(4)).single_category(), Some(cat(4)));
        assert_eq!(CandidateSet::empty().single_category(), None);
        assert!(!CandidateSet::full(2).is_singleton());
        assert!(!CandidateSet::empty().is_singleton());
    }

    #[test]
    fn set_algebra() {
        let a = CandidateSet::from_bits(0b0110);
        let b = CandidateSet::from_bits(0b0011);
        assert_eq!((a | b).bits(), 0b0111);
        assert_eq!((a & b).bits(), 0b0010);
        assert!(a.contains(cat(1)) && !a.contains(cat(0)));
        assert_eq!(format!("{:?}", a), "{1, 2}");
    }
}
