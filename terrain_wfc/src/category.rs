use std::fmt;

use thiserror::Error;

use crate::candidate_set::CandidateSet;

/// Identifier of a single terrain category inside a [`CategoryCatalog`].
///
/// The id doubles as the bit index used by [`CandidateSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(u8);

impl Category {
    pub(crate) const fn from_index(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn bit(self) -> u32 {
        1u32 << self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub name: String,
    pub glyph: char,
}

/// Ordered set of the categories a grid may hold.
///
/// Categories receive ids in registration order. The catalog is capped at
/// [`CandidateSet::CAPACITY`] entries because every cell domain is a 32-bit mask.
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    entries: Vec<CategoryEntry>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("category catalog is empty")]
    Empty,
    #[error("category catalog is full ({max} categories); cannot register '{name}'")]
    Full { name: String, max: usize },
    #[error("duplicate category '{0}'")]
    Duplicate(String),
}

impl CategoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from bare names, using each name's first character as glyph.
    pub fn from_names<I, S>(names: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::new();
        for name in names {
            catalog.register(name.as_ref())?;
        }
        if catalog.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(catalog)
    }

    pub fn register(&mut self, name: &str) -> Result<Category, CatalogError> {
        let glyph = name.chars().next().unwrap_or('?');
        self.register_with_glyph(name, glyph)
    }

    pub fn register_with_glyph(&mut self, name: &str, glyph: char) -> Result<Category, CatalogError> {
        if self.lookup(name).is_some() {
            return Err(CatalogError::Duplicate(name.to_string()));
        }
        if self.entries.len() >= CandidateSet::CAPACITY {
            return Err(CatalogError::Full {
                name: name.to_string(),
                max: CandidateSet::CAPACITY,
            });
        }
        let category = Category::from_index(self.entries.len() as u8);
        self.entries.push(CategoryEntry {
            name: name.to_string(),
            glyph,
        });
        Ok(category)
    }

    pub fn lookup(&self, name: &str) -> Option<Category> {
        self.entries
            .iter()
            .position(|entry| entry.name == name)
            .map(|index| Category::from_index(index as u8))
    }

    pub fn contains(&self, category: Category) -> bool {
        category.index() < self.entries.len()
    }

    pub fn name(&self, category: Category) -> Option<&str> {
        self.entries
            .get(category.index())
            .map(|entry| entry.name.as_str())
    }

    pub fn entry(&self, category: Category) -> Option<&CategoryEntry> {
        self.entries.get(category.index())
    }

    pub fn glyph(&self, category: Category) -> Option<char> {
        self.entries.get(category.index()).map(|entry| entry.glyph)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        (0..self.entries.len()).map(|index| Category::from_index(index as u8))
    }

    /// Domain with every registered category possible.
    pub fn full_set(&self) -> CandidateSet {
        CandidateSet::full(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_registration_order() {
        let catalog = CategoryCatalog::from_names(["water", "coast", "land"]).unwrap();
        assert_eq!(catalog.lookup("water").unwrap().index(), 0);
        assert_eq!(catalog.lookup("land").unwrap().index(), 2);
        assert_eq!(catalog.glyph(catalog.lookup("coast").unwrap()), Some('c'));
        assert_eq!(catalog.full_set().len(), 3);
    }

    #[test]
    fn rejects_duplicates() {
        let mut catalog = CategoryCatalog::new();
        catalog.register("forest").unwrap();
        assert_eq!(
            catalog.register("forest"),
            Err(CatalogError::Duplicate("forest".to_string()))
        );
    }

    #[test]
    fn rejects_more_than_mask_width() {
        let mut catalog = CategoryCatalog::new();
        for i in 0..CandidateSet::CAPACITY {
            catalog.register(&format!("c{i}")).unwrap();
        }
        let err = catalog.register("overflow").unwrap_err();
        assert!(matches!(err, CatalogError::Full { max: 32, .. }));
        assert_eq!(catalog.full_set(), CandidateSet::outside());
    }

    #[test]
    fn empty_catalog_is_an_error() {
        let names: [&str; 0] = [];
        assert_eq!(
            CategoryCatalog::from_names(names).unwrap_err(),
            CatalogError::Empty
        );
    }
}
