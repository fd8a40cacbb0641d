//! Cyclic catalog
//!
//! ```text
//! [0] -> [1] -> ... -> [len - 1]
//!  ^                       |
//!  +------- advance -------+
//! ```

use crate::entry::CatalogEntry;
use crate::error::CatalogError;
use crate::Result;

#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    /// Always a valid index into `entries`
    cursor: usize,
}

impl Catalog {
    /// Build a catalog positioned on its first entry
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        for entry in &entries {
            entry.validate()?;
        }

        Ok(Self { entries, cursor: 0 })
    }

    pub fn current(&self) -> &CatalogEntry {
        &self.entries[self.cursor]
    }

    /// Move to the next entry, wrapping after the last one
    pub fn advance(&mut self) -> &CatalogEntry {
        let from = self.cursor;
        self.cursor = (self.cursor + 1) % self.entries.len();

        tracing::debug!(from, to = self.cursor, "Catalog advanced");

        self.current()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true for a constructed catalog
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
