//! Vyking Apparel Catalog
//!
//! The fixed, ordered list of items offered to the hosted page.
//! The cursor only ever moves forward and wraps back to the first entry.

mod catalog;
mod entry;
mod error;

pub use catalog::Catalog;
pub use entry::CatalogEntry;
pub use error::CatalogError;

pub type Result<T> = std::result::Result<T, CatalogError>;
