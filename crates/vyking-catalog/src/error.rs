//! Catalog error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog must contain at least one entry")]
    Empty,

    #[error("Invalid asset locator for {name}: {locator}")]
    InvalidLocator { name: String, locator: String },
}
