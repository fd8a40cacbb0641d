//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] vyking_catalog::CatalogError),

    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures reported by a rendering surface or its host
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("Failed to create surface: {0}")]
    Create(String),

    #[error("Navigation failed: {0}")]
    Navigate(String),

    #[error("Script evaluation failed: {0}")]
    Evaluate(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
