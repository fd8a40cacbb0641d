//! Catalog entry

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Name shown as the element's alt text
    pub display_name: String,
    /// Absolute URL of the item's asset description (offsets.json)
    pub asset_locator: String,
}

impl CatalogEntry {
    pub fn new(display_name: impl Into<String>, asset_locator: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            asset_locator: asset_locator.into(),
        }
    }

    /// Check that the asset locator is an absolute URL
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.asset_locator)
            .map(|_| ())
            .map_err(|_| CatalogError::InvalidLocator {
                name: self.display_name.clone(),
                locator: self.asset_locator.clone(),
            })
    }
}
