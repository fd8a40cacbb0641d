//! Session configuration

use serde::{Deserialize, Serialize};
use url::Url;
use vyking_catalog::{Catalog, CatalogEntry};

use crate::error::CoreError;
use crate::view_mode::ViewMode;
use crate::Result;

const ASSET_BASE: &str = "https://sneaker-window.vyking.io/vyking-assets/customer/vyking-io";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Integration key passed to the hosted elements
    pub integration_key: String,
    /// Config resource path, resolved by the hosted page
    pub config_locator: String,
    /// Page hosting the camera try-on element
    pub apparel_url: String,
    /// Page hosting the model viewer element
    pub model_viewer_url: String,
    /// Mode loaded on first activation
    pub initial_view_mode: ViewMode,
    /// Items offered to the page, in cycling order
    pub catalog: Vec<CatalogEntry>,
    /// Notice shown when camera permission is refused
    pub permission_notice: String,
    pub surface: SurfaceConfig,
}

impl Config {
    pub fn target_url(&self, mode: ViewMode) -> Result<Url> {
        let raw = match mode {
            ViewMode::ApparelTryOn => &self.apparel_url,
            ViewMode::ModelViewer => &self.model_viewer_url,
        };

        Url::parse(raw).map_err(|e| CoreError::Config(format!("Invalid {mode} URL {raw}: {e}")))
    }

    pub fn build_catalog(&self) -> Result<Catalog> {
        Ok(Catalog::new(self.catalog.clone())?)
    }

    pub fn validate(&self) -> Result<()> {
        for mode in ViewMode::ALL {
            self.target_url(mode)?;
        }
        self.build_catalog()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let item = |name: &str, folder: &str| {
            CatalogEntry::new(name, format!("{ASSET_BASE}/{folder}/offsets.json"))
        };

        Self {
            integration_key: "io.vyking".to_string(),
            config_locator: "../assets/config/modeld.foot.bin".to_string(),
            apparel_url: "https://sneaker-window.vyking.io/vyking-examples/with-service-worker/examples/in-app-vyking-apparel-camera.html".to_string(),
            model_viewer_url: "https://sneaker-window.vyking.io/vyking-examples/with-service-worker/examples/in-app-model-viewer.html".to_string(),
            initial_view_mode: ViewMode::ModelViewer,
            catalog: vec![
                item("Yeezy Boost 700 Carbon Blue", "yeezy_boost_700_carbon_blue"),
                item("Adidas GY1121", "adidas_GY1121"),
                item("Air Jordon 1 Turbo Green", "air_jordan_1_turbo_green"),
                item("Jordon Off-white", "jordan_off_white_chicago"),
                item("Monte Runner", "H209A4M00080M2056P04_Monte_Runner_Trainers"),
            ],
            permission_notice: "Camera permission is required.".to_string(),
            surface: SurfaceConfig::default(),
        }
    }
}

/// Settings applied to every surface on creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Page scripts may run
    pub scripts_enabled: bool,
    /// Media may start without a user gesture (camera preview, turntables)
    pub autoplay_without_gesture: bool,
    /// Private browsing; `false` keeps the platform's default HTTP cache
    pub incognito: bool,
    /// Let the window background show through the page
    pub transparent_background: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            scripts_enabled: true,
            autoplay_without_gesture: true,
            incognito: false,
            transparent_background: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let catalog = config.build_catalog().unwrap();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.current().display_name, "Yeezy Boost 700 Carbon Blue");
        assert_eq!(
            catalog.current().asset_locator,
            "https://sneaker-window.vyking.io/vyking-assets/customer/vyking-io/yeezy_boost_700_carbon_blue/offsets.json"
        );
    }

    #[test]
    fn test_target_url_per_mode() {
        let config = Config::default();
        assert!(config
            .target_url(ViewMode::ModelViewer)
            .unwrap()
            .path()
            .ends_with("in-app-model-viewer.html"));
        assert!(config
            .target_url(ViewMode::ApparelTryOn)
            .unwrap()
            .path()
            .ends_with("in-app-vyking-apparel-camera.html"));
    }

    #[test]
    fn test_invalid_target_url_rejected() {
        let config = Config {
            apparel_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let config = Config {
            catalog: Vec::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Catalog(_))));
    }

    #[test]
    fn test_surface_defaults() {
        let surface = SurfaceConfig::default();
        assert!(surface.scripts_enabled);
        assert!(surface.autoplay_without_gesture);
        assert!(!surface.incognito);
    }
}
