//! View modes
//!
//! ```text
//! ModelViewer <-- toggle --> ApparelTryOn
//! ```

use serde::{Deserialize, Serialize};
use vyking_protocol::TargetElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Camera try-on experience
    ApparelTryOn,
    /// 3D model viewer experience
    #[default]
    ModelViewer,
}

impl ViewMode {
    pub const ALL: [ViewMode; 2] = [ViewMode::ApparelTryOn, ViewMode::ModelViewer];

    pub fn toggled(&self) -> ViewMode {
        match self {
            ViewMode::ApparelTryOn => ViewMode::ModelViewer,
            ViewMode::ModelViewer => ViewMode::ApparelTryOn,
        }
    }

    /// User-facing name of the mode
    pub fn name(&self) -> &'static str {
        match self {
            ViewMode::ApparelTryOn => "Try-on",
            ViewMode::ModelViewer => "View Model",
        }
    }

    /// Label for the toggle control: the mode it would switch to
    pub fn toggle_label(&self) -> &'static str {
        self.toggled().name()
    }

    /// Element the hosted page renders in this mode
    pub fn target_element(&self) -> TargetElement {
        match self {
            ViewMode::ApparelTryOn => TargetElement::Apparel,
            ViewMode::ModelViewer => TargetElement::ModelViewer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::ApparelTryOn => "apparel_try_on",
            ViewMode::ModelViewer => "model_viewer",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
