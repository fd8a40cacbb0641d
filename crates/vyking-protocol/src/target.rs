//! Target element kinds

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetElement {
    /// Camera try-on element
    Apparel,
    /// 3D model viewer element
    ModelViewer,
}

impl TargetElement {
    pub const ALL: [TargetElement; 2] = [TargetElement::Apparel, TargetElement::ModelViewer];

    /// Tag name used as the query selector
    pub fn tag(&self) -> &'static str {
        match self {
            TargetElement::Apparel => "vyking-apparel",
            TargetElement::ModelViewer => "model-viewer",
        }
    }

    /// Attribute carrying the item source
    pub fn item_attribute(&self) -> &'static str {
        match self {
            TargetElement::Apparel => "apparel",
            TargetElement::ModelViewer => "vyking-src",
        }
    }
}

impl std::fmt::Display for TargetElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}
