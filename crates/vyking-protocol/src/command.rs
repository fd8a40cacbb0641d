//! Command builders
//!
//! Every builder is pure: it produces the attribute operations and the script
//! text rendered from them. Submitting the script is up to the caller.

use crate::escape::escape_single_quoted;
use crate::target::TargetElement;

/// A single attribute write on a target element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeOp {
    Set {
        target: TargetElement,
        name: &'static str,
        value: String,
    },
    Remove {
        target: TargetElement,
        name: &'static str,
    },
}

impl AttributeOp {
    fn set(target: TargetElement, name: &'static str, value: impl Into<String>) -> Self {
        AttributeOp::Set {
            target,
            name,
            value: value.into(),
        }
    }

    pub fn target(&self) -> TargetElement {
        match self {
            AttributeOp::Set { target, .. } | AttributeOp::Remove { target, .. } => *target,
        }
    }

    /// Render as one optional-chained script statement
    fn render(&self) -> String {
        match self {
            AttributeOp::Set {
                target,
                name,
                value,
            } => format!(
                "document.querySelector('{}')?.setAttribute('{}', '{}');",
                target.tag(),
                name,
                escape_single_quoted(value)
            ),
            AttributeOp::Remove { target, name } => format!(
                "document.querySelector('{}')?.removeAttribute('{}');",
                target.tag(),
                name
            ),
        }
    }
}

/// Script text ready for evaluation, with the operations it encodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPayload {
    ops: Vec<AttributeOp>,
    script: String,
}

impl ScriptPayload {
    fn from_ops(ops: Vec<AttributeOp>) -> Self {
        let mut script = String::new();
        let mut previous: Option<TargetElement> = None;

        for op in &ops {
            if let Some(prev) = previous {
                script.push('\n');
                // Blank line between element groups
                if prev != op.target() {
                    script.push('\n');
                }
            }
            script.push_str(&op.render());
            previous = Some(op.target());
        }

        Self { ops, script }
    }

    pub fn as_str(&self) -> &str {
        &self.script
    }

    pub fn ops(&self) -> &[AttributeOp] {
        &self.ops
    }
}

impl std::fmt::Display for ScriptPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.script)
    }
}

/// Point whichever element is present at the integration key and config resource
pub fn build_configure_command(site_key: &str, config_locator: &str) -> ScriptPayload {
    ScriptPayload::from_ops(vec![
        AttributeOp::set(TargetElement::Apparel, "key", site_key),
        AttributeOp::set(TargetElement::Apparel, "config", config_locator),
        AttributeOp::set(TargetElement::ModelViewer, "vto", "true"),
        AttributeOp::set(TargetElement::ModelViewer, "vto-share", "true"),
        AttributeOp::set(TargetElement::ModelViewer, "vto-key", site_key),
        AttributeOp::set(TargetElement::ModelViewer, "vto-config", config_locator),
    ])
}

/// Show a different item
pub fn build_replace_item_command(asset_locator: &str, display_name: &str) -> ScriptPayload {
    let mut ops = Vec::with_capacity(4);
    for target in TargetElement::ALL {
        ops.push(AttributeOp::set(target, "alt", display_name));
        ops.push(AttributeOp::set(target, target.item_attribute(), asset_locator));
    }
    ScriptPayload::from_ops(ops)
}

/// Clear the attributes set by [`build_replace_item_command`]
pub fn build_remove_item_command() -> ScriptPayload {
    let mut ops = Vec::with_capacity(4);
    for target in TargetElement::ALL {
        ops.push(AttributeOp::Remove {
            target,
            name: "alt",
        });
        ops.push(AttributeOp::Remove {
            target,
            name: target.item_attribute(),
        });
    }
    ScriptPayload::from_ops(ops)
}
