//! Vyking Command Protocol
//!
//! The hosted page exposes no message channel, only two custom elements:
//! - `<vyking-apparel>` for the camera try-on
//! - `<model-viewer>` for the 3D viewer
//!
//! Commands are attribute writes on whichever of the two is present.
//! Each command is rendered to a script where every lookup is optional-chained,
//! so an absent element turns its lines into no-ops.
//!
//! Supported Commands:
//! - configure: integration key and config resource
//! - replace item: alt text and item source
//! - remove item: clears what replace item set

mod command;
mod escape;
mod target;

pub use command::{
    build_configure_command, build_remove_item_command, build_replace_item_command, AttributeOp,
    ScriptPayload,
};
pub use escape::escape_single_quoted;
pub use target::TargetElement;
