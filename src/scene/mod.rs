//! Scene-to-text: object rendering and safety constraints

pub mod render;
pub mod safety;

pub use render::{render_inventory, render_objects, render_pose};
pub use safety::SafetyRuleTable;
