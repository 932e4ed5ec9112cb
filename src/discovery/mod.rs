//! Stage script discovery and override resolution

mod locator;
mod override_dir;


pub use locator::{group_by_stage, ScriptDescriptor, ScriptLocator, Stage, StagePattern};
pub use override_dir::{resolve_stages_dir, StagesSource};
