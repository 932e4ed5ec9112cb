//! Stage execution
//!
//! [`RunCoordinator`] walks the stages of one command prefix in ascending
//! order. [`StageExecutor`] runs the scripts of a single stage: inline when
//! there is one, concurrently with captured output when there are several.

mod cancel;
mod capture;
mod coordinator;
mod executor;
mod metadata;
mod report;
mod result;
mod spawner;


pub use cancel::{install_signal_handler, CancelToken, SIGINT};
pub use capture::{read_lines, CaptureDir};
pub use coordinator::RunCoordinator;
pub use executor::StageExecutor;
pub use metadata::{
    cargo_package_name, pyproject_package_name, ManifestMetadata, MetadataProvider,
    PackageMetadata,
};
pub use report::Explainer;
pub use result::{RunOutcome, ScriptResult, StageOutcome};
pub use spawner::{
    render_command, LaunchRequest, ScriptEnv, ScriptOutput, ScriptSpawner, ShellSpawner,
};
