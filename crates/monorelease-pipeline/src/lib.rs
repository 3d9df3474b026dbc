pub mod error;
pub mod gate;
pub mod hooks;
pub mod runner;

pub use error::PipelineError;
pub use gate::{BatchGate, TagLock, TagPermit};
pub use hooks::{HookError, Phase, ReleaseHooks};
pub use runner::{MultiRelease, PackageOutcome};
