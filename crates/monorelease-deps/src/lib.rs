pub mod error;
pub mod notes;
pub mod propagate;
pub mod update;

pub use error::DepsError;
pub use notes::upgrade_notes;
pub use propagate::resolve_release_type;
pub use update::{plan_manifest_update, DependencyChange, ManifestWrite};
