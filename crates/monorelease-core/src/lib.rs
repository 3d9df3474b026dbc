pub mod error;
pub mod manifest;
pub mod package;
pub mod types;

pub use error::*;
pub use manifest::{Manifest, ManifestFormat};
pub use package::{Package, PackageId, PackageSet, ReleaseDecision};
pub use types::*;
