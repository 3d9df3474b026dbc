pub mod error;
pub mod next;
pub mod resolve;
pub mod tags;

pub use error::VersionError;
pub use next::{increment, increment_prerelease, next_pre_version, next_version};
pub use resolve::resolve_next_version;
pub use tags::{prerelease_channel, version_from_tag};
