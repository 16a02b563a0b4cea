//! Shared types for `rdfox-pypi`: the platform table, version translation,
//! content digests and the vendor distribution descriptor.

pub mod distribution;
pub mod hash;
pub mod platform;
pub mod version;

// Re-exports
pub use distribution::*;
pub use hash::*;
pub use platform::*;
pub use version::wheel_version;
