//! Core library for `rdfox-pypi`.
//!
//! Turns vendor release archives into Python wheels: [`io::download`] fetches
//! the archive, [`repack`] maps its entries into wheel members, [`wheel`]
//! writes a reproducible wheel, and [`build`] drives the whole thing per
//! platform.

pub mod build;
pub mod error;
pub mod io;
pub mod launcher;
pub mod metadata;
pub mod repack;
pub mod reporter;
pub mod wheel;

pub use build::{BuildPlan, BuiltWheel, build_wheels};
pub use error::BuildError;
pub use reporter::{NullReporter, Reporter};

/// User Agent string for archive downloads
pub const USER_AGENT: &str = concat!("rdfox-pypi/", env!("CARGO_PKG_VERSION"));

/// Value of the `Generator` field in the `WHEEL` file
pub const GENERATOR: &str = concat!("rdfox-pypi ", env!("CARGO_PKG_VERSION"));
