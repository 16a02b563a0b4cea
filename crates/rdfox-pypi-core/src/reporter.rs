//! Reporter trait for dependency injection
//!
//! The build pipeline reports the digests of what it fetched and wrote
//! through this trait, so the audit trail can go to a terminal, a log, or
//! nowhere without the pipeline knowing.

use std::path::Path;

use rdfox_pypi_schema::Sha256Digest;

/// Receiver for progress events emitted by [`crate::build_wheels`].
pub trait Reporter {
    /// A vendor archive was downloaded from `url`.
    fn fetched(&self, url: &str, digest: &Sha256Digest);

    /// A wheel was written to `path`.
    fn wrote(&self, path: &Path, digest: &Sha256Digest);
}

impl<T: Reporter + ?Sized> Reporter for &T {
    fn fetched(&self, url: &str, digest: &Sha256Digest) {
        (**self).fetched(url, digest);
    }

    fn wrote(&self, path: &Path, digest: &Sha256Digest) {
        (**self).wrote(path, digest);
    }
}

/// A reporter that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn fetched(&self, _url: &str, _digest: &Sha256Digest) {}
    fn wrote(&self, _path: &Path, _digest: &Sha256Digest) {}
}
