//! Top-level error for a build run

use thiserror::Error;

use crate::io::download::FetchError;
use crate::repack::RepackError;
use crate::wheel::WheelError;

/// Anything that aborts [`crate::build_wheels`].
///
/// No variant is recovered from locally: the first error ends the run.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The requested platform is not in the platform table.
    #[error("Unknown platform '{0}'")]
    UnknownPlatform(String),

    /// Download of the vendor archive failed.
    #[error("Download failed: {0}")]
    Fetch(#[from] FetchError),

    /// The vendor archive could not be read.
    #[error("Repack failed: {0}")]
    Repack(#[from] RepackError),

    /// The wheel could not be assembled.
    #[error("Wheel write failed: {0}")]
    Wheel(#[from] WheelError),

    /// Filesystem error outside wheel assembly (output directory, digests).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The fetched archive does not match the digest the caller expected.
    #[error("Hash mismatch for {platform}: expected {expected}, got {actual}")]
    HashMismatch {
        /// Vendor platform identifier
        platform: String,
        /// Digest supplied by the caller
        expected: String,
        /// Digest of the fetched bytes
        actual: String,
    },
}
