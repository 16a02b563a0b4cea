//! Vendor archive to wheel members.
//!
//! Vendor archives wrap everything in a versioned top-level directory
//! (`RDFox-linux-x86_64-7.2a/...`). Each file entry is re-rooted under the
//! Python package directory with its permission bits kept, and the entry
//! whose file name starts with the product name gets a launcher stub.

use std::io::{Cursor, Read};
use std::path::{Component, Path};

use rdfox_pypi_schema::Distribution;
use thiserror::Error;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::launcher;
use crate::wheel::{Members, PackageMember};

/// Mode used for entries with no external attributes at all (`rw-r--r--`).
///
/// Entries created on MS-DOS hosts carry attribute bits instead, which the
/// archive reader maps to `rw-rw-r--` (or a bare `r--r--r--` when read-only).
const DEFAULT_ENTRY_MODE: u32 = 0o100_644;

/// Errors raised while reading a vendor archive.
#[derive(Error, Debug)]
pub enum RepackError {
    /// The archive is malformed or uses an unsupported feature.
    #[error("Archive error: {0}")]
    Archive(#[from] ZipError),

    /// An entry could not be decompressed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One item read from the vendor archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Slash-separated path inside the archive
    pub path: String,
    /// Whether the entry is a directory
    pub is_dir: bool,
    /// Unix mode (type and permission bits)
    pub mode: u32,
    /// Decompressed content, empty for directories
    pub data: Vec<u8>,
}

/// Maps vendor archive entries onto wheel members.
#[derive(Debug, Clone)]
pub struct Repacker<'a> {
    package_dir: &'a str,
    executable_prefix: &'a str,
    strip_components: usize,
}

impl<'a> Repacker<'a> {
    /// Repacker for a distribution: files land under `dist.name/` and the
    /// executable is recognised by `dist.product`.
    pub fn new(dist: &'a Distribution) -> Self {
        Self {
            package_dir: dist.name,
            executable_prefix: dist.product,
            strip_components: 1,
        }
    }

    /// Number of leading path components to drop from each entry (default 1).
    pub fn with_strip_components(mut self, n: usize) -> Self {
        self.strip_components = n;
        self
    }

    /// Read `archive` and return its files as wheel members.
    ///
    /// Directory entries and entries with nothing left after stripping are
    /// skipped. Entries whose path escapes the archive root are skipped too.
    ///
    /// # Errors
    ///
    /// Returns [`RepackError::Archive`] if the archive cannot be parsed and
    /// [`RepackError::Io`] if an entry fails to decompress.
    pub fn repack(&self, archive: &[u8]) -> Result<Members, RepackError> {
        let mut archive = ZipArchive::new(Cursor::new(archive))?;
        let mut members = Members::new();
        let mut launcher_target: Option<String> = None;

        for i in 0..archive.len() {
            let Some(entry) = read_entry(&mut archive, i)? else {
                continue;
            };
            if entry.is_dir {
                continue;
            }
            let Some(relative) = self.strip(&entry.path) else {
                continue;
            };

            if file_name(&relative).starts_with(self.executable_prefix) {
                launcher_target = Some(relative.clone());
            }

            tracing::debug!(path = %relative, mode = %format!("{:o}", entry.mode), "repacking entry");
            members.insert(
                format!("{}/{relative}", self.package_dir),
                PackageMember::with_mode(entry.data, entry.mode & 0xFFFF),
            );
        }

        match launcher_target {
            Some(target) => {
                tracing::debug!(executable = %target, "generating launcher");
                members.insert(
                    format!("{}/__main__.py", self.package_dir),
                    PackageMember::new(launcher::render(&target).into_bytes()),
                );
            }
            None => tracing::warn!(
                prefix = self.executable_prefix,
                "no executable found in archive, wheel will have no launcher"
            ),
        }

        Ok(members)
    }

    /// Drop the leading components of `path`; `None` if nothing remains.
    fn strip(&self, path: &str) -> Option<String> {
        let rest: Vec<&str> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .skip(self.strip_components)
            .collect();
        (!rest.is_empty()).then(|| rest.join("/"))
    }
}

/// Read entry `index`, or `None` if its name is unsafe to extract.
fn read_entry<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
) -> Result<Option<ArchiveEntry>, RepackError> {
    let mut file = archive.by_index(index)?;

    let Some(path) = file.enclosed_name().as_deref().map(slash_path) else {
        tracing::warn!(name = file.name(), "skipping archive entry with unsafe path");
        return Ok(None);
    };

    let is_dir = file.is_dir();
    let mode = file.unix_mode().unwrap_or(DEFAULT_ENTRY_MODE);
    let mut data = Vec::new();
    if !is_dir {
        data.reserve(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut data)?;
    }

    Ok(Some(ArchiveEntry {
        path,
        is_dir,
        mode,
        data,
    }))
}

/// Join the normal components of `path` with `/`.
fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
