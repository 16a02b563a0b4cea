//! Reproducible wheel writing.
//!
//! A wheel is a zip file holding the package files plus a
//! `{name}-{version}.dist-info/` directory with `METADATA`, `WHEEL` and
//! `entry_points.txt`. Entries are written in a fixed order with every
//! timestamp pinned to 1980-01-01 00:00:00 (the zip epoch) and the
//! creating system recorded as Unix, so the same inputs always give the
//! same bytes no matter when or where the build runs.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use base64::prelude::{BASE64_URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::metadata::{self, CoreMetadata};

/// File extension of a wheel.
pub const WHEEL_EXTENSION: &str = "whl";

/// Permission bits for members that do not carry their own (`rw-r--r--`).
pub const DEFAULT_MEMBER_MODE: u32 = 0o644;

/// File type bits of a Unix mode.
const S_IFMT: u32 = 0o170_000;
/// File type of a symbolic link.
const S_IFLNK: u32 = 0o120_000;

/// Errors raised while assembling or writing a wheel.
#[derive(Error, Debug)]
pub enum WheelError {
    /// The zip container could not be written.
    #[error("Zip error: {0}")]
    Zip(#[from] ZipError),

    /// The wheel file could not be written to disk.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One file destined for the wheel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMember {
    /// Unix mode; [`DEFAULT_MEMBER_MODE`] when absent.
    ///
    /// The wheel keeps the `rwx` bits and whether the member is a symlink.
    /// Setuid, setgid and sticky bits are not written.
    pub mode: Option<u32>,
    /// File content
    pub data: Vec<u8>,
}

impl PackageMember {
    /// A member with default permissions.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            mode: None,
            data: data.into(),
        }
    }

    /// A member with explicit Unix mode bits.
    pub fn with_mode(data: impl Into<Vec<u8>>, mode: u32) -> Self {
        Self {
            mode: Some(mode),
            data: data.into(),
        }
    }

    fn effective_mode(&self) -> u32 {
        self.mode.unwrap_or(DEFAULT_MEMBER_MODE)
    }
}

/// Wheel members keyed by path, iterated in path order.
///
/// Inserting a path twice keeps the later member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Members(BTreeMap<String, PackageMember>);

impl Members {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member, replacing (and logging) any earlier member at `path`.
    pub fn insert(&mut self, path: impl Into<String>, member: PackageMember) {
        let path = path.into();
        if self.0.contains_key(&path) {
            tracing::warn!(%path, "replacing earlier wheel member with the same path");
        }
        self.0.insert(path, member);
    }

    /// Member at `path`.
    pub fn get(&self, path: &str) -> Option<&PackageMember> {
        self.0.get(path)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no members.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Member paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `(path, member)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PackageMember)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Identity and metadata of one wheel.
#[derive(Debug, Clone)]
pub struct WheelSpec<'a> {
    /// Distribution name
    pub name: &'a str,
    /// Python version string, already translated
    pub version: &'a str,
    /// Python platform tag (e.g. `win_amd64`)
    pub platform_tag: &'a str,
    /// Fields for `METADATA`
    pub metadata: &'a CoreMetadata,
    /// Long description, the body of `METADATA`
    pub description: &'a str,
    /// Contents of `entry_points.txt`
    pub entry_points: &'a str,
}

impl WheelSpec<'_> {
    /// Full compatibility tag: `py3-none-{platform_tag}`.
    pub fn tag(&self) -> String {
        format!("py3-none-{}", self.platform_tag)
    }

    /// Wheel file name: `{name}-{version}-py3-none-{platform_tag}.whl`.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}-{}.{WHEEL_EXTENSION}",
            self.name,
            self.version,
            self.tag()
        )
    }

    /// Metadata directory inside the wheel.
    pub fn dist_info(&self) -> String {
        format!("{}-{}.dist-info", self.name, self.version)
    }

    /// The generated dist-info members, in the order they are written.
    fn dist_info_members(&self) -> Vec<(String, PackageMember)> {
        let dist_info = self.dist_info();
        let metadata = self
            .metadata
            .to_message(self.name, self.version, self.description);
        vec![
            (
                format!("{dist_info}/METADATA"),
                PackageMember::new(metadata.to_bytes()),
            ),
            (
                format!("{dist_info}/WHEEL"),
                PackageMember::new(metadata::wheel_message(&self.tag()).to_bytes()),
            ),
            (
                format!("{dist_info}/entry_points.txt"),
                PackageMember::new(self.entry_points.as_bytes()),
            ),
        ]
    }
}

/// Writes wheels with deterministic entry metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct WheelWriter {
    record: bool,
}

impl WheelWriter {
    /// A writer that emits only the three generated dist-info members.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also emit a `RECORD` manifest as the last dist-info member.
    pub fn with_record(mut self, record: bool) -> Self {
        self.record = record;
        self
    }

    /// Serialise `members` plus the generated dist-info members into wheel bytes.
    ///
    /// Package members come first in path order, then `METADATA`, `WHEEL`,
    /// `entry_points.txt` and, if enabled, `RECORD`.
    ///
    /// # Errors
    ///
    /// Returns an error if the zip container cannot be written.
    pub fn to_bytes(&self, spec: &WheelSpec<'_>, members: &Members) -> Result<Vec<u8>, WheelError> {
        let generated = spec.dist_info_members();
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut record = String::new();

        let all = members
            .iter()
            .chain(generated.iter().map(|(p, m)| (p.as_str(), m)));
        for (path, member) in all {
            write_member(&mut zip, path, member)?;
            if self.record {
                record.push_str(&record_line(path, &member.data));
            }
        }

        if self.record {
            let record_path = format!("{}/RECORD", spec.dist_info());
            record.push_str(&csv_field(&record_path));
            record.push_str(",,\n");
            write_member(&mut zip, &record_path, &PackageMember::new(record))?;
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Write the wheel into `out_dir` and return its path.
    ///
    /// An existing file at that path is overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the file write fails.
    pub fn write(
        &self,
        out_dir: &Path,
        spec: &WheelSpec<'_>,
        members: &Members,
    ) -> Result<PathBuf, WheelError> {
        let bytes = self.to_bytes(spec, members)?;
        let path = out_dir.join(spec.file_name());
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

fn write_member<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    path: &str,
    member: &PackageMember,
) -> Result<(), WheelError> {
    let mode = member.effective_mode();
    let options = SimpleFileOptions::default()
        .last_modified_time(DateTime::default())
        .unix_permissions(mode);

    if mode & S_IFMT == S_IFLNK {
        // Symlinks are stored uncompressed with the target as content.
        zip.add_symlink(path, String::from_utf8_lossy(&member.data), options)?;
        return Ok(());
    }

    let options = options
        .compression_method(CompressionMethod::Deflated)
        .large_file(member.data.len() as u64 >= u64::from(u32::MAX));
    zip.start_file(path, options)?;
    zip.write_all(&member.data)?;
    Ok(())
}

/// `RECORD` line: `path,sha256=<urlsafe b64, no padding>,size`.
fn record_line(path: &str, data: &[u8]) -> String {
    let digest = BASE64_URL_SAFE_NO_PAD.encode(Sha256::digest(data));
    format!("{},sha256={digest},{}\n", csv_field(path), data.len())
}

/// Quote a CSV field if it contains a delimiter, quote or line break.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
