//! Per-platform build orchestration.
//!
//! For each requested platform, one after another:
//!
//! 1. Build the download URL from version and platform.
//! 2. Fetch the vendor archive and report its SHA256 (verifying it when the
//!    caller supplied an expected digest).
//! 3. Repack the archive into wheel members.
//! 4. Write the wheel and report its SHA256.
//!
//! Platforms are validated before anything is fetched. The first error
//! aborts the run; wheels already written are left in place.

use std::collections::BTreeMap;
use std::path::PathBuf;

use rdfox_pypi_schema::{
    Distribution, Platform, PlatformTable, RDFOX_DOWNLOAD_BASE_URL, Sha256Digest, wheel_version,
};

use crate::error::BuildError;
use crate::io::download::Fetcher;
use crate::metadata::CoreMetadata;
use crate::repack::Repacker;
use crate::reporter::Reporter;
use crate::wheel::{PackageMember, WheelSpec, WheelWriter};

/// Long description used when the caller does not supply one.
pub const DEFAULT_DESCRIPTION: &str = include_str!("../README.pypi.md");

/// Default output directory.
pub const DEFAULT_OUT_DIR: &str = "dist/";

/// What to build and where.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    /// Vendor version, e.g. `7.2a`
    pub vendor_version: String,
    /// Appended to the translated wheel version, e.g. `.post1`
    pub suffix: String,
    /// Directory the wheels are written to; created if missing
    pub out_dir: PathBuf,
    /// Vendor platforms to build; empty means every platform in the table
    pub platforms: Vec<String>,
    /// Base URL of the vendor's release archives
    pub base_url: String,
    /// Long description for `METADATA`
    pub description: String,
    /// Expected archive digests by vendor platform
    pub expected_sha256: BTreeMap<String, Sha256Digest>,
    /// Emit a `RECORD` manifest in each wheel
    pub record: bool,
}

impl BuildPlan {
    /// A plan for `vendor_version` with every other setting at its default.
    pub fn new(vendor_version: impl Into<String>) -> Self {
        Self {
            vendor_version: vendor_version.into(),
            suffix: String::new(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            platforms: Vec::new(),
            base_url: RDFOX_DOWNLOAD_BASE_URL.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            expected_sha256: BTreeMap::new(),
            record: false,
        }
    }

    /// Python version of the wheels: translated vendor version plus suffix.
    pub fn wheel_version(&self) -> String {
        format!("{}{}", wheel_version(&self.vendor_version), self.suffix)
    }

    /// Resolve the requested platforms against `table`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownPlatform`] for the first requested or
    /// hash-pinned platform missing from the table.
    pub fn resolve_platforms<'t>(
        &self,
        table: &'t PlatformTable,
    ) -> Result<Vec<&'t Platform>, BuildError> {
        if let Some(unknown) = self
            .expected_sha256
            .keys()
            .find(|p| table.get(p).is_none())
        {
            return Err(BuildError::UnknownPlatform(unknown.clone()));
        }

        if self.platforms.is_empty() {
            return Ok(table.iter().collect());
        }

        self.platforms
            .iter()
            .map(|p| {
                table
                    .get(p)
                    .ok_or_else(|| BuildError::UnknownPlatform(p.clone()))
            })
            .collect()
    }
}

/// Outcome of building one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltWheel {
    /// Vendor platform identifier
    pub platform: String,
    /// URL the archive was fetched from
    pub url: String,
    /// Digest of the fetched archive
    pub archive_sha256: Sha256Digest,
    /// Path of the written wheel
    pub path: PathBuf,
    /// Digest of the written wheel
    pub wheel_sha256: Sha256Digest,
}

/// Build one wheel per platform in `plan`.
///
/// # Errors
///
/// Returns the first error hit: an unknown platform (before any fetch), a
/// failed download, a digest mismatch, an unreadable archive, or a failed
/// write.
pub fn build_wheels<F: Fetcher, R: Reporter>(
    plan: &BuildPlan,
    dist: &Distribution,
    table: &PlatformTable,
    fetcher: &F,
    reporter: &R,
) -> Result<Vec<BuiltWheel>, BuildError> {
    let platforms = plan.resolve_platforms(table)?;
    std::fs::create_dir_all(&plan.out_dir)?;

    let version = plan.wheel_version();
    let metadata = CoreMetadata::for_distribution(dist);
    let entry_points = dist.entry_points();
    let writer = WheelWriter::new().with_record(plan.record);
    let repacker = Repacker::new(dist);
    let init_path = format!("{}/__init__.py", dist.name);

    let mut built = Vec::with_capacity(platforms.len());
    for platform in platforms {
        let url = dist.archive_url(&plan.base_url, &plan.vendor_version, platform.vendor);
        tracing::info!(platform = platform.vendor, %url, "fetching archive");

        let archive = fetcher.fetch(&url)?;
        let archive_sha256 = Sha256Digest::compute(&archive);
        reporter.fetched(&url, &archive_sha256);

        if let Some(expected) = plan.expected_sha256.get(platform.vendor) {
            if *expected != archive_sha256 {
                return Err(BuildError::HashMismatch {
                    platform: platform.vendor.to_string(),
                    expected: expected.to_string(),
                    actual: archive_sha256.to_string(),
                });
            }
        }

        let mut members = repacker.repack(&archive)?;
        if members.get(&init_path).is_none() {
            members.insert(init_path.clone(), PackageMember::new(Vec::new()));
        }

        let spec = WheelSpec {
            name: dist.name,
            version: &version,
            platform_tag: platform.tag,
            metadata: &metadata,
            description: &plan.description,
            entry_points: &entry_points,
        };
        let path = writer.write(&plan.out_dir, &spec, &members)?;
        let wheel_sha256 = Sha256Digest::compute_file(&path)?;
        reporter.wrote(&path, &wheel_sha256);
        tracing::info!(platform = platform.vendor, path = %path.display(), members = members.len(), "wrote wheel");

        built.push(BuiltWheel {
            platform: platform.vendor.to_string(),
            url,
            archive_sha256,
            path,
            wheel_sha256,
        });
    }

    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::download::{FetchError, HttpFetcher};
    use crate::reporter::NullReporter;
    use rdfox_pypi_schema::RDFOX;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::{Cursor, Write};
    use std::path::Path;
    use tempfile::tempdir;
    use zip::ZipArchive;
    use zip::write::SimpleFileOptions;

    const BASE: &str = "https://downloads.test/release";

    /// Serves archives from memory and records every request.
    #[derive(Default)]
    struct MemoryFetcher {
        archives: HashMap<String, Vec<u8>>,
        requests: RefCell<Vec<String>>,
    }

    impl MemoryFetcher {
        fn serve(mut self, url: String, body: Vec<u8>) -> Self {
            self.archives.insert(url, body);
            self
        }
    }

    impl Fetcher for MemoryFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.requests.borrow_mut().push(url.to_string());
            Ok(self
                .archives
                .get(url)
                .unwrap_or_else(|| panic!("unexpected fetch of {url}"))
                .clone())
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: RefCell<Vec<String>>,
    }

    impl Reporter for RecordingReporter {
        fn fetched(&self, url: &str, digest: &Sha256Digest) {
            self.events.borrow_mut().push(format!("{digest} {url}"));
        }

        fn wrote(&self, path: &Path, digest: &Sha256Digest) {
            self.events
                .borrow_mut()
                .push(format!("  {digest} {}", path.display()));
        }
    }

    fn vendor_archive(top: &str) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.add_directory(format!("{top}/"), SimpleFileOptions::default())
            .unwrap();
        zip.start_file(
            format!("{top}/RDFox"),
            SimpleFileOptions::default().unix_permissions(0o755),
        )
        .unwrap();
        zip.write_all(b"\x7fELF fake rdfox").unwrap();
        zip.finish().unwrap().into_inner()
    }

    fn plan(out_dir: &Path, platforms: &[&str]) -> BuildPlan {
        BuildPlan {
            out_dir: out_dir.to_path_buf(),
            platforms: platforms.iter().map(ToString::to_string).collect(),
            base_url: BASE.to_string(),
            description: "# RDFox\n".to_string(),
            ..BuildPlan::new("7.2a")
        }
    }

    fn url(platform: &str) -> String {
        RDFOX.archive_url(BASE, "7.2a", platform)
    }

    #[test]
    fn test_unknown_platform_fails_before_fetching() {
        let dir = tempdir().unwrap();
        let fetcher = MemoryFetcher::default();

        let err = build_wheels(
            &plan(dir.path(), &["linux-x86_64", "solaris-sparc"]),
            &RDFOX,
            &PlatformTable::rdfox(),
            &fetcher,
            &NullReporter,
        )
        .unwrap_err();

        assert!(matches!(err, BuildError::UnknownPlatform(p) if p == "solaris-sparc"));
        assert!(fetcher.requests.borrow().is_empty());
    }

    #[test]
    fn test_end_to_end_single_platform() {
        let dir = tempdir().unwrap();
        let fetcher = MemoryFetcher::default().serve(
            url("linux-x86_64"),
            vendor_archive("RDFox-linux-x86_64-7.2a"),
        );

        let built = build_wheels(
            &plan(dir.path(), &["linux-x86_64"]),
            &RDFOX,
            &PlatformTable::rdfox(),
            &fetcher,
            &NullReporter,
        )
        .unwrap();

        assert_eq!(built.len(), 1);
        let wheel = &built[0];
        assert_eq!(
            wheel.path.file_name().unwrap(),
            "rdfox-7.2.1-py3-none-manylinux_2_12_x86_64.manylinux2010_x86_64.musllinux_1_1_x86_64.whl"
        );

        let bytes = std::fs::read(&wheel.path).unwrap();
        assert_eq!(wheel.wheel_sha256, Sha256Digest::compute(&bytes));

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let exe_mode = archive.by_name("rdfox/RDFox").unwrap().unix_mode().unwrap();
        assert_ne!(exe_mode & 0o111, 0);
        assert!(archive.by_name("rdfox/__main__.py").is_ok());
        assert!(archive.by_name("rdfox/__init__.py").is_ok());

        let dist_info: Vec<String> = archive
            .file_names()
            .filter(|n| n.starts_with("rdfox-7.2.1.dist-info/"))
            .map(ToString::to_string)
            .collect();
        assert_eq!(dist_info.len(), 3);
    }

    #[test]
    fn test_suffix_is_appended_to_translated_version() {
        let dir = tempdir().unwrap();
        let fetcher = MemoryFetcher::default()
            .serve(url("win64-x86_64"), vendor_archive("RDFox-win64-x86_64-7.2a"));
        let plan = BuildPlan {
            suffix: ".post1".to_string(),
            ..plan(dir.path(), &["win64-x86_64"])
        };

        let built = build_wheels(&plan, &RDFOX, &PlatformTable::rdfox(), &fetcher, &NullReporter)
            .unwrap();

        assert_eq!(
            built[0].path.file_name().unwrap(),
            "rdfox-7.2.1.post1-py3-none-win_amd64.whl"
        );
    }

    #[test]
    fn test_empty_platform_list_builds_everything_in_order() {
        let dir = tempdir().unwrap();
        let table = PlatformTable::rdfox();
        let fetcher = table.vendors().fold(MemoryFetcher::default(), |f, p| {
            f.serve(url(p), vendor_archive(&format!("RDFox-{p}-7.2a")))
        });

        let built = build_wheels(&plan(dir.path(), &[]), &RDFOX, &table, &fetcher, &NullReporter)
            .unwrap();

        let expected: Vec<String> = table.vendors().map(url).collect();
        assert_eq!(*fetcher.requests.borrow(), expected);
        assert_eq!(built.len(), 5);
        assert!(built.iter().all(|w| w.path.exists()));
    }

    #[test]
    fn test_hash_mismatch_is_fatal() {
        let dir = tempdir().unwrap();
        let fetcher = MemoryFetcher::default().serve(
            url("linux-arm64"),
            vendor_archive("RDFox-linux-arm64-7.2a"),
        );
        let mut plan = plan(dir.path(), &["linux-arm64"]);
        plan.expected_sha256
            .insert("linux-arm64".to_string(), Sha256Digest::compute(b"other"));

        let err = build_wheels(&plan, &RDFOX, &PlatformTable::rdfox(), &fetcher, &NullReporter)
            .unwrap_err();

        assert!(matches!(err, BuildError::HashMismatch { ref platform, .. } if platform == "linux-arm64"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_matching_hash_passes() {
        let dir = tempdir().unwrap();
        let archive = vendor_archive("RDFox-linux-arm64-7.2a");
        let digest = Sha256Digest::compute(&archive);
        let fetcher = MemoryFetcher::default().serve(url("linux-arm64"), archive);
        let mut plan = plan(dir.path(), &["linux-arm64"]);
        plan.expected_sha256.insert("linux-arm64".to_string(), digest.clone());

        let built = build_wheels(&plan, &RDFOX, &PlatformTable::rdfox(), &fetcher, &NullReporter)
            .unwrap();

        assert_eq!(built[0].archive_sha256, digest);
    }

    #[test]
    fn test_pinned_hash_for_unknown_platform_is_rejected() {
        let dir = tempdir().unwrap();
        let mut plan = plan(dir.path(), &["linux-arm64"]);
        plan.expected_sha256
            .insert("linux-riscv".to_string(), Sha256Digest::compute(b""));

        let err = build_wheels(
            &plan,
            &RDFOX,
            &PlatformTable::rdfox(),
            &MemoryFetcher::default(),
            &NullReporter,
        )
        .unwrap_err();

        assert!(matches!(err, BuildError::UnknownPlatform(p) if p == "linux-riscv"));
    }

    #[test]
    fn test_reporter_sees_archive_and_wheel_digests() {
        let dir = tempdir().unwrap();
        let archive = vendor_archive("RDFox-macOS-arm64-7.2a");
        let archive_digest = Sha256Digest::compute(&archive);
        let fetcher = MemoryFetcher::default().serve(url("macOS-arm64"), archive);
        let reporter = RecordingReporter::default();

        let built = build_wheels(
            &plan(dir.path(), &["macOS-arm64"]),
            &RDFOX,
            &PlatformTable::rdfox(),
            &fetcher,
            &reporter,
        )
        .unwrap();

        let events = reporter.events.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], format!("{archive_digest} {}", url("macOS-arm64")));
        assert_eq!(
            events[1],
            format!("  {} {}", built[0].wheel_sha256, built[0].path.display())
        );
    }

    #[test]
    fn test_rebuild_is_reproducible() {
        let dir = tempdir().unwrap();
        let fetcher = MemoryFetcher::default().serve(
            url("macOS-x86_64"),
            vendor_archive("RDFox-macOS-x86_64-7.2a"),
        );
        let plan = plan(dir.path(), &["macOS-x86_64"]);
        let table = PlatformTable::rdfox();

        let first = build_wheels(&plan, &RDFOX, &table, &fetcher, &NullReporter).unwrap();
        let second = build_wheels(&plan, &RDFOX, &table, &fetcher, &NullReporter).unwrap();

        assert_eq!(first[0].wheel_sha256, second[0].wheel_sha256);
    }

    #[test]
    fn test_download_failure_aborts_remaining_platforms() {
        let mut server = mockito::Server::new();
        let missing = server
            .mock("GET", "/v7.2a/RDFox-win64-x86_64-7.2a.zip")
            .with_status(404)
            .create();
        let never = server
            .mock("GET", "/v7.2a/RDFox-macOS-x86_64-7.2a.zip")
            .expect(0)
            .create();

        let dir = tempdir().unwrap();
        let plan = BuildPlan {
            base_url: server.url(),
            ..plan(dir.path(), &["win64-x86_64", "macOS-x86_64"])
        };
        let fetcher = HttpFetcher::new().unwrap();

        let err = build_wheels(&plan, &RDFOX, &PlatformTable::rdfox(), &fetcher, &NullReporter)
            .unwrap_err();

        assert!(matches!(err, BuildError::Fetch(_)));
        missing.assert();
        never.assert();
    }

    #[test]
    fn test_corrupt_archive_aborts() {
        let dir = tempdir().unwrap();
        let fetcher =
            MemoryFetcher::default().serve(url("linux-x86_64"), b"<html>not found</html>".to_vec());

        let err = build_wheels(
            &plan(dir.path(), &["linux-x86_64"]),
            &RDFOX,
            &PlatformTable::rdfox(),
            &fetcher,
            &NullReporter,
        )
        .unwrap_err();

        assert!(matches!(err, BuildError::Repack(_)));
    }
}
