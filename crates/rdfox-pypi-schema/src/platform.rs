//! Vendor platform identifiers and their Python platform tags.
//!
//! RDFox publishes one archive per platform (`linux-x86_64`, `macOS-arm64`,
//! ...). Each one becomes a wheel tagged with the matching Python platform
//! tag set, which pip uses to pick the right wheel for the host.
//!
//! # Example
//!
//! ```
//! use rdfox_pypi_schema::PlatformTable;
//!
//! let table = PlatformTable::rdfox();
//! assert_eq!(table.tag("win64-x86_64"), Some("win_amd64"));
//! ```

/// One row of the platform table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    /// Identifier used by the vendor in archive names (e.g. `linux-x86_64`)
    pub vendor: &'static str,
    /// Python platform tag, compressed tag sets joined by dots
    pub tag: &'static str,
}

/// Platforms RDFox ships binaries for, in build order.
pub const RDFOX_PLATFORMS: &[Platform] = &[
    Platform {
        vendor: "win64-x86_64",
        tag: "win_amd64",
    },
    Platform {
        vendor: "macOS-x86_64",
        tag: "macosx_10_9_x86_64",
    },
    Platform {
        vendor: "macOS-arm64",
        tag: "macosx_11_0_arm64",
    },
    Platform {
        vendor: "linux-x86_64",
        tag: "manylinux_2_12_x86_64.manylinux2010_x86_64.musllinux_1_1_x86_64",
    },
    Platform {
        vendor: "linux-arm64",
        tag: "manylinux_2_17_aarch64.manylinux2014_aarch64.musllinux_1_1_aarch64",
    },
];

/// Immutable lookup table from vendor platform to Python platform tag.
///
/// Built once and handed around by reference; nothing mutates it after
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformTable {
    entries: &'static [Platform],
}

impl PlatformTable {
    /// Create a table over a fixed set of rows.
    pub const fn new(entries: &'static [Platform]) -> Self {
        Self { entries }
    }

    /// The table for RDFox releases.
    pub const fn rdfox() -> Self {
        Self::new(RDFOX_PLATFORMS)
    }

    /// Look up a row by vendor platform identifier (case-sensitive).
    pub fn get(&self, vendor: &str) -> Option<&Platform> {
        self.entries.iter().find(|p| p.vendor == vendor)
    }

    /// Python platform tag for a vendor platform identifier.
    pub fn tag(&self, vendor: &str) -> Option<&'static str> {
        self.get(vendor).map(|p| p.tag)
    }

    /// All vendor platform identifiers, in table order.
    pub fn vendors(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|p| p.vendor)
    }

    /// Iterate over every row.
    pub fn iter(&self) -> std::slice::Iter<'static, Platform> {
        self.entries.iter()
    }
}

impl Default for PlatformTable {
    fn default() -> Self {
        Self::rdfox()
    }
}
