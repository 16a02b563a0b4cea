//! Static description of the vendor distribution being repackaged.

/// Default location of the vendor's release archives.
pub const RDFOX_DOWNLOAD_BASE_URL: &str =
    "https://rdfox-distribution.s3.eu-west-2.amazonaws.com/release";

/// Everything about the upstream product and the wheel it becomes that does
/// not change between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Distribution {
    /// Vendor product name, used in archive names and to spot the main executable
    pub product: &'static str,
    /// Python distribution name and top-level package directory
    pub name: &'static str,
    /// One-line summary for the `Summary` metadata field
    pub summary: &'static str,
    /// `Description-Content-Type` of the long description
    pub description_content_type: &'static str,
    /// Trove classifiers
    pub classifiers: &'static [&'static str],
    /// `Project-URL` values (`Label, URL`)
    pub project_urls: &'static [&'static str],
    /// `Requires-Python` specifier
    pub requires_python: &'static str,
    /// Command installed by pip as a console script
    pub console_script: &'static str,
}

/// The RDFox distribution.
pub const RDFOX: Distribution = Distribution {
    product: "RDFox",
    name: "rdfox",
    summary: "RDFox is a high performance knowledge graph and semantic reasoning engine.",
    description_content_type: "text/markdown",
    classifiers: &[],
    project_urls: &[
        "Homepage, https://www.oxfordsemantic.tech/product",
        "Source Code, https://github.com/ricklupton/rdfox-pypi",
        "Bug Tracker, https://github.com/ricklupton/rdfox-pypi/issues",
    ],
    requires_python: "~=3.5",
    console_script: "RDFox",
};

impl Distribution {
    /// Download URL of the vendor archive for one platform.
    ///
    /// Layout: `{base}/v{version}/{product}-{platform}-{version}.zip`. A
    /// trailing slash on `base_url` is ignored.
    pub fn archive_url(&self, base_url: &str, vendor_version: &str, vendor_platform: &str) -> String {
        format!(
            "{}/v{vendor_version}/{}-{vendor_platform}-{vendor_version}.zip",
            base_url.trim_end_matches('/'),
            self.product,
        )
    }

    /// Path of the launcher module inside the wheel.
    pub fn launcher_path(&self) -> String {
        format!("{}/__main__.py", self.name)
    }

    /// Contents of `entry_points.txt`, pointing the console script at the launcher.
    pub fn entry_points(&self) -> String {
        format!(
            "[console_scripts]\n{} = {}.__main__:main\n",
            self.console_script, self.name
        )
    }
}
