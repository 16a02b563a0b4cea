//! Wheel metadata files.
//!
//! `METADATA` and `WHEEL` are RFC 822 style messages: `Name: value` header
//! lines in a fixed order, a blank line, then an optional free-text body.
//! Repeated fields (`Classifier`, `Project-URL`) are written as repeated
//! header lines.

use rdfox_pypi_schema::Distribution;

/// Core metadata version written to `METADATA`.
pub const METADATA_VERSION: &str = "2.1";

/// Wheel format version written to `WHEEL`.
pub const WHEEL_VERSION: &str = "1.0";

/// An ordered header block with an optional body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl Message {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one header line.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Append one header line per value; nothing if `values` is empty.
    pub fn headers<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.headers.push((name.to_string(), value.into()));
        }
        self
    }

    /// Set the body. An empty body is treated as no body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = (!body.is_empty()).then_some(body);
        self
    }

    /// Header lines in insertion order.
    pub fn header_lines(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render the message as bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, value) in &self.headers {
            writeln!(f, "{name}: {value}")?;
        }
        writeln!(f)?;
        if let Some(body) = &self.body {
            write!(f, "{body}")?;
        }
        Ok(())
    }
}

/// Caller-supplied fields of the `METADATA` file, beyond name and version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreMetadata {
    /// One-line summary
    pub summary: String,
    /// MIME type of the long description
    pub description_content_type: String,
    /// Trove classifiers, possibly none
    pub classifiers: Vec<String>,
    /// `Label, URL` pairs
    pub project_urls: Vec<String>,
    /// Supported Python versions
    pub requires_python: String,
}

impl CoreMetadata {
    /// Fields for a vendor distribution.
    pub fn for_distribution(dist: &Distribution) -> Self {
        Self {
            summary: dist.summary.to_string(),
            description_content_type: dist.description_content_type.to_string(),
            classifiers: dist.classifiers.iter().map(ToString::to_string).collect(),
            project_urls: dist.project_urls.iter().map(ToString::to_string).collect(),
            requires_python: dist.requires_python.to_string(),
        }
    }

    /// Build the `METADATA` message.
    pub fn to_message(&self, name: &str, version: &str, description: &str) -> Message {
        Message::new()
            .header("Metadata-Version", METADATA_VERSION)
            .header("Name", name)
            .header("Version", version)
            .header("Summary", &self.summary)
            .header("Description-Content-Type", &self.description_content_type)
            .headers("Classifier", &self.classifiers)
            .headers("Project-URL", &self.project_urls)
            .header("Requires-Python", &self.requires_python)
            .body(description)
    }
}

/// Build the `WHEEL` message for a platform-specific wheel.
pub fn wheel_message(tag: &str) -> Message {
    Message::new()
        .header("Wheel-Version", WHEEL_VERSION)
        .header("Generator", crate::GENERATOR)
        .header("Root-Is-Purelib", "false")
        .header("Tag", tag)
}
