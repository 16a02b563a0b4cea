//! Vendor version to Python version translation.
//!
//! RDFox marks sub-releases with a trailing lowercase letter (`7.2a`,
//! `7.2b`). PEP 440 has no room for that, so the letter becomes a numeric
//! patch component: `7.2a` is published as `7.2.1`, `7.2c` as `7.2.3`.

/// Translate a vendor version into a wheel version.
///
/// A trailing ASCII lowercase letter is replaced by `.N` where `N` is the
/// letter's 1-based position in the alphabet. Anything else, including an
/// uppercase letter or an empty string, is returned unchanged.
///
/// ```
/// use rdfox_pypi_schema::wheel_version;
///
/// assert_eq!(wheel_version("7.2a"), "7.2.1");
/// assert_eq!(wheel_version("7.2"), "7.2");
/// ```
pub fn wheel_version(vendor_version: &str) -> String {
    match vendor_version.as_bytes().last() {
        Some(&last) if last.is_ascii_lowercase() => {
            let patch = u32::from(last - b'a') + 1;
            let base = &vendor_version[..vendor_version.len() - 1];
            format!("{base}.{patch}")
        }
        _ => vendor_version.to_string(),
    }
}
