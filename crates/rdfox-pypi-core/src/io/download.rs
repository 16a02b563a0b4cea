//! Blocking archive download.
//!
//! Archives are fetched whole into memory, one platform at a time.

use reqwest::blocking::Client;
use thiserror::Error;

/// Errors raised while fetching an archive.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure or non-success status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Anything that can turn a URL into bytes.
///
/// The pipeline only depends on this trait, so tests can serve archives
/// from memory.
pub trait Fetcher {
    /// Fetch the full body at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be retrieved.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<T: Fetcher + ?Sized> Fetcher for &T {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(url)
    }
}

/// [`Fetcher`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client that identifies itself with [`crate::USER_AGENT`].
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(crate::USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tracing::debug!(url, "fetching archive");
        let response = self.client.get(url).send()?.error_for_status()?;
        let body = response.bytes()?;
        Ok(body.to_vec())
    }
}
