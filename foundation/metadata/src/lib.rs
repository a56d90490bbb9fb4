use std::time::Duration;

use reqwest::header::{HeaderValue, USER_AGENT};
use tokio::net::lookup_host;
use tokio::sync::OnceCell;

pub const METADATA_IP: &str = "169.254.169.254";
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";
pub const METADATA_GOOGLE_HOST: &str = "metadata.google.internal:80";
pub const METADATA_FLAVOR_KEY: &str = "Metadata-Flavor";
pub const METADATA_GOOGLE: &str = "Google";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid response code: {0}")]
    InvalidResponse(u16),
    #[error(transparent)]
    HttpError(#[from] reqwest::Error),
}

/// Client for the Compute Engine metadata service.
///
/// The host comes from `GCE_METADATA_HOST` or falls back to the well-known
/// `metadata.google.internal:80`, and can be overridden per client. Lookups
/// are cached per client, not per process.
#[derive(Debug)]
pub struct MetadataClient {
    host: String,
    client: reqwest::Client,
    on_gce: OnceCell<bool>,
    project_id: OnceCell<String>,
}

impl Default for MetadataClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataClient {
    pub fn new() -> Self {
        let host = std::env::var(METADATA_HOST_ENV).unwrap_or_else(|_| METADATA_GOOGLE_HOST.to_string());
        Self::with_host(host)
    }

    pub fn with_host(host: impl Into<String>) -> Self {
        Self::with_host_and_timeout(host, DEFAULT_TIMEOUT)
    }

    pub fn with_host_and_timeout(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            client: reqwest::Client::builder().timeout(timeout).build().unwrap(),
            on_gce: OnceCell::new(),
            project_id: OnceCell::new(),
        }
    }

    /// Reports whether the process is running on Compute Engine.
    pub async fn on_gce(&self) -> bool {
        match self.on_gce.get_or_try_init(|| self.test_on_gce()).await {
            Ok(s) => *s,
            Err(_err) => false,
        }
    }

    async fn test_on_gce(&self) -> Result<bool, Error> {
        // The user explicitly said they're on GCE, so trust them.
        if std::env::var(METADATA_HOST_ENV).is_ok() {
            return Ok(true);
        }

        let url = format!("http://{}", self.host);
        if let Ok(response) = self.client.get(&url).send().await {
            if response.status().is_success() {
                let on_gce = match response.headers().get(METADATA_FLAVOR_KEY) {
                    None => false,
                    Some(s) => s == METADATA_GOOGLE,
                };

                if on_gce {
                    return Ok(true);
                }
            }
        }

        match lookup_host(METADATA_GOOGLE_HOST).await {
            Ok(s) => {
                for ip in s {
                    if ip.ip().to_string() == METADATA_IP {
                        return Ok(true);
                    }
                }
            }
            Err(_e) => return Ok(false),
        };

        Ok(false)
    }

    /// Returns the project ID reported by the metadata service.
    pub async fn project_id(&self) -> Result<String, Error> {
        let id = self
            .project_id
            .get_or_try_init(|| self.get_with_trim("project/project-id"))
            .await?;
        Ok(id.clone())
    }

    async fn get_with_trim(&self, suffix: &str) -> Result<String, Error> {
        let result = self.get(suffix).await?;
        Ok(result.trim().to_string())
    }

    async fn get(&self, suffix: &str) -> Result<String, Error> {
        let url = format!("http://{}/computeMetadata/v1/{}", self.host, suffix);
        let response = self
            .client
            .get(url)
            .header(METADATA_FLAVOR_KEY, HeaderValue::from_static(METADATA_GOOGLE))
            .header(USER_AGENT, HeaderValue::from_static("gclite-rust/0.1"))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response.text().await?);
        }
        Err(Error::InvalidResponse(response.status().as_u16()))
    }
}
