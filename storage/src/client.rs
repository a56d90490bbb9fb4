use std::ops::Deref;
use std::sync::Arc;

use token_source::{TokenSource, TokenSourceProvider};

use crate::http::connection::Connection;

/// Placeholder for configurations that have not chosen an auth method yet.
#[derive(Debug)]
pub struct NopTokenSourceProvider {}

impl TokenSourceProvider for NopTokenSourceProvider {
    fn token_source(&self) -> Arc<dyn TokenSource> {
        panic!("no token source provider is configured. use with_auth() or anonymous()")
    }
}

#[derive(Debug)]
pub struct ClientConfig {
    pub http: Option<reqwest::Client>,
    pub storage_endpoint: String,
    pub token_source_provider: Option<Box<dyn TokenSourceProvider>>,
    pub project_id: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            http: None,
            storage_endpoint: "https://storage.googleapis.com".to_string(),
            token_source_provider: Some(Box::new(NopTokenSourceProvider {})),
            project_id: None,
        }
    }
}

impl ClientConfig {
    pub fn anonymous(mut self) -> Self {
        self.token_source_provider = None;
        self
    }
}

#[cfg(feature = "auth")]
pub use google_cloud_auth;

#[cfg(feature = "auth")]
impl ClientConfig {
    /// Builds a token source from the ambient credentials, narrowed to the
    /// storage scopes, and resolves the default project.
    pub async fn with_auth(self) -> Result<Self, google_cloud_auth::error::Error> {
        let ts = google_cloud_auth::token::DefaultTokenSourceProvider::new(Self::auth_config()).await?;
        Ok(self.with_token_source(ts).await)
    }

    /// Same as [`with_auth`](ClientConfig::with_auth), from an already
    /// parsed credentials file.
    pub async fn with_credentials(
        self,
        credentials: google_cloud_auth::credentials::CredentialsFile,
    ) -> Result<Self, google_cloud_auth::error::Error> {
        let ts = google_cloud_auth::token::DefaultTokenSourceProvider::new_with_credentials(
            Self::auth_config(),
            Box::new(credentials),
        )
        .await?;
        Ok(self.with_token_source(ts).await)
    }

    async fn with_token_source(mut self, ts: google_cloud_auth::token::DefaultTokenSourceProvider) -> Self {
        let credential_project = ts.project_id.clone();
        self.project_id = gclite_core::project::DefaultProjectResolver::default()
            .resolve(credential_project.as_deref())
            .await;
        self.token_source_provider = Some(Box::new(ts));
        self
    }

    fn auth_config() -> google_cloud_auth::project::Config<'static> {
        google_cloud_auth::project::Config::default().with_scopes(&crate::http::connection::SCOPES)
    }
}

pub struct Client {
    connection: Connection,
    project_id: Option<String>,
}

impl Deref for Client {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.connection
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl Client {
    /// New client
    pub fn new(config: ClientConfig) -> Self {
        let ts = match config.token_source_provider {
            Some(tsp) => Some(tsp.token_source()),
            None => {
                tracing::trace!("Use anonymous access due to lack of token");
                None
            }
        };
        let http = config.http.unwrap_or_default();
        let connection = Connection::new(ts, config.storage_endpoint.as_str(), http);
        Self {
            connection,
            project_id: config.project_id,
        }
    }

    /// The project the client was resolved against, when one was found.
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }
}
