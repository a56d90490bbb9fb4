use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response};
use token_source::TokenSource;

use crate::http::Error;

/// The scopes required for authenticating as a Cloud Storage consumer.
pub const SCOPES: [&str; 3] = [
    "https://www.googleapis.com/auth/devstorage.full_control",
    "https://www.googleapis.com/auth/devstorage.read_only",
    "https://www.googleapis.com/auth/devstorage.read_write",
];

/// The version of the API, used in building the API call's URL.
pub const API_VERSION: &str = "v1";

/// An authenticated JSON connection bound to the storage API surface.
///
/// Holds configuration only; request execution is delegated to the
/// underlying HTTP client with auth headers attached.
#[derive(Clone)]
pub struct Connection {
    ts: Option<Arc<dyn TokenSource>>,
    endpoint: String,
    http: Client,
}

impl Connection {
    pub(crate) fn new(ts: Option<Arc<dyn TokenSource>>, endpoint: &str, http: Client) -> Self {
        Self {
            ts,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Builds the URL of an API call from its path, e.g. `/b/bucket-name`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/storage/{}{}", self.endpoint, API_VERSION, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path))
    }

    async fn with_headers(&self, builder: RequestBuilder) -> Result<RequestBuilder, Error> {
        let builder = builder
            .header("X-Goog-Api-Client", "rust")
            .header(reqwest::header::USER_AGENT, "gclite-storage");
        match &self.ts {
            Some(ts) => {
                let token = ts.token().await.map_err(Error::TokenSource)?;
                Ok(builder.header(reqwest::header::AUTHORIZATION, token))
            }
            None => Ok(builder),
        }
    }

    /// Executes a request, decoding the JSON response body.
    pub async fn send<T: for<'de> serde::Deserialize<'de>>(&self, builder: RequestBuilder) -> Result<T, Error> {
        let builder = self.with_headers(builder).await?;
        let response = builder.send().await?;
        if response.status().is_success() {
            let text = response.text().await?;
            tracing::trace!("{}", text);
            Ok(serde_json::from_str(&text)?)
        } else {
            Err(map_error(response).await)
        }
    }

    /// Executes a request, discarding the response body.
    pub async fn send_get_empty(&self, builder: RequestBuilder) -> Result<(), Error> {
        let builder = self.with_headers(builder).await?;
        let response = builder.send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(map_error(response).await)
        }
    }
}

async fn map_error(r: Response) -> Error {
    let status = r.status().as_u16();
    let text = match r.text().await {
        Ok(text) => text,
        Err(e) => format!("{}", e),
    };
    Error::Response(status, text)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::Value;
    use token_source::{TokenSource, TokenSourceProvider};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::client::{Client, ClientConfig};
    use crate::http::Error;

    #[derive(Debug)]
    struct FakeTokenSource;

    #[async_trait]
    impl TokenSource for FakeTokenSource {
        async fn token(&self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            Ok("Bearer fake-token".to_string())
        }
    }

    #[derive(Debug)]
    struct FakeTokenSourceProvider;

    impl TokenSourceProvider for FakeTokenSourceProvider {
        fn token_source(&self) -> Arc<dyn TokenSource> {
            Arc::new(FakeTokenSource)
        }
    }

    fn anonymous_client(endpoint: &str) -> Client {
        let config = ClientConfig {
            storage_endpoint: endpoint.to_string(),
            ..ClientConfig::default()
        }
        .anonymous();
        Client::new(config)
    }

    fn authenticated_client(endpoint: &str) -> Client {
        let config = ClientConfig {
            storage_endpoint: endpoint.to_string(),
            token_source_provider: Some(Box::new(FakeTokenSourceProvider)),
            ..ClientConfig::default()
        };
        Client::new(config)
    }

    #[test]
    fn test_url_template() {
        let client = anonymous_client("https://storage.googleapis.com");
        assert_eq!(
            client.url("/b/my-bucket"),
            "https://storage.googleapis.com/storage/v1/b/my-bucket"
        );
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let client = anonymous_client("http://localhost:9000/");
        assert_eq!(client.url("/b/my-bucket"), "http://localhost:9000/storage/v1/b/my-bucket");
    }

    #[tokio::test]
    async fn test_send_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/test-bucket"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name":"test-bucket"}"#))
            .mount(&server)
            .await;

        let client = anonymous_client(&server.uri());
        let body: Value = client.send(client.get("/b/test-bucket")).await.unwrap();
        assert_eq!(body["name"], "test-bucket");
    }

    #[tokio::test]
    async fn test_send_attaches_auth_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/test-bucket"))
            .and(header("authorization", "Bearer fake-token"))
            .and(header("x-goog-api-client", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = authenticated_client(&server.uri());
        let _: Value = client.send(client.get("/b/test-bucket")).await.unwrap();
    }

    #[tokio::test]
    async fn test_anonymous_send_omits_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/test-bucket"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let client = anonymous_client(&server.uri());
        let _: Value = client.send(client.get("/b/test-bucket")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_error_status_maps_to_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("bucket not found"))
            .mount(&server)
            .await;

        let client = anonymous_client(&server.uri());
        let result: Result<Value, Error> = client.send(client.get("/b/missing")).await;
        match result {
            Err(Error::Response(404, detail)) => assert_eq!(detail, "bucket not found"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_get_empty() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/storage/v1/b/test-bucket"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = authenticated_client(&server.uri());
        client.send_get_empty(client.delete("/b/test-bucket")).await.unwrap();
    }
}
