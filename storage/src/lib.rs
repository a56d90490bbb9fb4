//! # gclite-storage
//!
//! A scoped connection to the Cloud Storage JSON API.
//!
//! * [About Cloud Storage](https://cloud.google.com/storage/)
//! * [JSON API Documentation](https://cloud.google.com/storage/docs/json_api/v1)
//!
//! ## Quick Start
//!
//! The function `with_auth()` reads the credentials from a file specified in
//! the environment variable `GOOGLE_APPLICATION_CREDENTIALS`,
//! `GOOGLE_APPLICATION_CREDENTIALS_JSON` or from a metadata server, narrows
//! them to the storage scopes, and resolves the default project.
//!
//! ```
//! use gclite_storage::client::{Client, ClientConfig};
//!
//! async fn run() {
//!     let config = ClientConfig::default().with_auth().await.unwrap();
//!     let client = Client::new(config);
//!     let bucket = client.get("/b/my-bucket");
//!     let metadata: serde_json::Value = client.send(bucket).await.unwrap();
//! }
//! ```
//!
//! To provide anonymous access without authentication, do the following.
//!
//! ```
//! use gclite_storage::client::{Client, ClientConfig};
//!
//! async fn run() {
//!     let config = ClientConfig::default().anonymous();
//!     let client = Client::new(config);
//! }
//! ```

pub mod client;
pub mod http;
