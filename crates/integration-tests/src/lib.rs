//! Integration tests for Userbase.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p userbase-integration-tests
//! ```
//!
//! Each test boots the real router on an ephemeral localhost port with a
//! scratch data file, then talks to it over HTTP with `reqwest`. No external
//! services are needed.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use reqwest::{Client, Method, Response};
use serde_json::Value;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use userbase_server::config::ServerConfig;
use userbase_server::state::AppState;
use userbase_server::store::{StoreError, UserStore};

/// Errors while starting a test server.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    /// Scratch directory or socket setup failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// The store could not be opened.
    #[error("store: {0}")]
    Store(#[from] StoreError),
}

/// A running server bound to `127.0.0.1:0` with its own data file.
pub struct TestServer {
    addr: SocketAddr,
    data_file: PathBuf,
    client: Client,
    handle: JoinHandle<()>,
    _dir: TempDir,
}

impl TestServer {
    /// Start a server with default configuration.
    ///
    /// # Errors
    ///
    /// Returns `StartError` if the scratch directory, store, or listener
    /// cannot be set up.
    pub async fn start() -> Result<Self, StartError> {
        Self::start_with(ServerConfig::default()).await
    }

    /// Start a server with a custom configuration.
    ///
    /// `data_file` is always redirected into a scratch directory.
    ///
    /// # Errors
    ///
    /// Returns `StartError` if the scratch directory, store, or listener
    /// cannot be set up.
    pub async fn start_with(mut config: ServerConfig) -> Result<Self, StartError> {
        let dir = tempfile::tempdir()?;
        config.data_file = dir.path().join("db").join("users.json");
        let data_file = config.data_file.clone();

        let store = UserStore::open(data_file.clone()).await?;
        let app = userbase_server::app(AppState::new(config, store));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            data_file,
            client: Client::new(),
            handle,
            _dir: dir,
        })
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Path of the server's data file.
    #[must_use]
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Send a request with an optional JSON body.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request cannot be sent.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, reqwest::Error> {
        let mut builder = self.client.request(method, self.url(path));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.send().await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
