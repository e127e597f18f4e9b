//! How the viewer reaches the diagnostics endpoint.

use std::future::Future;

use super::ViewerError;

/// Raw HTTP outcome; status interpretation is left to the viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait SnapshotTransport {
    /// Where snapshots are fetched from, for log lines
    fn endpoint(&self) -> String;

    fn fetch(&self) -> impl Future<Output = Result<TransportResponse, ViewerError>> + Send;
}

/// Fetches snapshots over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Result<Self, ViewerError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent())
            .build()
            .map_err(|e| ViewerError::Network(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

/// User agent the viewer identifies itself with
pub fn user_agent() -> String {
    format!("diagnostics-viewer/{}", env!("CARGO_PKG_VERSION"))
}

impl SnapshotTransport for HttpTransport {
    fn endpoint(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> impl Future<Output = Result<TransportResponse, ViewerError>> + Send {
        let request = self.client.get(&self.url);
        async move {
            let response = request
                .send()
                .await
                .map_err(|e| ViewerError::Network(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| ViewerError::Network(e.to_string()))?;
            Ok(TransportResponse { status, body })
        }
    }
}
