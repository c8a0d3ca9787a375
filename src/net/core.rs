use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, header::ACCEPT};
use tokio::task::JoinHandle;

use super::{Net, data::NetResponse, message::Message};
use crate::log::Log;

const SCOPE: &str = "net";

/// The core of the networking actor.
///
/// Wraps a pooled [`reqwest::Client`]. Each request runs on its own task so
/// a slow response never holds back the ones queued after it.
#[derive(Debug)]
pub struct Core {
    /// Logging interface for operation logging
    log: Log,
    /// HTTP client for making requests
    client: Client,
}

impl Core {
    /// Creates a networking core whose requests give up after `timeout`.
    ///
    /// # Errors
    /// If the TLS backend cannot be initialised.
    pub fn new(timeout: Duration, log: Log) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Building HTTP client")?;
        Ok(Self { log, client })
    }

    /// Transforms the core into an actor.
    pub fn spawn(self) -> (Net, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Get { url, tx } => {
                        let client = self.client.clone();
                        let log = self.log.clone();
                        tokio::spawn(async move {
                            let response = Self::handle_get_request(&client, &url)
                                .await
                                .with_context(|| format!("GET request failed for URL: {url}"));
                            let _ = tx.send(log.info_on_error(SCOPE, response));
                        });
                    }
                }
            }
        });

        (Net::Actual(tx), handle)
    }

    async fn handle_get_request(client: &Client, url: &str) -> anyhow::Result<NetResponse> {
        let response = client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .context("Sending GET request")?;
        let status = response.status().as_u16();
        let body = response.text().await.context("Reading response body")?;
        Ok(NetResponse::new(status, body))
    }
}
