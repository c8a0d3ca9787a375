use std::{collections::HashMap, time::Duration};

use anyhow::Context;
use tokio::sync::mpsc::Sender;

use crate::{
    ArcStr,
    config::{Config, USizeOpt},
    log::Log,
};

mod core;
mod data;
mod message;
mod mock;

pub use data::{MockReply, NetResponse};
use message::Message;

/// The networking actor, the only part of the crate that talks HTTP.
///
/// A returned `Ok` means the server answered, whatever the status; an `Err`
/// means no answer was obtained (DNS, connection, timeout, broken body).
///
/// # Examples
/// ```ignore
/// let net = Net::spawn(config, log).await?;
/// let response = net.get(ArcStr::from("https://api.jikan.moe/v4/top/anime")).await?;
/// ```
///
/// # Thread Safety
/// Cloning is cheap as it only copies the channel sender or mock reference.
#[derive(Debug, Clone)]
pub enum Net {
    /// A real networking actor that performs HTTP requests
    Actual(Sender<Message>),
    /// A mock serving scripted replies
    Mock(mock::Mock),
}

impl Net {
    /// Spawns a networking actor using the configured request timeout.
    ///
    /// # Errors
    /// If the HTTP client cannot be built.
    pub async fn spawn(config: Config, log: Log) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.usize(USizeOpt::Timeout).await as u64);
        let (net, _) = core::Core::new(timeout, log)?.spawn();
        Ok(net)
    }

    /// Creates a mock serving `replies` per URL.
    pub fn mock(replies: HashMap<ArcStr, Vec<MockReply>>) -> Self {
        Self::Mock(mock::Mock::new(replies))
    }

    /// Creates a mock with no scripted replies.
    pub fn mock_empty() -> Self {
        Self::Mock(mock::Mock::default())
    }

    /// Appends replies for `url` to a mock; does nothing on a real actor.
    pub async fn script(&self, url: ArcStr, replies: Vec<MockReply>) {
        if let Self::Mock(mock) = self {
            mock.script(url, replies).await;
        }
    }

    /// Returns every URL requested so far, only available on mocks.
    pub async fn requests(&self) -> Option<Vec<ArcStr>> {
        match self {
            Self::Actual(_) => None,
            Self::Mock(mock) => Some(mock.requests().await),
        }
    }

    /// Performs an HTTP GET request.
    ///
    /// # Errors
    /// If the request could not be completed.
    pub async fn get(&self, url: ArcStr) -> anyhow::Result<NetResponse> {
        match self {
            Net::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Get { url, tx })
                    .await
                    .context("Sending message to Net actor")?;
                rx.await.context("Receiving response from Net actor")?
            }
            Net::Mock(mock) => mock.get(url).await,
        }
    }
}
