//! The resilient fetch controller.
//!
//! One logical GET against the catalog service, shielded from transient
//! failure: transport errors and `429 Too Many Requests` are retried with
//! exponential backoff, every other failure is reported at once. The
//! controller knows nothing about views, searches or UI state.

use std::collections::HashMap;

use tokio::sync::mpsc::Sender;

use crate::{ArcStr, log::Log, net::Net};

mod core;
mod data;
mod message;
mod mock;
#[cfg(test)]
mod tests;

pub use data::{FetchError, FetchOutcome, Item, MockOutcome, RetryPolicy, parse_items};
use message::Message;

/// The fetch actor.
///
/// # Examples
/// ```ignore
/// let fetch = Fetch::spawn(net, log, RetryPolicy::default());
/// let items = fetch.execute(ArcStr::from("https://api.jikan.moe/v4/top/anime")).await?;
/// ```
///
/// # Thread Safety
/// Cloning is cheap as it only copies the channel sender or the mock reference.
#[derive(Debug, Clone)]
pub enum Fetch {
    /// A real fetch actor retrying over the networking actor
    Actual(Sender<Message>),
    /// A mock serving scripted outcomes
    Mock(mock::Mock),
}

impl Fetch {
    /// Spawns a fetch actor issuing requests through `net`.
    pub fn spawn(net: Net, log: Log, policy: RetryPolicy) -> Self {
        let (fetch, _) = core::Core::new(net, log, policy).spawn();
        fetch
    }

    /// Creates a mock serving `outcomes` per URL.
    pub fn mock(outcomes: HashMap<ArcStr, Vec<MockOutcome>>) -> Self {
        Self::Mock(mock::Mock::new(outcomes))
    }

    /// Appends outcomes for `url` to a mock; does nothing on a real actor.
    pub async fn script(&self, url: ArcStr, outcomes: Vec<MockOutcome>) {
        if let Self::Mock(mock) = self {
            mock.script(url, outcomes).await;
        }
    }

    /// Returns every URL executed so far, only available on mocks.
    pub async fn requests(&self) -> Option<Vec<ArcStr>> {
        match self {
            Self::Actual(_) => None,
            Self::Mock(mock) => Some(mock.requests().await),
        }
    }

    /// Fetches the records at `url`.
    ///
    /// Executions are independent: several may be in flight at once and none
    /// waits for another.
    pub async fn execute(&self, url: ArcStr) -> FetchOutcome {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                if sender.send(Message::Execute { url, tx }).await.is_err() {
                    return Err(actor_stopped());
                }
                rx.await.unwrap_or_else(|_| Err(actor_stopped()))
            }
            Self::Mock(mock) => mock.execute(url).await,
        }
    }
}

fn actor_stopped() -> FetchError {
    FetchError::Transport("fetch actor is not running".to_string())
}
