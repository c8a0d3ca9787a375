//! The query orchestrator.
//!
//! Turns the user's intent, a view plus a search buffer, into catalog
//! queries and keeps the displayed state consistent with the most recent
//! intent even when responses race or fail. Outcomes of superseded queries
//! are discarded, failures raise a transient notification.

use std::time::Duration;

use anyhow::Context;
use tokio::sync::{broadcast, mpsc::Sender, oneshot, watch};

use crate::{
    ArcStr,
    catalog::View,
    config::{Config, StrOpt, USizeOpt},
    fetch::Fetch,
    log::Log,
};

mod core;
mod data;
mod message;
mod mock;
#[cfg(test)]
mod tests;

pub use data::{NETWORK_ISSUE, Notification, OrchestratorState, Phase};
use message::Message;

/// The orchestrator actor.
///
/// # Examples
/// ```ignore
/// let orchestrator = Orchestrator::spawn(fetch, log, base_url, Duration::from_secs(3));
/// orchestrator.set_search_text(ArcStr::from("robot")).await?;
/// orchestrator.set_view(View::Manga).await?;
/// let state = orchestrator.state().await?;
/// ```
///
/// # Thread Safety
/// Cloning is cheap as it only copies the channel sender or the mock reference.
#[derive(Debug, Clone)]
pub enum Orchestrator {
    /// A real orchestrator issuing queries through the fetch actor
    Actual(Sender<Message>),
    /// A mock that only edits its state
    Mock(mock::Mock),
}

impl Orchestrator {
    /// Spawns an orchestrator querying the catalog at `base_url`.
    pub fn spawn(
        fetch: Fetch,
        log: Log,
        base_url: ArcStr,
        notification_duration: Duration,
    ) -> Self {
        let core = core::Core::new(fetch, log, base_url, notification_duration);
        let (orchestrator, _) = core.spawn();
        orchestrator
    }

    /// Spawns an orchestrator using the configured base URL and notification duration.
    pub async fn from_config(fetch: Fetch, log: Log, config: &Config) -> Self {
        let base_url = config.str(StrOpt::BaseUrl).await;
        let millis = config.usize(USizeOpt::NotificationMs).await as u64;
        Self::spawn(fetch, log, base_url, Duration::from_millis(millis))
    }

    /// Creates a mock starting from `state`.
    pub fn mock(state: OrchestratorState) -> Self {
        Self::Mock(mock::Mock::new(state))
    }

    /// How many queries a mock would have launched, only available on mocks.
    pub async fn launched(&self) -> Option<usize> {
        match self {
            Self::Actual(_) => None,
            Self::Mock(mock) => Some(mock.launched().await),
        }
    }

    async fn send(sender: &Sender<Message>, message: Message) -> anyhow::Result<()> {
        sender
            .send(message)
            .await
            .context("Sending message to Orchestrator actor")
    }

    async fn request<T>(
        sender: &Sender<Message>,
        build: impl FnOnce(oneshot::Sender<T>) -> Message,
    ) -> anyhow::Result<T> {
        let (tx, rx) = oneshot::channel();
        Self::send(sender, build(tx)).await?;
        rx.await
            .context("Receiving response from Orchestrator actor")
    }

    /// Selects `view` and queries it with the current search buffer.
    pub async fn set_view(&self, view: View) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => Self::send(sender, Message::SetView { view }).await,
            Self::Mock(mock) => {
                mock.set_view(view).await;
                Ok(())
            }
        }
    }

    /// Replaces the search buffer. Does not query.
    pub async fn set_search_text(&self, text: ArcStr) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => Self::send(sender, Message::SetSearchText { text }).await,
            Self::Mock(mock) => {
                mock.set_search_text(text).await;
                Ok(())
            }
        }
    }

    /// Queries the current view with the current search buffer.
    ///
    /// Every call launches a query, even when the intent did not change.
    pub async fn submit_search(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => Self::send(sender, Message::SubmitSearch).await,
            Self::Mock(mock) => {
                mock.submit_search().await;
                Ok(())
            }
        }
    }

    /// Goes back to the anime listing with an empty search buffer.
    pub async fn reset(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => Self::send(sender, Message::Reset).await,
            Self::Mock(mock) => {
                mock.reset().await;
                Ok(())
            }
        }
    }

    /// Returns a snapshot of the state.
    pub async fn state(&self) -> anyhow::Result<OrchestratorState> {
        match self {
            Self::Actual(sender) => Self::request(sender, |tx| Message::State { tx }).await,
            Self::Mock(mock) => Ok(mock.state().await),
        }
    }

    /// Returns a receiver updated after every state change.
    pub async fn watch(&self) -> anyhow::Result<watch::Receiver<OrchestratorState>> {
        match self {
            Self::Actual(sender) => Self::request(sender, |tx| Message::Watch { tx }).await,
            Self::Mock(mock) => Ok(mock.watch()),
        }
    }

    /// Returns a receiver of every notification raised from now on.
    pub async fn subscribe(&self) -> anyhow::Result<broadcast::Receiver<Notification>> {
        match self {
            Self::Actual(sender) => Self::request(sender, |tx| Message::Subscribe { tx }).await,
            Self::Mock(mock) => Ok(mock.subscribe()),
        }
    }
}
