use tokio::sync::{broadcast, oneshot::Sender, watch};

use super::data::{Notification, OrchestratorState};
use crate::{
    ArcStr,
    catalog::{RequestDescriptor, View},
    fetch::FetchOutcome,
};

/// Messages that can be sent to the orchestrator actor.
#[derive(Debug)]
pub enum Message {
    /// Selects a view and queries it
    SetView { view: View },
    /// Replaces the search buffer without querying
    SetSearchText { text: ArcStr },
    /// Queries the current view with the current search buffer
    SubmitSearch,
    /// Goes back to the anime listing
    Reset,
    /// Reads a snapshot of the state
    State { tx: Sender<OrchestratorState> },
    /// Subscribes to state snapshots
    Watch {
        tx: Sender<watch::Receiver<OrchestratorState>>,
    },
    /// Subscribes to notifications
    Subscribe {
        tx: Sender<broadcast::Receiver<Notification>>,
    },
    /// Delivers the outcome of the fetch launched for `descriptor`
    Settle {
        descriptor: RequestDescriptor,
        outcome: FetchOutcome,
    },
    /// Hides the notification `id` if it is still the visible one
    Dismiss { id: u64 },
}
