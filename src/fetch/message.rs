use tokio::sync::oneshot::Sender;

use super::data::FetchOutcome;
use crate::ArcStr;

/// Messages that can be sent to the fetch actor.
#[derive(Debug)]
pub enum Message {
    /// Fetches the records at `url`, retrying transient failures
    Execute {
        url: ArcStr,
        tx: Sender<FetchOutcome>,
    },
}
