use tokio::sync::oneshot::Sender;

use super::data::NetResponse;
use crate::ArcStr;

/// Messages that can be sent to the networking actor.
#[derive(Debug)]
pub enum Message {
    /// Performs an HTTP GET request to the specified URL
    Get {
        url: ArcStr,
        tx: Sender<anyhow::Result<NetResponse>>,
    },
}
