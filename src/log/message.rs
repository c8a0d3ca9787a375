use tokio::sync::oneshot;

use super::data::LogMessage;

/// Messages that can be sent to the logging actor.
#[derive(Debug)]
pub enum Message {
    /// Writes a message to the log files
    Log(LogMessage),
    /// Prints the buffered messages to stderr and stops the actor
    Flush { tx: oneshot::Sender<()> },
    /// Deletes log files older than the configured maximum age
    CollectGarbage { tx: oneshot::Sender<()> },
}
