use std::fmt::Display;

use tokio::sync::mpsc::{Sender, error::TrySendError};

use crate::{ArcPath, fs::Fs};

mod core;
mod data;
mod message;
mod mock;

pub use self::core::LogCore;
pub use data::{LogLevel, LogMessage};
use message::Message;

/// The logging actor.
///
/// Logging is fire-and-forget: the helpers never block and never fail, a
/// message that cannot be delivered is dropped.
///
/// # Examples
/// ```ignore
/// let log = Log::spawn(fs, LogLevel::Warning, 7, log_dir).await?;
/// log.info("app", "Starting radar");
/// ```
///
/// # Thread Safety
/// Cloning is cheap as it only copies the channel sender or the mock reference.
#[derive(Debug, Clone)]
pub enum Log {
    /// A real logging actor that writes to files and stderr
    Actual(Sender<Message>),
    /// A mock that keeps messages in memory
    Mock(mock::Mock),
}

impl From<LogCore> for Log {
    fn from(value: LogCore) -> Self {
        value.spawn().0
    }
}

impl Log {
    /// Builds a [`LogCore`] and spawns it.
    ///
    /// # Errors
    /// If the log directory or files cannot be created.
    pub async fn spawn(
        fs: Fs,
        level: LogLevel,
        max_age: usize,
        log_dir: ArcPath,
    ) -> anyhow::Result<Self> {
        Ok(LogCore::build(fs, level, max_age, log_dir).await?.into())
    }

    /// Creates a mock logger that records messages in memory.
    pub fn mock() -> Self {
        Self::Mock(mock::Mock::new())
    }

    fn log(&self, scope: &'static str, message: String, level: LogLevel) {
        let message = LogMessage::new(level, scope, message);
        match self {
            Log::Mock(mock) => mock.push(message),
            Log::Actual(sender) => {
                if let Err(TrySendError::Full(msg)) = sender.try_send(Message::Log(message)) {
                    let sender = sender.clone();
                    tokio::spawn(async move {
                        let _ = sender.send(msg).await;
                    });
                }
            }
        }
    }

    /// Log a message with the `INFO` level
    pub fn info<M: Display>(&self, scope: &'static str, message: M) {
        self.log(scope, message.to_string(), LogLevel::Info);
    }

    /// Log a message with the `WARNING` level
    pub fn warn<M: Display>(&self, scope: &'static str, message: M) {
        self.log(scope, message.to_string(), LogLevel::Warning);
    }

    /// Log a message with the `ERROR` level
    pub fn error<M: Display>(&self, scope: &'static str, message: M) {
        self.log(scope, message.to_string(), LogLevel::Error);
    }

    /// Log an info message if the result is an error and return the result as is
    pub fn info_on_error<T, E: Display>(
        &self,
        scope: &'static str,
        result: Result<T, E>,
    ) -> Result<T, E> {
        result.inspect_err(|err| self.log(scope, err.to_string(), LogLevel::Info))
    }

    /// Log a warning message if the result is an error and return the result as is
    pub fn warn_on_error<T, E: Display>(
        &self,
        scope: &'static str,
        result: Result<T, E>,
    ) -> Result<T, E> {
        result.inspect_err(|err| self.log(scope, err.to_string(), LogLevel::Warning))
    }

    /// Log an error message if the result is an error and return the result as is
    pub fn error_on_error<T, E: Display>(
        &self,
        scope: &'static str,
        result: Result<T, E>,
    ) -> Result<T, E> {
        result.inspect_err(|err| self.log(scope, err.to_string(), LogLevel::Error))
    }

    /// Prints the buffered messages to stderr and stops the actor.
    ///
    /// Consumes the handle; other clones can still be used but their
    /// messages are dropped.
    pub async fn flush(self) {
        let Self::Actual(sender) = self else {
            return;
        };
        let (tx, rx) = tokio::sync::oneshot::channel();
        if sender.send(Message::Flush { tx }).await.is_ok() {
            let _ = rx.await;
        }
    }

    /// Deletes log files older than the `max_age` given to [`Log::spawn`].
    pub async fn collect_garbage(&self) {
        let Self::Actual(sender) = self else {
            return;
        };
        let (tx, rx) = tokio::sync::oneshot::channel();
        if sender.send(Message::CollectGarbage { tx }).await.is_ok() {
            let _ = rx.await;
        }
    }

    /// Returns the recorded messages, only available on mocks.
    pub fn get_messages(&self) -> Option<Vec<LogMessage>> {
        match self {
            Self::Actual(_) => None,
            Self::Mock(mock) => Some(mock.messages()),
        }
    }
}
