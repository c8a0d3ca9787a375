use tokio::sync::{mpsc::Sender, oneshot};

pub use data::{Data, PathOpt, StrOpt, USizeOpt};
use message::Message;

use crate::{ArcPath, ArcStr, fs::Fs, log::LogLevel};

mod core;
mod data;
mod message;
mod mock;

/// The configuration actor.
///
/// # Examples
/// ```ignore
/// let config = Config::spawn(fs, config_path);
/// config.load().await?;
/// let base_url = config.str(StrOpt::BaseUrl).await;
/// ```
///
/// # Thread Safety
/// Cloning is cheap as it only copies the channel sender or the mock reference.
#[derive(Debug, Clone)]
pub enum Config {
    /// A real configuration actor backed by a TOML file
    Actual(Sender<Message>),
    /// A mock that keeps the data in memory
    Mock(mock::Mock),
}

impl Config {
    /// Spawns a configuration actor for the file at `path`.
    ///
    /// The actor starts with default values; call [`Config::load`] to read the file.
    pub fn spawn(fs: Fs, path: ArcPath) -> Self {
        let (config, _) = core::Core::new(fs, path).spawn();
        config
    }

    /// Creates a mock configuration holding `data`.
    pub fn mock(data: Data) -> Self {
        Self::Mock(mock::Mock::new(data))
    }

    /// Sends a request and waits for its reply.
    ///
    /// # Panics
    /// If the actor is dead, which only happens if it panicked.
    async fn ask<T>(
        sender: &Sender<Message>,
        build: impl FnOnce(oneshot::Sender<T>) -> Message,
    ) -> T {
        let (tx, rx) = oneshot::channel();
        sender.send(build(tx)).await.expect("Config actor died");
        rx.await.expect("Config actor died")
    }

    /// Loads the configuration from the file, a no-op for mocks.
    pub async fn load(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => Self::ask(sender, |tx| Message::Load { tx }).await,
            Self::Mock(_) => Ok(()),
        }
    }

    /// Saves the configuration to the file, a no-op for mocks.
    pub async fn save(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => Self::ask(sender, |tx| Message::Save { tx }).await,
            Self::Mock(_) => Ok(()),
        }
    }

    /// Gets a path-based configuration value.
    pub async fn path(&self, opt: PathOpt) -> ArcPath {
        match self {
            Self::Actual(sender) => Self::ask(sender, |tx| Message::GetPath { opt, tx }).await,
            Self::Mock(mock) => mock.path(opt).await,
        }
    }

    /// Sets a path-based configuration value.
    pub async fn set_path(&self, opt: PathOpt, path: ArcPath) {
        match self {
            Self::Actual(sender) => {
                let _ = sender.send(Message::SetPath { opt, path }).await;
            }
            Self::Mock(mock) => mock.set_path(opt, path).await,
        }
    }

    /// Gets a string configuration value.
    pub async fn str(&self, opt: StrOpt) -> ArcStr {
        match self {
            Self::Actual(sender) => Self::ask(sender, |tx| Message::GetStr { opt, tx }).await,
            Self::Mock(mock) => mock.str(opt).await,
        }
    }

    /// Sets a string configuration value.
    pub async fn set_str(&self, opt: StrOpt, value: ArcStr) {
        match self {
            Self::Actual(sender) => {
                let _ = sender.send(Message::SetStr { opt, value }).await;
            }
            Self::Mock(mock) => mock.set_str(opt, value).await,
        }
    }

    /// Gets the log level.
    pub async fn log_level(&self) -> LogLevel {
        match self {
            Self::Actual(sender) => Self::ask(sender, |tx| Message::GetLogLevel { tx }).await,
            Self::Mock(mock) => mock.log_level().await,
        }
    }

    /// Sets the log level.
    pub async fn set_log_level(&self, level: LogLevel) {
        match self {
            Self::Actual(sender) => {
                let _ = sender.send(Message::SetLogLevel { level }).await;
            }
            Self::Mock(mock) => mock.set_log_level(level).await,
        }
    }

    /// Gets a numeric configuration value.
    pub async fn usize(&self, opt: USizeOpt) -> usize {
        match self {
            Self::Actual(sender) => Self::ask(sender, |tx| Message::GetUSize { opt, tx }).await,
            Self::Mock(mock) => mock.usize(opt).await,
        }
    }

    /// Sets a numeric configuration value.
    pub async fn set_usize(&self, opt: USizeOpt, value: usize) {
        match self {
            Self::Actual(sender) => {
                let _ = sender.send(Message::SetUSize { opt, value }).await;
            }
            Self::Mock(mock) => mock.set_usize(opt, value).await,
        }
    }
}
