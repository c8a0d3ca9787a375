use std::{fs::Metadata, io};

use tokio::{fs::File, sync::mpsc::Sender};

use crate::ArcPath;

mod core;
mod message;
mod mock;

pub use message::OpenMode;
use message::Message;

/// The filesystem actor used by the configuration and logging actors.
///
/// This enum represents either a real filesystem actor or a mock rooted in a
/// temporary directory, so tests never touch the user's files.
///
/// # Examples
/// ```ignore
/// let fs = Fs::spawn();
/// let file = fs.append_file(ArcPath::from("/tmp/radar/logs/latest.log")).await?;
/// ```
///
/// # Thread Safety
/// Cloning is cheap as it only copies the channel sender or the mock reference.
#[derive(Debug, Clone)]
pub enum Fs {
    /// A real filesystem actor
    Actual(Sender<Message>),
    /// A mock that maps every path inside a private temporary directory
    Mock(mock::Mock),
}

impl Fs {
    /// Spawns a new filesystem actor.
    pub fn spawn() -> Self {
        let (fs, _) = core::Core::new().spawn();
        fs
    }

    /// Creates a mock filesystem backed by a fresh temporary directory.
    ///
    /// # Panics
    /// If the temporary directory cannot be created.
    pub fn mock() -> Self {
        Self::Mock(mock::Mock::new())
    }

    /// Opens an existing file for reading.
    pub async fn read_file(&self, path: ArcPath) -> io::Result<File> {
        self.open(path, OpenMode::Read).await
    }

    /// Opens a file for writing, creating it if needed and truncating its content.
    pub async fn write_file(&self, path: ArcPath) -> io::Result<File> {
        self.open(path, OpenMode::Write).await
    }

    /// Opens a file for appending, creating it if needed.
    pub async fn append_file(&self, path: ArcPath) -> io::Result<File> {
        self.open(path, OpenMode::Append).await
    }

    async fn open(&self, path: ArcPath, mode: OpenMode) -> io::Result<File> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Open { path, mode, tx })
                    .await
                    .map_err(|_| actor_died())?;
                rx.await.map_err(|_| actor_died())?
            }
            Self::Mock(mock) => mock.open(path, mode).await,
        }
    }

    /// Creates a directory and all of its missing parents.
    pub async fn mkdir(&self, path: ArcPath) -> io::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::MkDir { path, tx })
                    .await
                    .map_err(|_| actor_died())?;
                rx.await.map_err(|_| actor_died())?
            }
            Self::Mock(mock) => mock.mkdir(path).await,
        }
    }

    /// Lists the entries of a directory.
    pub async fn read_dir(&self, path: ArcPath) -> io::Result<Vec<ArcPath>> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::ReadDir { path, tx })
                    .await
                    .map_err(|_| actor_died())?;
                rx.await.map_err(|_| actor_died())?
            }
            Self::Mock(mock) => mock.read_dir(path).await,
        }
    }

    /// Removes a file.
    pub async fn remove_file(&self, path: ArcPath) -> io::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::RemoveFile { path, tx })
                    .await
                    .map_err(|_| actor_died())?;
                rx.await.map_err(|_| actor_died())?
            }
            Self::Mock(mock) => mock.remove_file(path).await,
        }
    }

    /// Reads the metadata of a file or directory.
    pub async fn metadata(&self, path: ArcPath) -> io::Result<Metadata> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Metadata { path, tx })
                    .await
                    .map_err(|_| actor_died())?;
                rx.await.map_err(|_| actor_died())?
            }
            Self::Mock(mock) => mock.metadata(path).await,
        }
    }

    /// Returns whether a file or directory exists at `path`.
    pub async fn exists(&self, path: ArcPath) -> bool {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                if sender.send(Message::Exists { path, tx }).await.is_err() {
                    return false;
                }
                rx.await.unwrap_or(false)
            }
            Self::Mock(mock) => mock.exists(path).await,
        }
    }
}

fn actor_died() -> io::Error {
    io::Error::other("Fs actor died")
}
