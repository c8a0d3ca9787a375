use std::{io, path::Path};

use tokio::{
    fs::{File, OpenOptions},
    sync::mpsc,
};

use super::message::{Message, OpenMode};
use crate::ArcPath;

/// The core of the filesystem actor.
///
/// Holds no state: every operation is a thin wrapper over `tokio::fs`, the
/// actor exists so the rest of the crate can swap it for a mock.
#[derive(Debug, Default)]
pub struct Core;

impl Core {
    pub fn new() -> Self {
        Self
    }

    /// Spawns the actor and returns its handle and task.
    pub fn spawn(self) -> (super::Fs, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::Open { path, mode, tx } => {
                        let _ = tx.send(open(&path, mode).await);
                    }
                    Message::MkDir { path, tx } => {
                        let _ = tx.send(tokio::fs::create_dir_all(&path).await);
                    }
                    Message::ReadDir { path, tx } => {
                        let _ = tx.send(read_dir(&path).await);
                    }
                    Message::RemoveFile { path, tx } => {
                        let _ = tx.send(tokio::fs::remove_file(&path).await);
                    }
                    Message::Metadata { path, tx } => {
                        let _ = tx.send(tokio::fs::metadata(&path).await);
                    }
                    Message::Exists { path, tx } => {
                        let _ = tx.send(tokio::fs::try_exists(&path).await.unwrap_or(false));
                    }
                }
            }
        });
        (super::Fs::Actual(tx), handle)
    }
}

/// Opens `path` according to `mode`.
pub(super) async fn open(path: &Path, mode: OpenMode) -> io::Result<File> {
    let mut options = OpenOptions::new();
    match mode {
        OpenMode::Read => options.read(true),
        OpenMode::Write => options.write(true).create(true).truncate(true),
        OpenMode::Append => options.append(true).create(true),
    };
    options.open(path).await
}

async fn read_dir(path: &Path) -> io::Result<Vec<ArcPath>> {
    let mut entries = Vec::new();
    let mut rd = tokio::fs::read_dir(path).await?;
    while let Some(entry) = rd.next_entry().await? {
        entries.push(ArcPath::from(entry.path()));
    }
    Ok(entries)
}
