use std::{
    fs::Metadata,
    io,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use tempfile::TempDir;
use tokio::fs::File;

use super::{core::open, message::OpenMode};
use crate::ArcPath;

/// Mock implementation of the filesystem actor.
///
/// Every path, absolute or relative, is re-rooted inside a temporary
/// directory that lives as long as the last clone of the mock.
#[derive(Debug, Clone)]
pub struct Mock {
    root: Arc<TempDir>,
}

impl Mock {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir for Fs mock");
        Self {
            root: Arc::new(root),
        }
    }

    /// Maps a logical path to its location inside the temporary directory.
    fn real_path(&self, path: &Path) -> PathBuf {
        let relative: PathBuf = path
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        self.root.path().join(relative)
    }

    pub async fn open(&self, path: ArcPath, mode: OpenMode) -> io::Result<File> {
        open(&self.real_path(&path), mode).await
    }

    pub async fn mkdir(&self, path: ArcPath) -> io::Result<()> {
        tokio::fs::create_dir_all(self.real_path(&path)).await
    }

    /// Lists a directory, returning logical paths rather than temp paths.
    pub async fn read_dir(&self, path: ArcPath) -> io::Result<Vec<ArcPath>> {
        let mut entries = Vec::new();
        let mut rd = tokio::fs::read_dir(self.real_path(&path)).await?;
        while let Some(entry) = rd.next_entry().await? {
            entries.push(ArcPath::from(path.join(entry.file_name())));
        }
        Ok(entries)
    }

    pub async fn remove_file(&self, path: ArcPath) -> io::Result<()> {
        tokio::fs::remove_file(self.real_path(&path)).await
    }

    pub async fn metadata(&self, path: ArcPath) -> io::Result<Metadata> {
        tokio::fs::metadata(self.real_path(&path)).await
    }

    pub async fn exists(&self, path: ArcPath) -> bool {
        tokio::fs::try_exists(self.real_path(&path))
            .await
            .unwrap_or(false)
    }
}
