use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::{data::Data, message::Message};
use crate::{ArcPath, fs::Fs};

/// The core of the configuration actor.
///
/// Keeps the configuration in memory and reads or writes it as TOML through
/// the filesystem actor on request.
pub struct Core {
    /// The filesystem actor for file operations
    fs: Fs,
    /// The path to the configuration file
    path: ArcPath,
    /// The current configuration data
    data: Data,
}

impl Core {
    pub fn new(fs: Fs, path: ArcPath) -> Self {
        Self {
            fs,
            path,
            data: Data::default(),
        }
    }

    /// Spawns the configuration actor and returns a handle to it.
    pub fn spawn(mut self) -> (super::Config, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(32);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::Load { tx } => {
                        let _ = tx.send(self.load().await);
                    }
                    Message::Save { tx } => {
                        let _ = tx.send(self.save().await);
                    }
                    Message::GetPath { opt, tx } => {
                        let _ = tx.send(self.data.path(opt));
                    }
                    Message::SetPath { opt, path } => self.data.set_path(opt, path),
                    Message::GetStr { opt, tx } => {
                        let _ = tx.send(self.data.str(opt));
                    }
                    Message::SetStr { opt, value } => self.data.set_str(opt, value),
                    Message::GetLogLevel { tx } => {
                        let _ = tx.send(self.data.log_level());
                    }
                    Message::SetLogLevel { level } => self.data.set_log_level(level),
                    Message::GetUSize { opt, tx } => {
                        let _ = tx.send(self.data.usize(opt));
                    }
                    Message::SetUSize { opt, value } => self.data.set_usize(opt, value),
                }
            }
        });
        (super::Config::Actual(tx), handle)
    }

    /// Replaces the in-memory data with the content of the file.
    ///
    /// On failure the current data is left untouched.
    async fn load(&mut self) -> anyhow::Result<()> {
        let mut file = self
            .fs
            .read_file(self.path.clone())
            .await
            .with_context(|| format!("Opening config file {}", self.path.display()))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .await
            .context("Reading config file")?;
        self.data = toml::from_str(&contents).context("Parsing config file")?;
        Ok(())
    }

    /// Writes the in-memory data to the file, creating its directory.
    async fn save(&self) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(&self.data)
            .context("Serializing config")?;
        if let Some(parent) = self.path.parent() {
            self.fs
                .mkdir(ArcPath::from(parent))
                .await
                .context("Creating config directory")?;
        }
        let mut file = self
            .fs
            .write_file(self.path.clone())
            .await
            .with_context(|| format!("Opening config file {}", self.path.display()))?;
        file.write_all(contents.as_bytes())
            .await
            .context("Writing config file")?;
        file.flush().await.context("Flushing config file")?;
        Ok(())
    }
}
