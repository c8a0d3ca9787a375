use anyhow::Context;
use tokio::{fs::File, io::AsyncWriteExt, task::JoinHandle};

use super::data::{LogLevel, LogMessage};
use super::message::Message;
use crate::{ArcPath, fs::Fs};

const SCOPE: &str = "log";
const FILE_PREFIX: &str = "radar_";
const FILE_SUFFIX: &str = ".log";

/// The core of the logging actor.
///
/// Every message is appended to a timestamped file and to `latest.log`.
/// Messages at or above `print_level` are also buffered and printed to stderr
/// when the logger is flushed, which happens right before the program exits.
#[derive(Debug)]
pub struct LogCore {
    /// Filesystem interface for file operations
    fs: Fs,
    /// Directory where log files are stored
    log_dir: ArcPath,
    /// Path to the log file of this run
    log_path: ArcPath,
    /// Handle to the log file of this run
    log_file: File,
    /// Handle to `latest.log`
    latest_log_file: File,
    /// Messages to be printed to stderr on flush
    logs_to_print: Vec<LogMessage>,
    /// Minimum level of messages to be printed to stderr
    print_level: LogLevel,
    /// Maximum age of log files in days, 0 keeps them forever
    max_age: usize,
}

impl LogCore {
    /// Creates the log directory and opens this run's log files.
    ///
    /// # Errors
    /// If the directory or either log file cannot be created.
    pub async fn build(
        fs: Fs,
        level: LogLevel,
        max_age: usize,
        log_dir: ArcPath,
    ) -> anyhow::Result<Self> {
        let log_path = ArcPath::from(log_dir.join(format!(
            "{FILE_PREFIX}{}{FILE_SUFFIX}",
            chrono::Utc::now().format("%Y-%m-%d-%H-%M-%S")
        )));
        let latest_log_path = ArcPath::from(log_dir.join("latest.log"));

        fs.mkdir(log_dir.clone())
            .await
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        let log_file = fs
            .append_file(log_path.clone())
            .await
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        let latest_log_file = fs
            .write_file(latest_log_path.clone())
            .await
            .with_context(|| {
                format!(
                    "Failed to create latest log file: {}",
                    latest_log_path.display()
                )
            })?;

        Ok(Self {
            fs,
            log_dir,
            log_path,
            log_file,
            latest_log_file,
            logs_to_print: Vec::new(),
            print_level: level,
            max_age,
        })
    }

    /// Transforms the core into an actor.
    pub fn spawn(mut self) -> (super::Log, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Message::Log(msg) => {
                        self.log(msg).await;
                    }
                    Message::CollectGarbage { tx } => {
                        self.collect_garbage().await;
                        let _ = tx.send(());
                    }
                    Message::Flush { tx } => {
                        rx.close();
                        self.flush();
                        let _ = tx.send(());
                        break;
                    }
                }
            }
        });
        (super::Log::Actual(tx), handle)
    }

    async fn log(&mut self, message: LogMessage) {
        let line = format!("{message}\n");
        if let Err(e) = self.write_line(&line).await {
            self.logs_to_print.push(LogMessage::new(
                LogLevel::Error,
                SCOPE,
                format!("Failed to write to {}: {e}", self.log_path.display()),
            ));
        }

        if message.level >= self.print_level {
            self.logs_to_print.push(message);
        }
    }

    async fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.log_file.write_all(line.as_bytes()).await?;
        self.log_file.flush().await?;
        self.latest_log_file.write_all(line.as_bytes()).await?;
        self.latest_log_file.flush().await
    }

    fn flush(&self) {
        for message in &self.logs_to_print {
            eprintln!("{message}");
        }
        if !self.logs_to_print.is_empty() {
            eprintln!("Check the full log file: {}", self.log_path.display());
        }
    }

    async fn collect_garbage(&mut self) {
        if self.max_age == 0 {
            return;
        }
        let now = std::time::SystemTime::now();
        let Ok(logs) = self.fs.read_dir(self.log_dir.clone()).await else {
            self.log(LogMessage::new(
                LogLevel::Error,
                SCOPE,
                "Failed to read the logs directory during garbage collection",
            ))
            .await;
            return;
        };
        for log in logs {
            let Some(filename) = log.file_name() else {
                continue;
            };
            let filename = filename.to_string_lossy();
            if !filename.starts_with(FILE_PREFIX) || !filename.ends_with(FILE_SUFFIX) {
                continue;
            }
            let Ok(modified) = self
                .fs
                .metadata(log.clone())
                .await
                .and_then(|meta| meta.modified())
            else {
                continue;
            };
            let Ok(age) = now.duration_since(modified) else {
                continue;
            };
            let days = (age.as_secs() / 60 / 60 / 24) as usize;
            if days > self.max_age && self.fs.remove_file(log.clone()).await.is_err() {
                self.log(LogMessage::new(
                    LogLevel::Warning,
                    SCOPE,
                    format!("Failed to remove the log file: {}", log.display()),
                ))
                .await;
            }
        }
    }
}
