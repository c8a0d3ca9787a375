use anyhow::Result;

mod core;
mod data;

pub use data::{Command, render};

use crate::{ArcPath, log::Log, orchestrator::Orchestrator};

/// Top-level coordinator that wires every actor together.
///
/// Built once per process; [`App::resolve`] runs a single command and
/// flushes the log afterwards.
#[derive(Debug)]
pub struct App {
    core: core::Core,
}

impl App {
    /// Initializes the filesystem, configuration, logging, networking, fetch
    /// and orchestrator actors.
    ///
    /// The configuration is read from `config_path`; when it is missing or
    /// unreadable the defaults are written there instead.
    pub async fn build(config_path: ArcPath) -> Result<Self> {
        let core = core::Core::build(config_path).await?;
        Ok(Self { core })
    }

    /// Builds an app over already spawned actors.
    pub fn with_actors(log: Log, orchestrator: Orchestrator) -> Self {
        Self {
            core: core::Core::new(log, orchestrator),
        }
    }

    /// Executes a command, prints its result and flushes the log.
    pub async fn resolve(&self, command: Command) -> Result<()> {
        let result = match command {
            Command::Browse { view, search } => self.core.handle_browse(view, search).await,
        };
        self.core.handle_shutdown().await;
        result
    }
}
