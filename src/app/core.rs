use anyhow::{Context, Result};

use crate::{
    ArcPath, ArcStr,
    catalog::View,
    config::{Config, PathOpt, USizeOpt},
    fetch::{Fetch, RetryPolicy},
    fs::Fs,
    log::Log,
    net::Net,
    orchestrator::{Orchestrator, OrchestratorState},
};

use super::data::render;

const SCOPE: &str = "app";

/// Core implementation of the App
#[derive(Debug)]
pub struct Core {
    /// Logging actor
    log: Log,
    /// Query orchestrator actor
    orchestrator: Orchestrator,
}

impl Core {
    /// Build a new App core with full initialization
    pub async fn build(config_path: ArcPath) -> Result<Self> {
        let fs = Fs::spawn();

        let config = Config::spawn(fs.clone(), config_path);
        if config.load().await.is_err() {
            config.save().await?;
        }

        let log = Log::spawn(
            fs,
            config.log_level().await,
            config.usize(USizeOpt::MaxAge).await,
            config.path(PathOpt::LogDir).await,
        )
        .await?;
        log.collect_garbage().await;

        let net = Net::spawn(config.clone(), log.clone()).await?;
        let policy = RetryPolicy::from_config(&config).await;
        let fetch = Fetch::spawn(net, log.clone(), policy);
        let orchestrator = Orchestrator::from_config(fetch, log.clone(), &config).await;

        log.info(SCOPE, "App initialized successfully");

        Ok(Self::new(log, orchestrator))
    }

    pub fn new(log: Log, orchestrator: Orchestrator) -> Self {
        Self { log, orchestrator }
    }

    /// Queries `view` with `search` and prints the settled state.
    pub async fn handle_browse(&self, view: View, search: ArcStr) -> Result<()> {
        let state = self.browse(view, search).await?;
        for line in render(&state) {
            println!("{line}");
        }
        Ok(())
    }

    /// Queries `view` with `search` and waits until the query settles.
    pub async fn browse(&self, view: View, search: ArcStr) -> Result<OrchestratorState> {
        self.log
            .info(SCOPE, format!("Browsing {view} with search {:?}", &*search));
        self.orchestrator.set_search_text(search).await?;
        self.orchestrator.set_view(view).await?;

        let mut states = self.orchestrator.watch().await?;
        let state = states
            .wait_for(|state| !state.is_loading)
            .await
            .context("Orchestrator stopped before the query settled")?
            .clone();
        Ok(state)
    }

    /// Flushes buffered log messages to stderr.
    pub async fn handle_shutdown(&self) {
        self.log.clone().flush().await;
    }
}
