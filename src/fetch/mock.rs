use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::data::{FetchError, FetchOutcome, MockOutcome};
use crate::ArcStr;

#[derive(Debug, Default)]
struct Script {
    outcomes: HashMap<ArcStr, VecDeque<MockOutcome>>,
    requests: Vec<ArcStr>,
}

/// Mock implementation of the fetch actor.
///
/// Serves per-URL outcome queues like the networking mock: the last outcome
/// repeats and unknown URLs fail with a transport error.
#[derive(Debug, Clone, Default)]
pub struct Mock {
    script: Arc<Mutex<Script>>,
}

impl Mock {
    pub fn new(outcomes: HashMap<ArcStr, Vec<MockOutcome>>) -> Self {
        let outcomes = outcomes
            .into_iter()
            .map(|(url, queue)| (url, VecDeque::from(queue)))
            .collect();
        Self {
            script: Arc::new(Mutex::new(Script {
                outcomes,
                requests: Vec::new(),
            })),
        }
    }

    pub async fn script(&self, url: ArcStr, outcomes: Vec<MockOutcome>) {
        let mut script = self.script.lock().await;
        script.outcomes.entry(url).or_default().extend(outcomes);
    }

    pub async fn requests(&self) -> Vec<ArcStr> {
        self.script.lock().await.requests.clone()
    }

    pub async fn execute(&self, url: ArcStr) -> FetchOutcome {
        let scripted = {
            let mut script = self.script.lock().await;
            script.requests.push(url.clone());
            match script.outcomes.get_mut(&url) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        let Some(scripted) = scripted else {
            return Err(FetchError::Transport(format!(
                "no scripted outcome for {url}"
            )));
        };
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        scripted.outcome
    }
}
