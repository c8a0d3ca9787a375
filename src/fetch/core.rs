use tokio::task::JoinHandle;

use super::{
    Fetch,
    data::{FetchError, FetchOutcome, RetryPolicy, parse_items},
    message::Message,
};
use crate::{ArcStr, log::Log, net::Net};

const SCOPE: &str = "fetch";
const TOO_MANY_REQUESTS: u16 = 429;

/// The core of the fetch actor.
///
/// Holds no per-request state, so each execution runs on a task of its own
/// with a clone of the core.
#[derive(Debug, Clone)]
pub struct Core {
    net: Net,
    log: Log,
    policy: RetryPolicy,
}

impl Core {
    pub fn new(net: Net, log: Log, policy: RetryPolicy) -> Self {
        Self { net, log, policy }
    }

    /// Transforms the core into an actor.
    pub fn spawn(self) -> (Fetch, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Execute { url, tx } => {
                        let core = self.clone();
                        tokio::spawn(async move {
                            let _ = tx.send(core.execute(url).await);
                        });
                    }
                }
            }
        });

        (Fetch::Actual(tx), handle)
    }

    /// Runs the request until it succeeds, fails for good or runs out of retries.
    pub async fn execute(&self, url: ArcStr) -> FetchOutcome {
        let mut retries_left = self.policy.max_retries;
        let mut backoff = self.policy.first_backoff();

        loop {
            let reason = match self.net.get(url.clone()).await {
                Err(err) => FetchError::Transport(format!("{err:#}")),
                Ok(response) if response.status == TOO_MANY_REQUESTS => FetchError::RateLimited,
                Ok(response) if !response.is_success() => FetchError::HttpStatus(response.status),
                Ok(response) => match parse_items(&response.body) {
                    Ok(items) => {
                        self.log
                            .info(SCOPE, format!("Fetched {} items from {url}", items.len()));
                        return Ok(items);
                    }
                    Err(err) => err,
                },
            };

            if !reason.is_retryable() {
                return self.fail(&url, reason);
            }
            if retries_left == 0 {
                return self.fail(&url, FetchError::RetriesExhausted(Box::new(reason)));
            }

            self.log.warn(
                SCOPE,
                format!(
                    "{reason} for {url}, retrying in {} ms ({retries_left} retries left)",
                    backoff.as_millis()
                ),
            );
            tokio::time::sleep(backoff).await;
            backoff = self.policy.next_backoff(backoff);
            retries_left -= 1;
        }
    }

    fn fail(&self, url: &str, err: FetchError) -> FetchOutcome {
        self.log.error(SCOPE, format!("Fetching {url} failed: {err}"));
        Err(err)
    }
}
