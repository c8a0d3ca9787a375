use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::data::{MockReply, NetResponse};
use crate::ArcStr;

#[derive(Debug, Default)]
struct Script {
    replies: HashMap<ArcStr, VecDeque<MockReply>>,
    requests: Vec<ArcStr>,
}

/// Mock implementation of the networking actor.
///
/// Each URL owns a queue of replies consumed in order; the last reply of a
/// queue is served again for every later request. Unknown URLs fail as
/// transport errors. Every requested URL is recorded.
#[derive(Debug, Clone, Default)]
pub struct Mock {
    script: Arc<Mutex<Script>>,
}

impl Mock {
    pub fn new(replies: HashMap<ArcStr, Vec<MockReply>>) -> Self {
        let replies = replies
            .into_iter()
            .map(|(url, queue)| (url, VecDeque::from(queue)))
            .collect();
        Self {
            script: Arc::new(Mutex::new(Script {
                replies,
                requests: Vec::new(),
            })),
        }
    }

    pub async fn script(&self, url: ArcStr, replies: Vec<MockReply>) {
        let mut script = self.script.lock().await;
        script.replies.entry(url).or_default().extend(replies);
    }

    pub async fn requests(&self) -> Vec<ArcStr> {
        self.script.lock().await.requests.clone()
    }

    pub async fn get(&self, url: ArcStr) -> anyhow::Result<NetResponse> {
        let reply = {
            let mut script = self.script.lock().await;
            script.requests.push(url.clone());
            let queue = script.replies.get_mut(&url);
            match queue {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        let Some(reply) = reply else {
            anyhow::bail!("GET request not found in mock responses: {url}");
        };
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result.map_err(|message| anyhow::anyhow!(message))
    }
}
