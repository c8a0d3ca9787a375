use std::sync::Arc;
use tokio::sync::{Mutex, broadcast, watch};

use super::data::{Notification, OrchestratorState};
use crate::{ArcStr, catalog::View};

/// Mock implementation of the orchestrator actor.
///
/// Mutators edit the state in place and record which queries would have been
/// launched; nothing is fetched.
#[derive(Debug, Clone)]
pub struct Mock {
    state: Arc<Mutex<OrchestratorState>>,
    launched: Arc<Mutex<usize>>,
    states: Arc<watch::Sender<OrchestratorState>>,
    notifications: broadcast::Sender<Notification>,
}

impl Mock {
    pub fn new(state: OrchestratorState) -> Self {
        let (states, _) = watch::channel(state.clone());
        let (notifications, _) = broadcast::channel(16);
        Self {
            state: Arc::new(Mutex::new(state)),
            launched: Arc::new(Mutex::new(0)),
            states: Arc::new(states),
            notifications,
        }
    }

    async fn update(&self, launch: bool, edit: impl FnOnce(&mut OrchestratorState)) {
        let mut state = self.state.lock().await;
        edit(&mut state);
        if launch {
            *self.launched.lock().await += 1;
        }
        self.states.send_replace(state.clone());
    }

    pub async fn set_view(&self, view: View) {
        self.update(true, |state| state.view = view).await;
    }

    pub async fn set_search_text(&self, text: ArcStr) {
        self.update(false, |state| state.search_text = text).await;
    }

    pub async fn submit_search(&self) {
        self.update(true, |_| {}).await;
    }

    pub async fn reset(&self) {
        self.update(true, |state| {
            state.view = View::Anime;
            state.search_text = ArcStr::default();
        })
        .await;
    }

    pub async fn state(&self) -> OrchestratorState {
        self.state.lock().await.clone()
    }

    pub fn watch(&self) -> watch::Receiver<OrchestratorState> {
        self.states.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub async fn launched(&self) -> usize {
        *self.launched.lock().await
    }
}
