use std::time::Duration;

use tokio::{
    sync::{
        broadcast,
        mpsc::{self, WeakSender},
        watch,
    },
    task::JoinHandle,
};

use super::{
    Orchestrator,
    data::{NETWORK_ISSUE, Notification, OrchestratorState, Phase},
    message::Message,
};
use crate::{
    ArcStr,
    catalog::{self, RequestDescriptor, View},
    fetch::{Fetch, FetchError, FetchOutcome},
    log::Log,
};

const SCOPE: &str = "orchestrator";
const NOTIFICATION_CAPACITY: usize = 16;

/// The core of the orchestrator actor.
///
/// Owns the query state; every mutation happens in the actor loop. Fetches
/// run on their own tasks and come back as [`Message::Settle`], tagged with
/// the descriptor they were launched for.
#[derive(Debug)]
pub struct Core {
    fetch: Fetch,
    log: Log,
    /// Base URL of the catalog service
    base_url: ArcStr,
    /// How long a notification stays visible
    notification_duration: Duration,
    state: OrchestratorState,
    /// The intent whose outcome may still be applied
    active: Option<RequestDescriptor>,
    next_notification_id: u64,
    states: watch::Sender<OrchestratorState>,
    notifications: broadcast::Sender<Notification>,
}

impl Core {
    pub fn new(fetch: Fetch, log: Log, base_url: ArcStr, notification_duration: Duration) -> Self {
        let state = OrchestratorState::default();
        let (states, _) = watch::channel(state.clone());
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            fetch,
            log,
            base_url,
            notification_duration,
            state,
            active: None,
            next_notification_id: 0,
            states,
            notifications,
        }
    }

    /// Transforms the core into an actor.
    ///
    /// The actor only keeps a weak sender to itself, so it stops once every
    /// [`Orchestrator`] handle is dropped.
    pub fn spawn(mut self) -> (Orchestrator, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(crate::BUFFER_SIZE);
        let weak = tx.downgrade();

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                self.handle(message, &weak);
            }
        });

        (Orchestrator::Actual(tx), handle)
    }

    fn handle(&mut self, message: Message, weak: &WeakSender<Message>) {
        match message {
            Message::SetView { view } => {
                self.state.view = view;
                self.launch(weak);
            }
            Message::SetSearchText { text } => {
                self.state.search_text = text;
                self.publish();
            }
            Message::SubmitSearch => self.launch(weak),
            Message::Reset => {
                self.state.view = View::Anime;
                self.state.search_text = ArcStr::default();
                self.launch(weak);
            }
            Message::State { tx } => {
                let _ = tx.send(self.state.clone());
            }
            Message::Watch { tx } => {
                let _ = tx.send(self.states.subscribe());
            }
            Message::Subscribe { tx } => {
                let _ = tx.send(self.notifications.subscribe());
            }
            Message::Settle {
                descriptor,
                outcome,
            } => self.settle(descriptor, outcome, weak),
            Message::Dismiss { id } => {
                let visible = self.state.notification.as_ref().map(|n| n.id);
                if visible == Some(id) {
                    self.state.notification = None;
                    self.publish();
                }
            }
        }
    }

    /// Captures the current intent and fetches it in the background.
    fn launch(&mut self, weak: &WeakSender<Message>) {
        let descriptor = RequestDescriptor::new(self.state.view, self.state.search_text.clone());
        self.active = Some(descriptor.clone());
        self.state.is_loading = true;
        self.state.phase = Phase::Loading;
        self.publish();

        self.log.info(
            SCOPE,
            format!(
                "Querying {} with search {:?}",
                descriptor.view, &*descriptor.search_text
            ),
        );

        let fetch = self.fetch.clone();
        let base_url = self.base_url.clone();
        let weak = weak.clone();
        tokio::spawn(async move {
            let outcome = match catalog::build_url(&base_url, &descriptor) {
                Ok(url) => fetch.execute(url).await,
                Err(err) => Err(FetchError::InvalidUrl(format!("{err:#}"))),
            };
            if let Some(sender) = weak.upgrade() {
                let message = Message::Settle {
                    descriptor,
                    outcome,
                };
                let _ = sender.send(message).await;
            }
        });
    }

    /// Applies an outcome if it still answers the active intent.
    fn settle(
        &mut self,
        descriptor: RequestDescriptor,
        outcome: FetchOutcome,
        weak: &WeakSender<Message>,
    ) {
        if self.active.as_ref() != Some(&descriptor) {
            self.log.info(
                SCOPE,
                format!(
                    "Discarding superseded outcome for {} {:?}",
                    descriptor.view, &*descriptor.search_text
                ),
            );
            return;
        }

        self.state.is_loading = false;
        match outcome {
            Ok(items) => {
                self.state.items = items;
                self.state.phase = Phase::Succeeded;
                self.publish();
            }
            Err(err) => {
                self.log.error(
                    SCOPE,
                    format!(
                        "Query for {} {:?} failed: {err}",
                        descriptor.view, &*descriptor.search_text
                    ),
                );
                self.state.phase = Phase::Failed;
                self.notify(NETWORK_ISSUE, weak);
            }
        }
    }

    /// Shows a notification and schedules its dismissal.
    fn notify(&mut self, message: &str, weak: &WeakSender<Message>) {
        self.next_notification_id += 1;
        let notification = Notification {
            id: self.next_notification_id,
            message: ArcStr::from(message),
        };
        self.state.notification = Some(notification.clone());
        self.publish();
        let _ = self.notifications.send(notification);

        let id = self.next_notification_id;
        let duration = self.notification_duration;
        let weak = weak.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(sender) = weak.upgrade() {
                let _ = sender.send(Message::Dismiss { id }).await;
            }
        });
    }

    fn publish(&self) {
        self.states.send_replace(self.state.clone());
    }
}
