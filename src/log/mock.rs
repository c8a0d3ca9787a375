use std::sync::{Arc, Mutex};

use super::data::LogMessage;

/// In-memory log used by tests to assert on what other actors reported.
#[derive(Debug, Clone, Default)]
pub struct Mock {
    messages: Arc<Mutex<Vec<LogMessage>>>,
}

impl Mock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: LogMessage) {
        if let Ok(mut lock) = self.messages.lock() {
            lock.push(message);
        }
    }

    pub fn messages(&self) -> Vec<LogMessage> {
        self.messages
            .lock()
            .map(|lock| lock.clone())
            .unwrap_or_default()
    }
}
