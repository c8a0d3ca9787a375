use std::time::Duration;

use crate::ArcStr;

/// What came back from a completed HTTP exchange.
///
/// Any status is a valid response here; it is up to the caller to decide
/// which statuses count as failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetResponse {
    pub status: u16,
    pub body: ArcStr,
}

impl NetResponse {
    pub fn new(status: u16, body: impl Into<ArcStr>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the `2xx` range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A scripted reply served by the mock networking actor.
#[derive(Debug, Clone)]
pub struct MockReply {
    /// How long the mock waits before answering
    pub delay: Duration,
    /// The response, or the message of a transport error
    pub result: Result<NetResponse, ArcStr>,
}

impl MockReply {
    /// Replies immediately with `status` and `body`.
    pub fn status(status: u16, body: impl Into<ArcStr>) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(NetResponse::new(status, body)),
        }
    }

    /// Replies immediately with `200 OK` and `body`.
    pub fn ok(body: impl Into<ArcStr>) -> Self {
        Self::status(200, body)
    }

    /// Fails immediately as if the connection could not be made.
    pub fn transport_error(message: impl Into<ArcStr>) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(message.into()),
        }
    }

    /// Delays the reply by `delay`.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}
