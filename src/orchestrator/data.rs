use crate::{
    ArcStr,
    catalog::View,
    fetch::Item,
};

/// Text of the notification raised when a query fails.
pub const NETWORK_ISSUE: &str = "Network issue. Please try again in a moment.";

/// Where the active query stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing was queried yet
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// A transient message for the user.
///
/// Ids grow monotonically, so a dismissal aimed at an older notification
/// never removes a newer one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: ArcStr,
}

/// Everything a presentation layer needs to draw the current query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrchestratorState {
    pub view: View,
    pub search_text: ArcStr,
    /// Records of the most recent relevant fetch that succeeded
    pub items: Vec<Item>,
    pub is_loading: bool,
    pub phase: Phase,
    /// The notification currently visible, if any
    pub notification: Option<Notification>,
}
