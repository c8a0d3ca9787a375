use crate::{
    ArcStr,
    catalog::View,
    orchestrator::{OrchestratorState, Phase},
};

/// Commands that can be executed by the App
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the listing of a view, or search it when `search` is not empty
    Browse { view: View, search: ArcStr },
}

/// Renders a settled state as lines of text.
///
/// A failed query shows its notification; otherwise one line per item with
/// rank, title, score and media type.
pub fn render(state: &OrchestratorState) -> Vec<String> {
    if state.phase == Phase::Failed {
        return state
            .notification
            .iter()
            .map(|notification| notification.message.to_string())
            .collect();
    }

    let subject = if state.search_text.is_empty() {
        format!("Top {}", state.view)
    } else {
        format!("{} results for \"{}\"", state.view, state.search_text)
    };
    if state.items.is_empty() {
        return vec![format!("{subject}: nothing found")];
    }

    let mut lines = vec![format!("{subject} ({} items):", state.items.len())];
    for (rank, item) in state.items.iter().enumerate() {
        let score = item
            .score()
            .map_or_else(|| "N/A".to_string(), |score| format!("{score:.2}"));
        lines.push(format!(
            "{:>3}. {} [{}] {}",
            rank + 1,
            item.display_title().unwrap_or("Untitled"),
            item.kind().unwrap_or("?"),
            score
        ));
    }
    lines
}
