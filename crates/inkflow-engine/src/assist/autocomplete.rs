use std::ops::Range;

use serde::Serialize;
use tracing::debug;

use crate::assist::layout::{Layout, Point};
use crate::assist::query::{has_name_prefix, trailing_query};
use crate::assist::roster::RosterEntry;
use crate::editing::{Document, Patch, Selection, Transaction};

/// Tunables for suggestion detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteConfig {
    /// Minimum query length (in chars) before an overlay may open.
    pub min_query_len: usize,
    /// Maximum number of candidates exposed to the shell.
    pub max_items: usize,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            min_query_len: 1,
            max_items: 6,
        }
    }
}

/// Ephemeral suggestion state, recomputed on every document/selection
/// change and never persisted. The shell renders it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionOverlay {
    /// The in-progress name fragment before the caret.
    pub query: String,
    /// Matching roster entries, in roster order, truncated to `max_items`.
    pub items: Vec<RosterEntry>,
    /// Document range holding exactly `query` at detection time.
    pub range: Range<usize>,
    /// Screen anchor for the overlay (bottom-left of the caret).
    pub anchor: Point,
    /// Index of the highlighted candidate; always within `items`.
    pub selected: usize,
}

/// Logical overlay actions, decoupled from device key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAction {
    Cancel,
    MoveSelectionUp,
    MoveSelectionDown,
    Commit,
}

impl OverlayAction {
    /// Map a device key name to a logical action.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Escape" => Some(Self::Cancel),
            "ArrowUp" => Some(Self::MoveSelectionUp),
            "ArrowDown" => Some(Self::MoveSelectionDown),
            "Enter" | "Tab" => Some(Self::Commit),
            _ => None,
        }
    }
}

/// Whether the engine consumed a key event. Unconsumed keys fall through to
/// normal editing and detection re-runs on the resulting change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Consumed,
    Ignored,
}

/// Live name-completion engine.
///
/// Holds the roster and the current overlay; everything else is derived
/// from the document on each change. The only document mutation it ever
/// issues is the single-range text replacement on commit.
#[derive(Debug, Default)]
pub struct AutocompleteEngine {
    config: AutocompleteConfig,
    roster: Vec<RosterEntry>,
    overlay: Option<SuggestionOverlay>,
}

impl AutocompleteEngine {
    pub fn new(config: AutocompleteConfig) -> Self {
        Self {
            config,
            roster: Vec::new(),
            overlay: None,
        }
    }

    /// Replace the roster wholesale. Takes effect on the next change.
    pub fn update_roster(&mut self, roster: Vec<RosterEntry>) {
        self.roster = roster;
    }

    /// Current overlay state; a pure read, safe to call on every render.
    pub fn overlay(&self) -> Option<&SuggestionOverlay> {
        self.overlay.as_ref()
    }

    /// Clear the overlay (focus loss, or shell policy).
    pub fn dismiss(&mut self) {
        if self.overlay.take().is_some() {
            debug!("suggestion overlay dismissed");
        }
    }

    /// Re-derive the overlay after a document or selection change.
    /// `focused` is whether input focus is inside the editing surface.
    pub fn on_change(&mut self, doc: &Document, layout: &dyn Layout, focused: bool) {
        let next = derive_overlay(
            self.overlay.as_ref(),
            doc,
            layout,
            &self.roster,
            &self.config,
            focused,
        );
        match (&self.overlay, &next) {
            (None, Some(o)) => debug!(query = %o.query, items = o.items.len(), "suggestion overlay opened"),
            (Some(_), None) => debug!("suggestion overlay closed"),
            _ => {}
        }
        self.overlay = next;
    }

    /// Handle a logical action. Only consumes while an overlay exists.
    pub fn apply_action(&mut self, action: OverlayAction, doc: &mut Document) -> KeyOutcome {
        let Some(mut overlay) = self.overlay.take() else {
            return KeyOutcome::Ignored;
        };
        match action {
            OverlayAction::Cancel => {
                debug!(query = %overlay.query, "suggestion overlay cancelled");
            }
            OverlayAction::MoveSelectionUp => {
                let n = overlay.items.len();
                overlay.selected = (overlay.selected + n - 1) % n;
                self.overlay = Some(overlay);
            }
            OverlayAction::MoveSelectionDown => {
                overlay.selected = (overlay.selected + 1) % overlay.items.len();
                self.overlay = Some(overlay);
            }
            OverlayAction::Commit => {
                // Overlay closes whether or not the commit goes through.
                commit(overlay, doc);
            }
        }
        KeyOutcome::Consumed
    }
}

/// Replace the matched range with the selected candidate's canonical name
/// and park the caret after it. Aborts without mutating when the document
/// has drifted since detection.
fn commit(overlay: SuggestionOverlay, doc: &mut Document) -> Option<Patch> {
    if doc.text_between(overlay.range.start, overlay.range.end) != overlay.query {
        debug!(query = %overlay.query, "commit aborted: range went stale");
        return None;
    }
    let name = overlay.items.get(overlay.selected)?.name.clone();
    let caret = overlay.range.start + name.chars().count();
    let tx = Transaction::new()
        .replace_text(overlay.range.clone(), name.clone())
        .with_selection(Selection::caret(caret));
    match doc.apply(tx) {
        Ok(patch) => {
            debug!(query = %overlay.query, name = %name, "suggestion committed");
            Some(patch)
        }
        Err(err) => {
            debug!(%err, "commit aborted");
            None
        }
    }
}

/// Pure recomputation of the overlay from the current document state.
/// Every disqualifying condition degrades silently to `None`.
fn derive_overlay(
    prev: Option<&SuggestionOverlay>,
    doc: &Document,
    layout: &dyn Layout,
    roster: &[RosterEntry],
    config: &AutocompleteConfig,
    focused: bool,
) -> Option<SuggestionOverlay> {
    if !focused {
        return None;
    }
    let selection = doc.selection();
    if !selection.is_collapsed() {
        return None;
    }
    let head = selection.head;
    let at = doc.resolve(head)?;
    let block = doc.block(at.block_index)?;
    if !block.kind.accepts_suggestions() {
        return None;
    }

    let query = trailing_query(&block.text, at.offset);
    let query_len = query.chars().count();
    if query.is_empty() || query_len < config.min_query_len {
        return None;
    }
    if roster.is_empty() {
        return None;
    }

    // Roster order is preserved; a name the user has already fully typed
    // is not offered.
    let items: Vec<RosterEntry> = roster
        .iter()
        .filter(|entry| has_name_prefix(&entry.name, &query) && entry.name != query)
        .take(config.max_items)
        .cloned()
        .collect();
    if items.is_empty() {
        return None;
    }

    // Re-read the document at the computed range; detection state and the
    // document can drift apart between events.
    let range = head - query_len..head;
    if doc.text_between(range.start, range.end) != query {
        return None;
    }

    let anchor = layout.caret_anchor(head).ok()?;

    // Keep the highlighted candidate stable while the set is unchanged.
    let selected = match prev {
        Some(p) if same_candidates(&p.items, &items) => p.selected.min(items.len() - 1),
        _ => 0,
    };

    let next = SuggestionOverlay {
        query,
        items,
        range,
        anchor,
        selected,
    };
    // Reuse the previous value when nothing observable changed, so the
    // shell sees an identical state and skips a redraw.
    match prev {
        Some(p) if *p == next => Some(p.clone()),
        _ => Some(next),
    }
}

/// Same candidate ids in the same order.
fn same_candidates(a: &[RosterEntry], b: &[RosterEntry]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.id == y.id)
}
