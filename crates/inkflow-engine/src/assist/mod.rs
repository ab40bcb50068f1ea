/*!
 * # Smart-Assist Module
 *
 * The two engines that run beside the editing surface:
 *
 * - **`autocomplete`**: watches every document/selection change for a
 *   partially-typed character name, matches it against the caller-supplied
 *   roster, and exposes an ephemeral [`SuggestionOverlay`] the shell renders.
 *   Accepting a candidate rewrites the matched range in one transaction.
 * - **`reorder`**: tracks the pointer over top-level blocks, exposes a
 *   floating drag [`HandleState`], and turns a drop into a single atomic
 *   delete+insert move transaction.
 *
 * Both engines are synchronous and event-driven: the shell forwards input
 * into them and redraws from the state they expose. Neither holds any
 * authority over content - the document is the single source of truth, and
 * every disqualifying condition simply resets the engine to its idle state.
 *
 * Rendering-technology concerns (hit-testing, element geometry, caret
 * coordinates) sit behind the narrow [`Layout`] capability trait, so the
 * engines run unchanged against a fake layout in tests.
 */

pub mod autocomplete;
pub mod layout;
pub mod query;
pub mod reorder;
pub mod roster;

pub use autocomplete::{
    AutocompleteConfig, AutocompleteEngine, KeyOutcome, OverlayAction, SuggestionOverlay,
};
pub use layout::{ElementId, Layout, LayoutError, Point, Rect};
pub use reorder::{
    DragCleanup, DropOutcome, HANDLE_HIDE_DELAY, HandleState, ReorderEngine, ReorderPhase,
    move_block,
};
pub use roster::{RosterEntry, RosterId};

#[cfg(test)]
pub(crate) mod testutil;
