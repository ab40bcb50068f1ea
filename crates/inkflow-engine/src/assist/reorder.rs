use std::time::{Duration, Instant};

use tracing::debug;

use crate::assist::layout::{ElementId, Layout, Point};
use crate::editing::{Document, Patch, Transaction};

/// How long the handle lingers after the pointer leaves all blocks.
pub const HANDLE_HIDE_DELAY: Duration = Duration::from_millis(400);

/// Handle placement relative to the tracked block's top-left corner.
const HANDLE_GAP_X: f64 = 24.0;
const HANDLE_OFFSET_Y: f64 = 2.0;

/// Engine phase, derived from internal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderPhase {
    Idle,
    Tracking,
    Dragging,
}

/// Floating handle placement exposed to the shell; a pure read.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleState {
    pub element: ElementId,
    pub position: Point,
}

/// Elements whose visual markers the shell must clear when a gesture ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragCleanup {
    pub source: Option<ElementId>,
    pub drop_target: Option<ElementId>,
}

/// Outcome of a drop: a structural change, or a gesture that resolved to
/// nothing (no target, own span, resolution failure). Ignored drops leave
/// the document untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    Moved(Patch),
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
struct TrackedBlock {
    element: ElementId,
    /// Start position of the enclosing top-level block.
    start: usize,
    handle: Point,
}

#[derive(Debug, Clone, PartialEq)]
struct DragSource {
    element: ElementId,
    start: usize,
}

/// Pointer-driven block reordering.
///
/// The shell forwards pointer events in and renders the handle/indicator
/// state back out; the only document mutation is the single delete+insert
/// transaction dispatched on a valid drop.
#[derive(Debug, Default)]
pub struct ReorderEngine {
    tracked: Option<TrackedBlock>,
    hide_deadline: Option<Instant>,
    drag: Option<DragSource>,
    drop_target: Option<ElementId>,
}

impl ReorderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ReorderPhase {
        if self.drag.is_some() {
            ReorderPhase::Dragging
        } else if self.tracked.is_some() {
            ReorderPhase::Tracking
        } else {
            ReorderPhase::Idle
        }
    }

    /// Current handle placement; `None` while hidden.
    pub fn handle(&self) -> Option<HandleState> {
        self.tracked.as_ref().map(|t| HandleState {
            element: t.element,
            position: t.handle,
        })
    }

    /// Track pointer movement over the editing surface. `over_handle` is
    /// whether the pointer is currently on the handle itself, which must
    /// not hide it.
    pub fn pointer_move(
        &mut self,
        point: Point,
        over_handle: bool,
        doc: &Document,
        layout: &dyn Layout,
        now: Instant,
    ) {
        if let Some(element) = layout.element_at_point(point) {
            // A qualifying move cancels any pending hide.
            self.hide_deadline = None;
            let unchanged = self.tracked.as_ref().is_some_and(|t| t.element == element);
            if unchanged {
                return;
            }
            if let Some(tracked) = track_block(element, doc, layout) {
                self.tracked = Some(tracked);
            }
            return;
        }
        if over_handle {
            self.hide_deadline = None;
            return;
        }
        if self.tracked.is_some() && self.hide_deadline.is_none() {
            self.hide_deadline = Some(now + HANDLE_HIDE_DELAY);
        }
    }

    /// Advance the hide timer; the shell calls this from its own tick.
    pub fn tick(&mut self, now: Instant) {
        if self.drag.is_none() && self.hide_deadline.is_some_and(|deadline| now >= deadline) {
            self.tracked = None;
            self.hide_deadline = None;
        }
    }

    /// Begin dragging the currently tracked block. Returns the source
    /// element so the shell can apply its dragging visual.
    pub fn drag_start(&mut self) -> Option<ElementId> {
        let tracked = self.tracked.as_ref()?;
        debug!(element = ?tracked.element, start = tracked.start, "drag started");
        self.drag = Some(DragSource {
            element: tracked.element,
            start: tracked.start,
        });
        Some(tracked.element)
    }

    /// Update the drop-target indicator while dragging. Returns the current
    /// indicator element.
    pub fn drag_over(&mut self, point: Point, layout: &dyn Layout) -> Option<ElementId> {
        let source = self.drag.as_ref()?;
        if let Some(element) = layout.element_at_point(point)
            && element != source.element
        {
            self.drop_target = Some(element);
        }
        self.drop_target
    }

    /// Resolve the drop and, when valid, dispatch the move transaction.
    /// Every failure path leaves the document untouched; the shell still
    /// calls [`ReorderEngine::drag_end`] afterwards.
    pub fn drop(&mut self, point: Point, doc: &mut Document, layout: &dyn Layout) -> DropOutcome {
        let Some(source) = self.drag.clone() else {
            return DropOutcome::Ignored;
        };
        let Some(element) = layout.element_at_point(point) else {
            return DropOutcome::Ignored;
        };
        if element == source.element {
            return DropOutcome::Ignored;
        }
        let Ok(raw) = layout.position_of_element(element) else {
            debug!(element = ?element, "drop aborted: target resolution failed");
            return DropOutcome::Ignored;
        };
        let Some(hovered_start) = doc.block_start_at(raw) else {
            return DropOutcome::Ignored;
        };
        let Some((_, hovered)) = doc.block_starting_at(hovered_start) else {
            return DropOutcome::Ignored;
        };
        // Land on the far side of the hovered block: before it when
        // dragging up, after it when dragging down.
        let target = if source.start > hovered_start {
            hovered_start
        } else {
            hovered_start + hovered.size()
        };
        move_block(doc, source.start, target)
    }

    /// Always runs at the end of a gesture, success or failure; reports the
    /// visual markers the shell must clear.
    pub fn drag_end(&mut self) -> DragCleanup {
        DragCleanup {
            source: self.drag.take().map(|d| d.element),
            drop_target: self.drop_target.take(),
        }
    }
}

fn track_block(element: ElementId, doc: &Document, layout: &dyn Layout) -> Option<TrackedBlock> {
    let raw = layout.position_of_element(element).ok()?;
    // Normalize to the enclosing top-level block's own start.
    let start = doc.block_start_at(raw)?;
    let bounds = layout.element_bounds(element).ok()?;
    let handle = Point::new(bounds.x - HANDLE_GAP_X, bounds.y + HANDLE_OFFSET_Y);
    Some(TrackedBlock {
        element,
        start,
        handle,
    })
}

/// Move the block spanning `[start, start+size)` so it begins at `target`,
/// as one atomic delete+insert transaction. Targets on or inside the
/// source's own span are a no-op.
pub fn move_block(doc: &mut Document, start: usize, target: usize) -> DropOutcome {
    let Some((_, block)) = doc.block_starting_at(start) else {
        return DropOutcome::Ignored;
    };
    let block = block.clone();
    let size = block.size();

    // A block cannot be dropped into itself.
    if target >= start && target < start + size {
        return DropOutcome::Ignored;
    }
    // Deleting the source first shifts every later position left by `size`.
    let target = if target > start + size {
        target - size
    } else {
        target
    };

    let tx = Transaction::new()
        .delete_block(start..start + size)
        .insert_block(target, block);
    match doc.apply(tx) {
        Ok(patch) => {
            debug!(start, target, "block moved");
            DropOutcome::Moved(patch)
        }
        Err(err) => {
            debug!(%err, "block move aborted");
            DropOutcome::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::layout::Rect;
    use crate::assist::testutil::FakeLayout;
    use crate::editing::Block;
    use pretty_assertions::assert_eq;

    /// Three paragraphs of 8 chars (10 position units each) rendered as
    /// stacked 100x30 rows.
    fn doc() -> Document {
        Document::from_blocks(vec![
            Block::paragraph("one 1111"),
            Block::paragraph("two 2222"),
            Block::paragraph("three 33"),
        ])
    }

    fn layout() -> FakeLayout {
        FakeLayout::default()
            .with_element(1, 0, Rect { x: 40.0, y: 0.0, width: 100.0, height: 30.0 })
            .with_element(2, 10, Rect { x: 40.0, y: 30.0, width: 100.0, height: 30.0 })
            .with_element(3, 20, Rect { x: 40.0, y: 60.0, width: 100.0, height: 30.0 })
    }

    fn over(element_row: usize) -> Point {
        Point::new(50.0, element_row as f64 * 30.0 + 5.0)
    }

    fn block_texts(doc: &Document) -> Vec<&str> {
        doc.blocks().iter().map(|b| b.text.as_str()).collect()
    }

    #[test]
    fn test_pointer_move_tracks_block_and_places_handle() {
        let doc = doc();
        let layout = layout();
        let mut engine = ReorderEngine::new();
        assert_eq!(engine.phase(), ReorderPhase::Idle);

        engine.pointer_move(over(1), false, &doc, &layout, Instant::now());
        assert_eq!(engine.phase(), ReorderPhase::Tracking);
        let handle = engine.handle().unwrap();
        assert_eq!(handle.element, ElementId(2));
        // Left of the block, just below its top edge.
        assert_eq!(handle.position, Point::new(16.0, 32.0));
    }

    #[test]
    fn test_hide_deadline_arms_fires_and_cancels() {
        let doc = doc();
        let layout = layout();
        let mut engine = ReorderEngine::new();
        let t0 = Instant::now();

        engine.pointer_move(over(0), false, &doc, &layout, t0);
        assert!(engine.handle().is_some());

        // Pointer leaves all blocks: deadline armed, handle still visible.
        let off = Point::new(500.0, 500.0);
        engine.pointer_move(off, false, &doc, &layout, t0);
        engine.tick(t0 + Duration::from_millis(100));
        assert!(engine.handle().is_some());

        // Returning over a block cancels the pending hide.
        engine.pointer_move(over(0), false, &doc, &layout, t0 + Duration::from_millis(200));
        engine.tick(t0 + HANDLE_HIDE_DELAY + Duration::from_millis(1));
        assert!(engine.handle().is_some());

        // Leaving again and letting the deadline pass hides the handle.
        let t1 = t0 + Duration::from_millis(300);
        engine.pointer_move(off, false, &doc, &layout, t1);
        engine.tick(t1 + HANDLE_HIDE_DELAY);
        assert!(engine.handle().is_none());
        assert_eq!(engine.phase(), ReorderPhase::Idle);
    }

    #[test]
    fn test_pointer_over_handle_keeps_it_visible() {
        let doc = doc();
        let layout = layout();
        let mut engine = ReorderEngine::new();
        let t0 = Instant::now();

        engine.pointer_move(over(0), false, &doc, &layout, t0);
        // The handle sits outside every block's rect; hovering it must not
        // arm the hide deadline.
        let handle_pos = engine.handle().unwrap().position;
        engine.pointer_move(handle_pos, true, &doc, &layout, t0);
        engine.tick(t0 + HANDLE_HIDE_DELAY + Duration::from_millis(1));
        assert!(engine.handle().is_some());
    }

    #[test]
    fn test_drag_start_requires_tracked_block() {
        let mut engine = ReorderEngine::new();
        assert_eq!(engine.drag_start(), None);
        assert_eq!(engine.phase(), ReorderPhase::Idle);
    }

    #[test]
    fn test_drag_to_end_moves_first_block_last() {
        let mut doc = doc();
        let layout = layout();
        let mut engine = ReorderEngine::new();

        engine.pointer_move(over(0), false, &doc, &layout, Instant::now());
        assert_eq!(engine.drag_start(), Some(ElementId(1)));
        assert_eq!(engine.phase(), ReorderPhase::Dragging);
        assert_eq!(engine.drag_over(over(2), &layout), Some(ElementId(3)));

        let outcome = engine.drop(over(2), &mut doc, &layout);
        assert!(matches!(outcome, DropOutcome::Moved(_)));
        assert_eq!(block_texts(&doc), vec!["two 2222", "three 33", "one 1111"]);
        assert_eq!(doc.size(), 30);

        let cleanup = engine.drag_end();
        assert_eq!(cleanup.source, Some(ElementId(1)));
        assert_eq!(cleanup.drop_target, Some(ElementId(3)));
        assert_eq!(engine.phase(), ReorderPhase::Idle);
    }

    #[test]
    fn test_drag_upward_inserts_before_target() {
        let mut doc = doc();
        let layout = layout();
        let mut engine = ReorderEngine::new();

        engine.pointer_move(over(2), false, &doc, &layout, Instant::now());
        engine.drag_start().unwrap();
        let outcome = engine.drop(over(0), &mut doc, &layout);
        assert!(matches!(outcome, DropOutcome::Moved(_)));
        assert_eq!(block_texts(&doc), vec!["three 33", "one 1111", "two 2222"]);
    }

    #[test]
    fn test_drop_on_own_block_is_ignored() {
        let mut doc = doc();
        let layout = layout();
        let mut engine = ReorderEngine::new();

        engine.pointer_move(over(0), false, &doc, &layout, Instant::now());
        engine.drag_start().unwrap();
        let before = doc.clone();
        assert_eq!(engine.drop(over(0), &mut doc, &layout), DropOutcome::Ignored);
        assert_eq!(doc, before);
        engine.drag_end();
    }

    #[test]
    fn test_drop_outside_any_block_is_ignored() {
        let mut doc = doc();
        let layout = layout();
        let mut engine = ReorderEngine::new();

        engine.pointer_move(over(1), false, &doc, &layout, Instant::now());
        engine.drag_start().unwrap();
        let before = doc.clone();
        assert_eq!(
            engine.drop(Point::new(500.0, 500.0), &mut doc, &layout),
            DropOutcome::Ignored
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn test_detached_target_aborts_but_cleanup_still_reports() {
        let mut doc = doc();
        let mut layout = layout();
        let mut engine = ReorderEngine::new();

        engine.pointer_move(over(0), false, &doc, &layout, Instant::now());
        engine.drag_start().unwrap();
        engine.drag_over(over(2), &layout);

        layout.detach(ElementId(3));
        let before = doc.clone();
        assert_eq!(engine.drop(over(2), &mut doc, &layout), DropOutcome::Ignored);
        assert_eq!(doc, before);

        let cleanup = engine.drag_end();
        assert_eq!(cleanup.source, Some(ElementId(1)));
        assert_eq!(cleanup.drop_target, Some(ElementId(3)));
    }

    #[test]
    fn test_drag_over_ignores_own_element() {
        let doc = doc();
        let layout = layout();
        let mut engine = ReorderEngine::new();

        engine.pointer_move(over(1), false, &doc, &layout, Instant::now());
        engine.drag_start().unwrap();
        assert_eq!(engine.drag_over(over(1), &layout), None);
        // A real target replaces the empty indicator and survives a pass
        // back over the source.
        assert_eq!(engine.drag_over(over(0), &layout), Some(ElementId(1)));
        assert_eq!(engine.drag_over(over(1), &layout), Some(ElementId(1)));
    }

    // --- move_block position-level properties ---

    #[test]
    fn test_move_preserves_total_size() {
        let mut d = doc();
        assert!(matches!(move_block(&mut d, 0, 30), DropOutcome::Moved(_)));
        assert_eq!(d.size(), 30);
    }

    #[test]
    fn test_move_into_own_span_is_noop() {
        for target in 0..10 {
            let mut d = doc();
            let before = d.clone();
            assert_eq!(move_block(&mut d, 0, target), DropOutcome::Ignored);
            assert_eq!(d, before, "target {target} should not move anything");
        }
    }

    #[test]
    fn test_move_roundtrip_restores_order() {
        let mut d = doc();
        // Move the last block to just before the second one...
        assert!(matches!(move_block(&mut d, 20, 10), DropOutcome::Moved(_)));
        assert_eq!(block_texts(&d), vec!["one 1111", "three 33", "two 2222"]);
        // ...and back to the end.
        assert!(matches!(move_block(&mut d, 10, 30), DropOutcome::Moved(_)));
        assert_eq!(block_texts(&d), vec!["one 1111", "two 2222", "three 33"]);
    }

    #[test]
    fn test_move_from_non_block_start_is_ignored() {
        let mut d = doc();
        let before = d.clone();
        assert_eq!(move_block(&mut d, 5, 20), DropOutcome::Ignored);
        assert_eq!(d, before);
    }
}
