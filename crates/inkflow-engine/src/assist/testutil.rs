//! Fake layout used by the engine unit tests.

use crate::assist::layout::{ElementId, Layout, LayoutError, Point, Rect};

/// In-memory stand-in for the shell's rendering layer: a flat table of
/// rendered block elements with fixed geometry and document positions.
#[derive(Debug, Default)]
pub(crate) struct FakeLayout {
    elements: Vec<(ElementId, usize, Rect)>,
    fail_caret: bool,
    detached: Vec<ElementId>,
}

impl FakeLayout {
    pub fn without_caret_geometry() -> Self {
        Self {
            fail_caret: true,
            ..Self::default()
        }
    }

    pub fn with_element(mut self, id: u64, pos: usize, rect: Rect) -> Self {
        self.elements.push((ElementId(id), pos, rect));
        self
    }

    /// Simulate the element disappearing from the rendered document while
    /// still being hit-testable (a re-render race).
    pub fn detach(&mut self, element: ElementId) {
        self.detached.push(element);
    }
}

impl Layout for FakeLayout {
    fn position_of_element(&self, element: ElementId) -> Result<usize, LayoutError> {
        if self.detached.contains(&element) {
            return Err(LayoutError::Detached(element));
        }
        self.elements
            .iter()
            .find(|(id, _, _)| *id == element)
            .map(|(_, pos, _)| *pos)
            .ok_or(LayoutError::Detached(element))
    }

    fn element_at_point(&self, point: Point) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, _, rect)| rect.contains(point))
            .map(|(id, _, _)| *id)
    }

    fn element_bounds(&self, element: ElementId) -> Result<Rect, LayoutError> {
        self.elements
            .iter()
            .find(|(id, _, _)| *id == element)
            .map(|(_, _, rect)| *rect)
            .ok_or(LayoutError::Detached(element))
    }

    fn caret_anchor(&self, pos: usize) -> Result<Point, LayoutError> {
        if self.fail_caret {
            return Err(LayoutError::NoCaretGeometry(pos));
        }
        // One screen unit per position, baseline at y=20.
        Ok(Point::new(8.0 * pos as f64, 20.0))
    }
}
