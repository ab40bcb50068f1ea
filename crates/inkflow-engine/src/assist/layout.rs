use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identifier for a rendered block element, issued by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// A point in the shell's screen coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Screen rectangle of a rendered element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

/// Resolution failures from the rendering layer. These abort the operation
/// at hand without mutating the document; they are never surfaced to the
/// user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("element {0:?} is no longer attached to the rendered document")]
    Detached(ElementId),
    #[error("no caret geometry available at position {0}")]
    NoCaretGeometry(usize),
}

/// Narrow capability boundary to the rendering layer.
///
/// The engines consume this instead of any concrete rendering technology:
/// the shell implements it over its real view, tests implement it over a
/// fake. Hit-testing only reports elements rendering eligible top-level
/// blocks; inline descendants resolve to their nearest block ancestor.
pub trait Layout {
    /// Document position at the start of the given rendered block element.
    fn position_of_element(&self, element: ElementId) -> Result<usize, LayoutError>;

    /// Eligible rendered block element under the pointer, if any.
    fn element_at_point(&self, point: Point) -> Option<ElementId>;

    /// Screen rectangle of a rendered block element.
    fn element_bounds(&self, element: ElementId) -> Result<Rect, LayoutError>;

    /// Bottom-left corner of the caret rendered at a document position.
    fn caret_anchor(&self, pos: usize) -> Result<Point, LayoutError>;
}
