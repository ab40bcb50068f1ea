use std::ops::Range;

use thiserror::Error;
use tracing::trace;

use crate::editing::{Block, Document, Patch, Selection};

/// A single edit step, expressed in the coordinates of the document as it
/// stands when the step applies.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Replace a range lying within a single block's text.
    ReplaceText { range: Range<usize>, text: String },
    /// Delete exactly one block's full span.
    DeleteBlock { range: Range<usize> },
    /// Insert a block at a block boundary.
    InsertBlock { at: usize, block: Block },
}

/// An atomic, ordered set of edit steps.
///
/// Positions in later steps refer to the document after the earlier steps
/// have applied; [`Document::apply`] remaps the selection (and previously
/// recorded change ranges) through each step in turn.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transaction {
    steps: Vec<Step>,
    set_selection: Option<Selection>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_text(mut self, range: Range<usize>, text: impl Into<String>) -> Self {
        self.steps.push(Step::ReplaceText {
            range,
            text: text.into(),
        });
        self
    }

    pub fn delete_block(mut self, range: Range<usize>) -> Self {
        self.steps.push(Step::DeleteBlock { range });
        self
    }

    pub fn insert_block(mut self, at: usize, block: Block) -> Self {
        self.steps.push(Step::InsertBlock { at, block });
        self
    }

    /// Set the selection explicitly instead of mapping the old one through
    /// the steps.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.set_selection = Some(selection);
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Reasons a transaction is rejected. The document is never left
/// half-applied: a rejected transaction changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("replace range {from}..{to} does not lie within one block's text")]
    ReplaceOutsideBlock { from: usize, to: usize },
    #[error("delete range {from}..{to} does not cover exactly one block")]
    DeleteNotABlock { from: usize, to: usize },
    #[error("insert position {0} is not a block boundary")]
    InsertNotAtBoundary(usize),
    #[error("selection {anchor}..{head} lies outside the document")]
    SelectionOutOfBounds { anchor: usize, head: usize },
}

/// How one applied step shifts positions around it.
struct Shift {
    at: usize,
    old_len: usize,
    new_len: usize,
}

impl Shift {
    fn map(&self, pos: usize) -> usize {
        if pos <= self.at {
            pos
        } else if pos >= self.at + self.old_len {
            pos - self.old_len + self.new_len
        } else {
            // Positions inside the replaced span collapse to its start.
            self.at
        }
    }

    fn map_range(&self, range: &Range<usize>) -> Range<usize> {
        let start = self.map(range.start);
        let end = self.map(range.end).max(start);
        start..end
    }
}

pub(crate) fn apply(doc: &mut Document, tx: Transaction) -> Result<Patch, ApplyError> {
    // Work on a copy so a failing step cannot leave a half-applied edit.
    let mut work = doc.clone();
    let mut changed: Vec<Range<usize>> = Vec::new();
    let mut selection = work.selection;

    for step in tx.steps() {
        let (shift, touched) = apply_step(&mut work, step)?;
        for range in &mut changed {
            *range = shift.map_range(range);
        }
        selection = Selection::new(shift.map(selection.anchor), shift.map(selection.head));
        changed.push(touched);
    }

    if let Some(sel) = tx.set_selection {
        let size = work.size();
        if sel.anchor > size || sel.head > size {
            return Err(ApplyError::SelectionOutOfBounds {
                anchor: sel.anchor,
                head: sel.head,
            });
        }
        selection = sel;
    }

    work.selection = selection;
    work.version += 1;
    *doc = work;
    trace!(
        steps = tx.steps().len(),
        version = doc.version,
        "applied transaction"
    );

    Ok(Patch {
        changed,
        new_selection: selection,
        version: doc.version,
    })
}

fn apply_step(doc: &mut Document, step: &Step) -> Result<(Shift, Range<usize>), ApplyError> {
    match step {
        Step::ReplaceText { range, text } => {
            let err = || ApplyError::ReplaceOutsideBlock {
                from: range.start,
                to: range.end,
            };
            let resolved = doc.resolve(range.start).ok_or_else(err)?;
            let block = &doc.blocks[resolved.block_index];
            let content_from = resolved.block_start + 1;
            let content_to = content_from + block.char_len();
            if range.start < content_from
                || range.end < range.start
                || range.end > content_to
            {
                return Err(err());
            }

            let from_off = range.start - content_from;
            let to_off = range.end - content_from;
            let block_text = &mut doc.blocks[resolved.block_index].text;
            let byte_from = byte_of_char_offset(block_text, from_off);
            let byte_to = byte_of_char_offset(block_text, to_off);
            block_text.replace_range(byte_from..byte_to, text);

            let inserted = text.chars().count();
            let shift = Shift {
                at: range.start,
                old_len: range.end - range.start,
                new_len: inserted,
            };
            Ok((shift, range.start..range.start + inserted))
        }
        Step::DeleteBlock { range } => {
            let err = || ApplyError::DeleteNotABlock {
                from: range.start,
                to: range.end,
            };
            let (index, block) = doc.block_starting_at(range.start).ok_or_else(err)?;
            if block.size() != range.end.saturating_sub(range.start) {
                return Err(err());
            }
            let size = block.size();
            doc.blocks.remove(index);
            let shift = Shift {
                at: range.start,
                old_len: size,
                new_len: 0,
            };
            Ok((shift, range.start..range.start))
        }
        Step::InsertBlock { at, block } => {
            let index = boundary_index(doc, *at).ok_or(ApplyError::InsertNotAtBoundary(*at))?;
            let size = block.size();
            doc.blocks.insert(index, block.clone());
            let shift = Shift {
                at: *at,
                old_len: 0,
                new_len: size,
            };
            Ok((shift, *at..*at + size))
        }
    }
}

/// Block index whose start equals `pos`, or `blocks.len()` for the document
/// end. `None` when `pos` is not a boundary.
fn boundary_index(doc: &Document, pos: usize) -> Option<usize> {
    let mut start = 0;
    for (index, block) in doc.blocks.iter().enumerate() {
        if start == pos {
            return Some(index);
        }
        start += block.size();
    }
    (pos == start).then_some(doc.blocks.len())
}

/// Byte index of the given char offset, clamped to the end of the string.
fn byte_of_char_offset(s: &str, offset: usize) -> usize {
    s.char_indices().nth(offset).map(|(i, _)| i).unwrap_or(s.len())
}
