use serde::{Deserialize, Serialize};

use crate::editing::{Patch, Transaction, transaction::ApplyError};

/// Kind of a top-level block node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Paragraph,
    Heading { level: u8 },
    Blockquote,
    Preformatted,
}

impl BlockKind {
    /// Whether a caret inside this block may receive name suggestions.
    /// Preformatted blocks hold verbatim text and are excluded.
    pub fn accepts_suggestions(&self) -> bool {
        !matches!(self, BlockKind::Preformatted)
    }
}

/// A typed unit of top-level content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
}

impl Block {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, text)
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::new(BlockKind::Heading { level }, text)
    }

    /// Length of the block's text in characters (one position unit each).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Number of position units the block spans: one opening boundary,
    /// one per character, one closing boundary.
    pub fn size(&self) -> usize {
        self.char_len() + 2
    }
}

/// A pair of positions; collapsed when anchor and head coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// A collapsed selection (caret) at the given position.
    pub fn caret(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }
}

/// Where a position lands inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    /// Index of the containing block.
    pub block_index: usize,
    /// Position of the containing block's opening boundary.
    pub block_start: usize,
    /// Char offset into the block's text. Positions on the boundary units
    /// clamp to the nearest text edge.
    pub offset: usize,
}

/// Ordered sequence of blocks addressed by flat integer positions.
///
/// The document is the single source of truth for the assist engines: they
/// read it freely but mutate it only via [`Document::apply`], which applies
/// a whole [`Transaction`] atomically and bumps the version counter.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub(crate) blocks: Vec<Block>,
    pub(crate) selection: Selection,
    pub(crate) version: u64,
}

impl Document {
    /// Create a document from blocks, with the caret at the end of the last
    /// block's text.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let size: usize = blocks.iter().map(Block::size).sum();
        Self {
            blocks,
            // The last text position is one unit before the final closing
            // boundary; an empty document keeps the caret at 0.
            selection: Selection::caret(size.saturating_sub(1)),
            version: 0,
        }
    }

    /// Total document size in position units.
    pub fn size(&self) -> usize {
        self.blocks.iter().map(Block::size).sum()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Start position of the block at the given index.
    pub fn block_start(&self, index: usize) -> usize {
        self.blocks[..index.min(self.blocks.len())]
            .iter()
            .map(Block::size)
            .sum()
    }

    /// Locate the block containing a position.
    pub fn resolve(&self, pos: usize) -> Option<Resolved> {
        let mut start = 0;
        for (block_index, block) in self.blocks.iter().enumerate() {
            let end = start + block.size();
            if pos < end {
                // Clamp boundary units to the nearest text edge.
                let offset = pos.saturating_sub(start + 1).min(block.char_len());
                return Some(Resolved {
                    block_index,
                    block_start: start,
                    offset,
                });
            }
            start = end;
        }
        None
    }

    /// Normalize any position inside a block's span to the block's own start.
    pub fn block_start_at(&self, pos: usize) -> Option<usize> {
        self.resolve(pos).map(|r| r.block_start)
    }

    /// The block whose span begins exactly at `pos`, if any.
    pub fn block_starting_at(&self, pos: usize) -> Option<(usize, &Block)> {
        let mut start = 0;
        for (index, block) in self.blocks.iter().enumerate() {
            if start == pos {
                return Some((index, block));
            }
            if start > pos {
                return None;
            }
            start += block.size();
        }
        None
    }

    /// Whether `pos` falls between blocks (including both document ends).
    pub fn is_block_boundary(&self, pos: usize) -> bool {
        let mut start = 0;
        for block in &self.blocks {
            if start == pos {
                return true;
            }
            start += block.size();
        }
        pos == start
    }

    /// Flattened text in `[from, to)`. Boundary units between blocks
    /// contribute a single `\n` separator, so a range that strays across
    /// blocks can never compare equal to text from a single block. Out of
    /// range positions are clamped.
    pub fn text_between(&self, from: usize, to: usize) -> String {
        let mut out = String::new();
        let mut start = 0;
        let mut emitted_block = false;
        for block in &self.blocks {
            let content_from = start + 1;
            let content_to = content_from + block.char_len();
            let lo = from.max(content_from);
            let hi = to.min(content_to);
            if lo < hi {
                if emitted_block {
                    out.push('\n');
                }
                out.extend(block.text.chars().skip(lo - content_from).take(hi - lo));
                emitted_block = true;
            }
            start += block.size();
        }
        out
    }

    /// Apply a transaction atomically. On error the document is untouched.
    pub fn apply(&mut self, tx: Transaction) -> Result<Patch, ApplyError> {
        crate::editing::transaction::apply(self, tx)
    }
}
