/*!
 * # Editing Core Module
 *
 * The document model the smart-assist engines run against.
 *
 * ## Architecture
 *
 * ### 1. Position-addressed blocks
 * - The document is an ordered sequence of typed **blocks** (paragraph,
 *   heading, blockquote, preformatted).
 * - Every point in the document has an integer **position**: each block
 *   spans one opening boundary unit, one unit per character of its text,
 *   and one closing boundary unit. Block starts are the cumulative sums
 *   of the preceding block sizes.
 * - Positions are only meaningful for one document version; applying a
 *   transaction remaps them.
 *
 * ### 2. Transaction-based editing
 * - All mutation flows through a **`Transaction`**: an ordered list of
 *   delete/insert/replace steps applied atomically. Either every step
 *   applies or the document is left untouched.
 * - Each step is expressed in the coordinates of the document as it stands
 *   when that step applies; the selection is remapped through every step.
 *
 * ### 3. Read API
 * - `Document::resolve` locates a position inside a block, `text_between`
 *   reads flattened text, and `Patch` describes what an applied transaction
 *   changed. Consumers render from these reads and never reach into the
 *   block list directly to mutate it.
 */

pub mod document;
pub mod patch;
pub mod transaction;

pub use document::{Block, BlockKind, Document, Resolved, Selection};
pub use patch::Patch;
pub use transaction::{ApplyError, Step, Transaction};
