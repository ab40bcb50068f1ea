use crate::editing::Selection;

/// Result of applying a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Position ranges touched by the transaction, in final coordinates.
    pub changed: Vec<std::ops::Range<usize>>,
    pub new_selection: Selection,
    pub version: u64,
}
