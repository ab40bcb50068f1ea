use serde::{Deserialize, Serialize};

/// Identifier of a character in the caller's knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RosterId(pub u64);

/// A canonical character name available for completion.
///
/// The roster is supplied wholesale by the caller whenever its character
/// list changes; the engine never diffs or edits individual entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: RosterId,
    pub name: String,
}

impl RosterEntry {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: RosterId(id),
            name: name.into(),
        }
    }
}
