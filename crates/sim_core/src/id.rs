use serde::{Deserialize, Serialize};
use std::fmt;

/// A monotonically allocated entity identifier. `0` is reserved for "invalid".
///
/// Ids are never reused within a game and carry no type information of their
/// own — callers index the matching map in [`crate::state::GameState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Id(pub u64);

impl Id {
    pub const INVALID: Id = Id(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl Default for Id {
    fn default() -> Self {
        Id::INVALID
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process-wide counter that hands out unique, increasing [`Id`]s.
///
/// Stored in [`crate::state::GameState`] and persisted with the save so that
/// ids remain unique across a load/save round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        // 0 is reserved for Id::INVALID, so allocation starts at 1.
        IdAllocator { next: 1 }
    }
}

impl IdAllocator {
    pub fn allocate(&mut self) -> Id {
        let id = Id(self.next);
        self.next += 1;
        id
    }

    /// Highest id handed out so far (for diagnostics/tests); 0 if none yet.
    pub fn last_allocated(&self) -> u64 {
        self.next.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_increasing_nonzero_ids() {
        let mut alloc = IdAllocator::default();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert!(a.is_valid());
        assert!(b.is_valid());
        assert_eq!(b.0, a.0 + 1);
        assert_eq!(a.0, 1);
    }

    #[test]
    fn invalid_id_is_zero() {
        assert_eq!(Id::INVALID.0, 0);
        assert!(!Id::INVALID.is_valid());
    }
}
