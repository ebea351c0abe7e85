//! Instructor model.
//!
//! Instructors are responsible for projects and sit on jury panels for
//! other instructors' projects. Rank drives tie-breaking when a
//! self-jury attempt must be replaced (I2) and when the constructor
//! needs a deterministic fallback ordering.

use serde::{Deserialize, Serialize};

/// Academic rank, ordered from most to least senior for tie-breaking
/// purposes (`Full` outranks `Associate`, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Full,
    Associate,
    Assistant,
    Research,
}

/// An instructor: a responsible party for projects and a jury member
/// for others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    pub id: u64,
    pub name: String,
    pub rank: Rank,
    pub active: bool,
}

impl Instructor {
    pub fn new(id: u64, name: impl Into<String>, rank: Rank) -> Self {
        Self {
            id,
            name: name.into(),
            rank,
            active: true,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_ordering() {
        assert!(Rank::Full < Rank::Associate);
        assert!(Rank::Associate < Rank::Assistant);
        assert!(Rank::Assistant < Rank::Research);
    }

    #[test]
    fn test_instructor_builder() {
        let i = Instructor::new(1, "Dr. A", Rank::Full).with_active(false);
        assert_eq!(i.id, 1);
        assert_eq!(i.name, "Dr. A");
        assert!(!i.active);
    }
}
