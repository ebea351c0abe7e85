//! Classroom model.

use serde::{Deserialize, Serialize};

/// A classroom in which defenses can be held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: u64,
    pub name: String,
    pub capacity: u32,
    pub active: bool,
}

impl Classroom {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            capacity: 1,
            active: true,
        }
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
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
    fn test_classroom_builder() {
        let c = Classroom::new(1, "C1").with_capacity(40).with_active(false);
        assert_eq!(c.capacity, 40);
        assert!(!c.active);
    }
}
