//! Entity implementation

use std::fmt;

/// Stable entity identifier
///
/// Ids are handed out in increasing order by [`World`](super::World) and never
/// reused, so ordering by id is stable for the lifetime of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    id: u32,
}

impl Entity {
    /// Id a world returns once its id space is used up; it never names an object
    pub const INVALID: Self = Self { id: u32::MAX };

    /// Create a new entity with the given ID
    pub const fn new(id: u32) -> Self {
        Self { id }
    }

    /// Get the entity ID
    pub const fn id(&self) -> u32 {
        self.id
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}
