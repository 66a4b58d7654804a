//! Entity identifiers.
//!
//! Identifiers are small `Copy` newtypes so the different entity kinds can
//! never be mixed up. They are handed out by the owning [`Schedule`]'s own
//! [`IdSequence`] counters; there is no process-wide id state.
//!
//! [`Schedule`]: super::Schedule

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw numeric value.
            #[inline]
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Machine`](super::Machine).
    MachineId,
    "M"
);
entity_id!(
    /// Identifier of a [`Job`](super::Job).
    JobId,
    "J"
);
entity_id!(
    /// Identifier of a [`Task`](super::Task).
    TaskId,
    "T"
);
entity_id!(
    /// Identifier of a [`Precedence`](super::Precedence).
    PrecedenceId,
    "P"
);
entity_id!(
    /// Identifier of a graph [`Node`](super::Node).
    NodeId,
    "N"
);
entity_id!(
    /// Identifier of a graph [`Edge`](super::Edge).
    EdgeId,
    "E"
);

/// Auto-incrementing counter owned by a single aggregate.
///
/// Starts at 1 so that 0 is never a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    /// Creates a sequence whose first value is 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns the next value and advances the counter.
    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The value the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Advances the counter past `id` if it has not got there yet.
    pub(crate) fn reserve_through(&mut self, id: u64) {
        if id >= self.peek() {
            self.next = id + 1;
        }
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}
