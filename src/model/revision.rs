use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Opaque, totally ordered identifier of a global store state.
///
/// Revisions are issued monotonically by the store and immutable once issued.
/// Zero is the "null revision": it addresses no committed state and is
/// rejected by every operation that takes a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(u64);

impl Revision {
    /// The first committed state of a store.
    pub const INIT: Revision = Revision(1);

    pub const fn new(value: u64) -> Self {
        Revision(value)
    }

    pub const fn number(&self) -> u64 {
        self.0
    }

    pub const fn is_valid(&self) -> bool {
        self.0 > 0
    }

    /// The revision `count` steps after this one.
    pub const fn forward(&self, count: u64) -> Revision {
        Revision(self.0 + count)
    }
}

impl fmt::Display for Revision {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}
