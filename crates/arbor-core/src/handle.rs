//! Node handles.
//!
//! A [`Node`] is the byte offset of a node's tag inside the arena. It is a
//! plain index: any splice before it leaves it pointing at whatever now
//! occupies that offset. Use a [`crate::Cursor`] to follow a node across
//! edits.

use std::fmt;

/// The offset of a node in the arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Node(u32);

impl Node {
    /// Creates a handle from a raw offset.
    #[must_use]
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    /// Creates a handle from a buffer index.
    ///
    /// Arena capacities never exceed `u32::MAX`, so the narrowing is lossless.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn at(offset: usize) -> Self {
        Self(offset as u32)
    }

    /// Returns the byte offset of this node.
    #[must_use]
    pub const fn offset(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ordering_follows_offsets() {
        assert!(Node::new(3) < Node::new(7));
        assert_eq!(Node::at(12).offset(), 12);
    }

    #[test]
    fn test_node_size() {
        assert_eq!(std::mem::size_of::<Node>(), 4);
    }
}
