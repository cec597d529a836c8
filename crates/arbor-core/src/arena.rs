//! The arena: one byte buffer holding every live tree.
//!
//! Trees are written in preorder with no length fields or parent pointers.
//! New trees are always built past the end of the live content and spliced
//! into place afterwards, so a half-built tree never aliases a live one.
//!
//! The four byte-level primitives ([`Arena::insert_bytes`],
//! [`Arena::remove_bytes`], [`Arena::move_bytes`] and [`Arena::truncate`])
//! are the only code that relocates cursors.

use tracing::warn;

use crate::cursor::{Cursor, ReferenceTable};
use crate::error::{Error, Result};
use crate::handle::Node;

/// Default capacity of a new arena, in bytes.
pub const DEFAULT_CAPACITY: usize = 1 << 16;

/// Flat storage for expression trees.
#[derive(Clone, Debug)]
pub struct Arena {
    pub(crate) blocks: Vec<u8>,
    capacity: usize,
    references: ReferenceTable,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    /// Creates an empty arena with [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty arena that refuses to grow past `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` does not fit in a `u32`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(u32::try_from(capacity).is_ok(), "arena capacity must fit in u32");
        Self {
            blocks: Vec::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
            references: ReferenceTable::default(),
        }
    }

    /// Number of bytes in use.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if no tree is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Maximum number of bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The raw encoded content.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.blocks
    }

    /// The offset just past the last live byte, where new trees are built.
    #[must_use]
    pub fn end(&self) -> Node {
        Node::at(self.blocks.len())
    }

    /// Drops every tree and every cursor.
    pub fn flush(&mut self) {
        self.blocks.clear();
        self.references.clear();
    }

    // === Cursors ===

    /// Starts tracking `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CursorsExhausted`] when no relocation slot is left.
    pub fn cursor(&mut self, node: Node) -> Result<Cursor> {
        self.references
            .store(node.offset())
            .ok_or(Error::CursorsExhausted)
    }

    /// The node a cursor currently denotes, or `None` if that node was
    /// removed.
    #[must_use]
    pub fn resolve(&self, cursor: Cursor) -> Option<Node> {
        self.references.get(cursor)
    }

    /// Stops tracking a cursor and frees its slot.
    pub fn release(&mut self, cursor: Cursor) {
        self.references.release(cursor);
    }

    /// Points an existing cursor at another node.
    pub fn retarget(&mut self, cursor: Cursor, node: Node) {
        self.references.set(cursor, node.offset());
    }

    /// Number of cursors holding a slot.
    #[must_use]
    pub fn live_cursors(&self) -> usize {
        self.references.live()
    }

    // === Byte primitives ===

    fn reserve(&self, additional: usize) -> Result<()> {
        let requested = self.blocks.len() + additional;
        if requested > self.capacity {
            warn!(requested, capacity = self.capacity, "arena exhausted");
            return Err(Error::ArenaExhausted {
                requested,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Appends raw bytes at the tail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaExhausted`] if the bytes do not fit.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<Node> {
        self.reserve(bytes.len())?;
        let node = self.end();
        self.blocks.extend_from_slice(bytes);
        Ok(node)
    }

    /// Inserts raw bytes at `at`. Cursors at or after `at` shift right.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaExhausted`] if the bytes do not fit.
    pub fn insert_bytes(&mut self, at: Node, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        let at = at.offset();
        let n = bytes.len();
        self.blocks.splice(at..at, bytes.iter().copied());
        self.references
            .relocate(|offset| Some(if offset >= at { offset + n } else { offset }));
        Ok(())
    }

    /// Removes `len` bytes at `at`. Cursors inside the range are invalidated,
    /// cursors after it shift left.
    pub fn remove_bytes(&mut self, at: Node, len: usize) {
        let at = at.offset();
        let end = at + len;
        self.blocks.drain(at..end);
        self.references.relocate(|offset| {
            if offset >= end {
                Some(offset - len)
            } else if offset >= at {
                None
            } else {
                Some(offset)
            }
        });
    }

    /// Moves `len` bytes starting at `src` so they end up in front of the
    /// byte currently at `dst`. Cursors inside the moved range follow it,
    /// cursors between the two positions shift by `len`.
    pub fn move_bytes(&mut self, dst: Node, src: Node, len: usize) {
        let (dst, src) = (dst.offset(), src.offset());
        debug_assert!(dst <= src || dst >= src + len, "destination inside moved range");
        if len == 0 || dst == src || dst == src + len {
            return;
        }
        if dst < src {
            self.blocks[dst..src + len].rotate_right(len);
            self.references.relocate(|offset| {
                Some(if (src..src + len).contains(&offset) {
                    offset - (src - dst)
                } else if (dst..src).contains(&offset) {
                    offset + len
                } else {
                    offset
                })
            });
        } else {
            self.blocks[src..dst].rotate_left(len);
            self.references.relocate(|offset| {
                Some(if (src..src + len).contains(&offset) {
                    offset + (dst - len - src)
                } else if (src + len..dst).contains(&offset) {
                    offset - len
                } else {
                    offset
                })
            });
        }
    }

    /// Drops everything from `len` onwards.
    pub fn truncate(&mut self, len: usize) {
        if len < self.blocks.len() {
            let tail = self.blocks.len() - len;
            self.remove_bytes(Node::at(len), tail);
        }
    }

    // === Tree edits ===

    /// Copies a tree to the tail and returns the copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaExhausted`] if the copy does not fit.
    pub fn clone_tree(&mut self, node: Node) -> Result<Node> {
        let size = self.tree_size(node);
        self.reserve(size)?;
        let copy = self.end();
        let start = node.offset();
        self.blocks.extend_from_within(start..start + size);
        Ok(copy)
    }

    /// Replaces the tree at `dst` with the tree at `src`, removing the old
    /// bytes of `dst` and the original position of `src`.
    ///
    /// `src` may be a descendant of `dst`. Cursors on `dst` keep denoting the
    /// slot and therefore end up on the new tree. Returns the new position.
    pub fn move_tree_over_tree(&mut self, dst: Node, src: Node) -> Node {
        if dst == src {
            return dst;
        }
        let slot_cursors = self.references.at_offset(dst.offset());
        let old_size = self.tree_size(dst);
        let new_size = self.tree_size(src);
        let result = if src > dst && src.offset() < dst.offset() + old_size {
            let tail = Node::at(src.offset() + new_size);
            self.remove_bytes(tail, dst.offset() + old_size - tail.offset());
            self.remove_bytes(dst, src.offset() - dst.offset());
            dst
        } else {
            debug_assert!(
                dst < src || dst.offset() >= src.offset() + new_size,
                "cannot move a tree over its own descendant"
            );
            self.move_bytes(dst, src, new_size);
            let at = if dst > src { dst.offset() - new_size } else { dst.offset() };
            self.remove_bytes(Node::at(at + new_size), old_size);
            Node::at(at)
        };
        for cursor in slot_cursors {
            self.references.set(cursor, result.offset());
        }
        result
    }

    /// Replaces the tree at `dst` with a copy of the tree at `src`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArenaExhausted`] if the copy does not fit.
    pub fn clone_tree_over_tree(&mut self, dst: Node, src: Node) -> Result<Node> {
        let copy = self.clone_tree(src)?;
        Ok(self.move_tree_over_tree(dst, copy))
    }

    /// Replaces the node at `dst` with its only remaining child.
    pub fn remove_node(&mut self, node: Node) {
        let slot_cursors = self.references.at_offset(node.offset());
        let size = self.node_size(node);
        self.remove_bytes(node, size);
        for cursor in slot_cursors {
            self.references.set(cursor, node.offset());
        }
    }

    /// Removes a whole tree.
    pub fn remove_tree(&mut self, node: Node) {
        let size = self.tree_size(node);
        self.remove_bytes(node, size);
    }

    /// Moves `tree` in front of `anchor`, returning its new position.
    pub fn move_tree_before(&mut self, anchor: Node, tree: Node) -> Node {
        let size = self.tree_size(tree);
        self.move_bytes(anchor, tree, size);
        if anchor > tree {
            Node::at(anchor.offset() - size)
        } else {
            anchor
        }
    }

    /// Moves `tree` right after the tree at `anchor`, returning its new
    /// position.
    pub fn move_tree_after(&mut self, anchor: Node, tree: Node) -> Node {
        let target = self.next_tree(anchor);
        if target == tree {
            return tree;
        }
        self.move_tree_before(target, tree)
    }

    /// Moves a tree to the tail, out of whatever contained it.
    pub fn detach_tree(&mut self, tree: Node) -> Node {
        let end = self.end();
        self.move_tree_before(end, tree)
    }

    /// Exchanges two disjoint trees.
    pub fn swap_trees(&mut self, a: Node, b: Node) {
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        if first == second {
            return;
        }
        let first_size = self.tree_size(first);
        let second_size = self.tree_size(second);
        debug_assert!(first.offset() + first_size <= second.offset(), "overlapping trees");
        self.move_bytes(first, second, second_size);
        self.move_bytes(
            Node::at(second.offset() + second_size),
            Node::at(first.offset() + second_size),
            first_size,
        );
    }

    /// Overwrites one byte inside a node header.
    pub(crate) fn write_byte(&mut self, at: usize, value: u8) {
        self.blocks[at] = value;
    }
}
