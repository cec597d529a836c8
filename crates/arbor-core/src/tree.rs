//! Navigation over encoded trees.
//!
//! There are no parent pointers: sizes are recomputed by walking headers and
//! parents are found by scanning forward from a known root.

use crate::arena::Arena;
use crate::handle::Node;
use crate::tag::Tag;

impl Arena {
    /// The tag of a node.
    ///
    /// # Panics
    ///
    /// Panics if `node` does not point at a tag byte written by this crate.
    #[must_use]
    pub fn tag(&self, node: Node) -> Tag {
        Tag::ALL[usize::from(self.blocks[node.offset()])]
    }

    /// The `index`-th payload byte of a node.
    #[must_use]
    pub fn payload_byte(&self, node: Node, index: usize) -> u8 {
        self.blocks[node.offset() + 1 + index]
    }

    /// Length of the tag and payload, without children.
    #[must_use]
    pub fn node_size(&self, node: Node) -> usize {
        let tag = self.tag(node);
        if let Some(size) = tag.fixed_node_size() {
            return size;
        }
        let byte = |i| usize::from(self.payload_byte(node, i));
        match tag {
            Tag::IntegerPosBig | Tag::IntegerNegBig | Tag::UserSymbol | Tag::UserFunction => {
                2 + byte(0)
            }
            Tag::RationalPosBig | Tag::RationalNegBig => 3 + byte(0) + byte(1),
            // the count byte includes the variable child
            Tag::Polynomial => 1 + byte(0),
            _ => 1,
        }
    }

    /// Number of direct children.
    #[must_use]
    pub fn number_of_children(&self, node: Node) -> usize {
        match self.tag(node).fixed_arity() {
            Some(arity) => arity,
            None => usize::from(self.payload_byte(node, 0)),
        }
    }

    /// Length of a node and all its descendants.
    #[must_use]
    pub fn tree_size(&self, node: Node) -> usize {
        let mut pending = 1;
        let mut offset = node.offset();
        while pending > 0 {
            let current = Node::at(offset);
            pending = pending - 1 + self.number_of_children(current);
            offset += self.node_size(current);
        }
        offset - node.offset()
    }

    /// The next node in preorder: the first child, or whatever follows a
    /// leaf.
    #[must_use]
    pub fn next_node(&self, node: Node) -> Node {
        Node::at(node.offset() + self.node_size(node))
    }

    /// The node right after this tree: its next sibling, if it has one.
    #[must_use]
    pub fn next_tree(&self, node: Node) -> Node {
        Node::at(node.offset() + self.tree_size(node))
    }

    /// The first child, if any.
    #[must_use]
    pub fn first_child(&self, node: Node) -> Option<Node> {
        (self.number_of_children(node) > 0).then(|| self.next_node(node))
    }

    /// The `index`-th child.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`Arena::number_of_children`].
    #[must_use]
    pub fn child(&self, node: Node, index: usize) -> Node {
        assert!(
            index < self.number_of_children(node),
            "child index {index} out of range"
        );
        let mut child = self.next_node(node);
        for _ in 0..index {
            child = self.next_tree(child);
        }
        child
    }

    /// The last child.
    ///
    /// # Panics
    ///
    /// Panics if the node has no children.
    #[must_use]
    pub fn last_child(&self, node: Node) -> Node {
        self.child(node, self.number_of_children(node) - 1)
    }

    /// Iterates over direct children.
    #[must_use]
    pub fn children(&self, node: Node) -> Children<'_> {
        Children {
            arena: self,
            next: self.next_node(node),
            remaining: self.number_of_children(node),
        }
    }

    /// Iterates over every node of a tree in preorder, the root included.
    #[must_use]
    pub fn descendants(&self, node: Node) -> Descendants<'_> {
        Descendants {
            arena: self,
            next: node,
            end: self.next_tree(node),
        }
    }

    /// The encoded bytes of a tree.
    #[must_use]
    pub fn tree_bytes(&self, node: Node) -> &[u8] {
        let start = node.offset();
        &self.blocks[start..start + self.tree_size(node)]
    }

    /// Byte equality of two trees.
    #[must_use]
    pub fn tree_is_identical(&self, a: Node, b: Node) -> bool {
        a == b || self.tree_bytes(a) == self.tree_bytes(b)
    }

    /// CRC-32 of a tree's bytes.
    #[must_use]
    pub fn hash_tree(&self, node: Node) -> u32 {
        crc32fast::hash(self.tree_bytes(node))
    }

    /// Whether `node` lies inside the tree rooted at `root`, `root` included.
    #[must_use]
    pub fn has_ancestor(&self, node: Node, root: Node) -> bool {
        node >= root && node < self.next_tree(root)
    }

    /// Finds the parent of `descendant` inside `root`, with the child index.
    ///
    /// Returns `None` for the root itself or a node outside the tree.
    #[must_use]
    pub fn parent_of(&self, root: Node, descendant: Node) -> Option<(Node, usize)> {
        if descendant <= root || !self.has_ancestor(descendant, root) {
            return None;
        }
        let mut parent = root;
        'descend: loop {
            for (index, child) in self.children(parent).enumerate() {
                if child == descendant {
                    return Some((parent, index));
                }
                if self.has_ancestor(descendant, child) {
                    parent = child;
                    continue 'descend;
                }
            }
            return None;
        }
    }

    /// The deepest node containing both `a` and `b`.
    #[must_use]
    pub fn common_ancestor(&self, root: Node, a: Node, b: Node) -> Option<Node> {
        if !self.has_ancestor(a, root) || !self.has_ancestor(b, root) {
            return None;
        }
        let mut ancestor = root;
        'descend: loop {
            for child in self.children(ancestor) {
                if self.has_ancestor(a, child) && self.has_ancestor(b, child) {
                    ancestor = child;
                    continue 'descend;
                }
            }
            return Some(ancestor);
        }
    }

    /// Number of nodes in a tree.
    #[must_use]
    pub fn node_count(&self, node: Node) -> usize {
        self.descendants(node).count()
    }

    /// Whether any node of the tree satisfies `predicate`.
    pub fn any_descendant(&self, node: Node, mut predicate: impl FnMut(Tag) -> bool) -> bool {
        self.descendants(node).any(|n| predicate(self.tag(n)))
    }
}

/// Iterator over the direct children of a node.
#[derive(Clone, Debug)]
pub struct Children<'a> {
    arena: &'a Arena,
    next: Node,
    remaining: usize,
}

impl Iterator for Children<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next;
        if self.remaining > 0 {
            self.next = self.arena.next_tree(current);
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Children<'_> {}

/// Preorder iterator over the nodes of a tree.
#[derive(Clone, Debug)]
pub struct Descendants<'a> {
    arena: &'a Arena,
    next: Node,
    end: Node,
}

impl Iterator for Descendants<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        if self.next >= self.end {
            return None;
        }
        let current = self.next;
        self.next = self.arena.next_node(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        let mut arena = Arena::new();
        let tree = arena.parse("(+ 1 (* 300 x) (^ y 1/3))").unwrap();
        // Add header, One, Mult header, big 300 (tag, len, 2 bytes), symbol x,
        // Power, symbol y, short rational
        assert_eq!(arena.tree_size(tree), 2 + 1 + 2 + 4 + 3 + 1 + 3 + 3);
        assert_eq!(arena.number_of_children(tree), 3);
        assert_eq!(arena.node_count(tree), 8);
    }

    #[test]
    fn test_children_iteration() {
        let mut arena = Arena::new();
        let tree = arena.parse("(f (+ a b c))").unwrap();
        let sum = arena.first_child(tree).unwrap();
        let names: Vec<String> = arena
            .children(sum)
            .map(|child| arena.display(child).to_string())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(arena.last_child(sum), arena.child(sum, 2));
    }

    #[test]
    fn test_parent_scan() {
        let mut arena = Arena::new();
        let root = arena.parse("(+ a (* b (ln c)) d)").unwrap();
        let product = arena.child(root, 1);
        let log = arena.child(product, 1);
        let c = arena.child(log, 0);
        assert_eq!(arena.parent_of(root, c), Some((log, 0)));
        assert_eq!(arena.parent_of(root, log), Some((product, 1)));
        assert_eq!(arena.parent_of(root, arena.child(root, 2)), Some((root, 2)));
        assert_eq!(arena.parent_of(root, root), None);
        let b = arena.child(product, 0);
        assert_eq!(arena.common_ancestor(root, b, c), Some(product));
        assert_eq!(arena.common_ancestor(root, c, arena.child(root, 0)), Some(root));
    }

    #[test]
    fn test_identity_and_hash() {
        let mut arena = Arena::new();
        let a = arena.parse("(* 2 x)").unwrap();
        let b = arena.parse("(* 2 x)").unwrap();
        let c = arena.parse("(* x 2)").unwrap();
        assert!(arena.tree_is_identical(a, b));
        assert!(!arena.tree_is_identical(a, c));
        assert_eq!(arena.hash_tree(a), arena.hash_tree(b));
    }
}
