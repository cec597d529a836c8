//! Bounded search over contractions and expansions.
//!
//! Systematic reduction only rewrites when the result is always better.
//! Identities such as `sin(x)^2 + cos(x)^2 = 1` need a detour through
//! rewrites that are not, so this pass explores sequences of moves
//! (step to the next node, contract it, expand it) on a scratch copy and
//! replays the sequence with the lowest metric on the real tree.
//!
//! The search is bounded by the path length, a table of already visited
//! states and the arena capacity; running out of any of them ends the
//! search with the best result found so far.

use std::fmt;

use arbor_core::{Arena, Error, Node, Result};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::metric::{Metric, MetricKind};
use crate::rules;
use crate::systematic::{deep_reduce, shallow_reduce};

/// Longest path the search keeps by default.
pub const MAX_PATH_LENGTH: usize = 12;

/// Visited states remembered by default.
pub const DEFAULT_MEMO_CAPACITY: usize = 128;

/// Limits of the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum number of path entries.
    pub max_path_length: usize,
    /// Maximum number of remembered states.
    pub memo_capacity: usize,
    /// What "simpler" means.
    pub metric: MetricKind,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_path_length: MAX_PATH_LENGTH,
            memo_capacity: DEFAULT_MEMO_CAPACITY,
            metric: MetricKind::default(),
        }
    }
}

/// One move of the search, packed in a byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction(u8);

impl Direction {
    /// Contract the current node.
    pub const CONTRACT: Self = Self(0);
    /// Expand the current node.
    pub const EXPAND: Self = Self(u8::MAX);
    const MAX_STEPS: u8 = u8::MAX - 1;

    /// Step `steps` nodes forward in preorder.
    ///
    /// # Panics
    ///
    /// Panics in debug builds unless `1 <= steps <= 254`.
    #[must_use]
    pub fn next_node(steps: u8) -> Self {
        debug_assert!((1..=Self::MAX_STEPS).contains(&steps));
        Self(steps)
    }

    /// Whether this is [`Direction::CONTRACT`].
    #[must_use]
    pub fn is_contract(self) -> bool {
        self == Self::CONTRACT
    }

    /// Whether this is [`Direction::EXPAND`].
    #[must_use]
    pub fn is_expand(self) -> bool {
        self == Self::EXPAND
    }

    /// Whether this is a run of next-node steps.
    #[must_use]
    pub fn is_next_node(self) -> bool {
        !self.is_contract() && !self.is_expand()
    }
}

impl fmt::Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::CONTRACT => write!(f, "Contract"),
            Self::EXPAND => write!(f, "Expand"),
            Self(steps) => write!(f, "NextNode({steps})"),
        }
    }
}

/// A sequence of moves from the root. Consecutive next-node steps share an
/// entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    directions: SmallVec<[Direction; MAX_PATH_LENGTH]>,
    capacity: usize,
}

impl Default for Path {
    fn default() -> Self {
        Self::new(MAX_PATH_LENGTH)
    }
}

impl Path {
    /// An empty path holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            directions: SmallVec::new(),
            capacity,
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    /// Whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    /// The entries.
    #[must_use]
    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// Appends a move, merging next-node runs. Returns `false` when the
    /// path is full.
    pub fn append(&mut self, direction: Direction) -> bool {
        if let Some(last) = self.directions.last_mut() {
            if last.is_next_node()
                && direction.is_next_node()
                && u16::from(last.0) + u16::from(direction.0) <= u16::from(Direction::MAX_STEPS)
            {
                last.0 += direction.0;
                return true;
            }
        }
        if self.directions.len() >= self.capacity {
            return false;
        }
        self.directions.push(direction);
        true
    }

    /// Removes the last single move.
    pub fn pop(&mut self) -> Option<Direction> {
        let last = self.directions.last_mut()?;
        if last.is_next_node() && last.0 > 1 {
            last.0 -= 1;
            return Some(Direction::next_node(1));
        }
        self.directions.pop()
    }

    fn trim_trailing_moves(&mut self) {
        while self.directions.last().is_some_and(|d| d.is_next_node()) {
            self.directions.pop();
        }
    }

    /// Replays the path on the tree at `root`. Returns whether it rewrote
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns an error if a rewrite or reduction fails.
    pub fn apply(&self, arena: &mut Arena, root: Node) -> Result<bool> {
        let mut current = root;
        let mut changed = false;
        for &direction in &self.directions {
            match step(arena, root, &mut current, direction)? {
                Step::Rewrote => changed = true,
                Step::Moved => {}
                Step::Blocked => {
                    debug!(?direction, "path no longer applies");
                    break;
                }
            }
        }
        Ok(changed)
    }
}

/// Remembers visited states by tree hash, with the shortest path length
/// each was reached at.
#[derive(Clone, Debug)]
pub struct MemoTable {
    entries: Vec<(u32, usize)>,
    capacity: usize,
}

impl MemoTable {
    /// An empty table holding at most `capacity` states.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of remembered states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no state is remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether new states are no longer recorded.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Records reaching a state at `depth`. Returns `false` if it was
    /// already reached at a depth no greater, in which case it need not be
    /// explored again. Once full, unknown states are explored untracked.
    pub fn visit(&mut self, hash: u32, depth: usize) -> bool {
        match self.entries.binary_search_by_key(&hash, |&(h, _)| h) {
            Ok(index) => {
                let known = &mut self.entries[index].1;
                if *known <= depth {
                    return false;
                }
                *known = depth;
                true
            }
            Err(index) => {
                if self.is_full() {
                    trace!(hash, "memo table full");
                } else {
                    self.entries.insert(index, (hash, depth));
                }
                true
            }
        }
    }

    /// Marks a state whose whole subtree was explored; it is never
    /// explored again.
    pub fn mark_exhausted(&mut self, hash: u32) {
        if let Ok(index) = self.entries.binary_search_by_key(&hash, |&(h, _)| h) {
            self.entries[index].1 = 0;
        }
    }
}

/// Outcome of [`search`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchReport {
    /// Whether the tree was rewritten.
    pub changed: bool,
    /// Leaf states evaluated.
    pub explored_states: usize,
    /// Metric of the input.
    pub initial_metric: u32,
    /// Metric of the result.
    pub final_metric: u32,
}

/// Rewrites `node` into the simplest form the search finds.
///
/// # Errors
///
/// Returns errors raised by reductions other than arena exhaustion, which
/// only ends the search early.
pub fn advanced_reduce(arena: &mut Arena, node: Node, config: &SearchConfig) -> Result<bool> {
    Ok(search(arena, node, config, &config.metric)?.changed)
}

/// [`advanced_reduce`] with an arbitrary metric and a report.
///
/// # Errors
///
/// Returns errors raised by reductions other than arena exhaustion, which
/// only ends the search early.
pub fn search<M: Metric>(
    arena: &mut Arena,
    node: Node,
    config: &SearchConfig,
    metric: &M,
) -> Result<SearchReport> {
    let checkpoint = arena.len();
    let mut state = Search::new(arena, node, config, metric);
    let initial_metric = state.best_metric;
    let outcome = state.run(arena);
    arena.truncate(checkpoint);
    match outcome {
        Ok(_) => {}
        Err(Error::ArenaExhausted { requested, capacity }) => {
            warn!(requested, capacity, "search ran out of arena, keeping best path so far");
        }
        Err(err) => return Err(err),
    }
    let changed = !state.best_path.is_empty() && state.best_path.apply(arena, node)?;
    debug!(
        initial_metric,
        final_metric = state.best_metric,
        explored = state.explored,
        path = ?state.best_path.directions(),
        "advanced reduction finished"
    );
    Ok(SearchReport {
        changed,
        explored_states: state.explored,
        initial_metric,
        final_metric: state.best_metric,
    })
}

enum Step {
    Blocked,
    Moved,
    Rewrote,
}

fn step(arena: &mut Arena, root: Node, current: &mut Node, direction: Direction) -> Result<Step> {
    if direction.is_next_node() {
        let end = arena.next_tree(root);
        let mut node = *current;
        for _ in 0..direction.0 {
            node = arena.next_node(node);
            if node >= end {
                return Ok(Step::Blocked);
            }
        }
        *current = node;
        return Ok(Step::Moved);
    }
    let rewrote = if direction.is_contract() {
        rules::shallow_contract(arena, *current)?
    } else {
        rules::shallow_expand(arena, *current)?
    };
    if !rewrote {
        return Ok(Step::Blocked);
    }
    upward_reduce(arena, root, *current)?;
    *current = root;
    Ok(Step::Rewrote)
}

/// Deep-reduces `target`, then shallow-reduces each of its ancestors up to
/// `root`.
fn upward_reduce(arena: &mut Arena, root: Node, target: Node) -> Result<()> {
    if root == target {
        deep_reduce(arena, root)?;
        return Ok(());
    }
    let mut child = arena.next_node(root);
    for _ in 0..arena.number_of_children(root) {
        if arena.has_ancestor(target, child) {
            upward_reduce(arena, child, target)?;
            shallow_reduce(arena, root)?;
            return Ok(());
        }
        child = arena.next_tree(child);
    }
    Ok(())
}

struct Search<'m, M> {
    metric: &'m M,
    original: Node,
    /// Scratch copy; always the last tree of the arena.
    root: Node,
    path: Path,
    best_path: Path,
    best_metric: u32,
    memo: MemoTable,
    /// The scratch tree no longer matches `path`.
    dirty: bool,
    explored: usize,
}

impl<'m, M: Metric> Search<'m, M> {
    fn new(arena: &Arena, node: Node, config: &SearchConfig, metric: &'m M) -> Self {
        Self {
            metric,
            original: node,
            root: node,
            path: Path::new(config.max_path_length),
            best_path: Path::new(config.max_path_length),
            best_metric: metric.measure(arena, node),
            memo: MemoTable::with_capacity(config.memo_capacity),
            dirty: false,
            explored: 0,
        }
    }

    /// Explores from a scratch copy of the original. The input state is
    /// recorded at depth 0 first, so no detour leads back into it.
    fn run(&mut self, arena: &mut Arena) -> Result<bool> {
        self.root = arena.clone_tree(self.original)?;
        self.memo.visit(arena.hash_tree(self.root), 0);
        self.explore(arena, self.root)
    }

    /// Explores every extension of the current path from `current`.
    /// Returns whether the path length cut some branch short.
    fn explore(&mut self, arena: &mut Arena, current: Node) -> Result<bool> {
        let mut is_leaf = true;
        let mut truncated = false;
        for direction in [Direction::next_node(1), Direction::CONTRACT, Direction::EXPAND] {
            if self.dirty {
                self.reset(arena)?;
            }
            let mut target = current;
            let hash = match step(arena, self.root, &mut target, direction)? {
                Step::Blocked => continue,
                Step::Moved => None,
                Step::Rewrote => Some(arena.hash_tree(self.root)),
            };
            let rewrote = hash.is_some();
            if let Some(hash) = hash {
                if !self.memo.visit(hash, self.path.len()) {
                    self.dirty = true;
                    continue;
                }
            }
            if !self.path.append(direction) {
                self.dirty |= rewrote;
                truncated = true;
                continue;
            }
            is_leaf = false;
            let cut = self.explore(arena, target)?;
            self.path.pop();
            // the scratch tree still holds this move, the path no longer does
            self.dirty |= rewrote;
            truncated |= cut;
            if let (Some(hash), false) = (hash, cut) {
                self.memo.mark_exhausted(hash);
            }
        }
        if is_leaf {
            self.evaluate(arena);
        }
        Ok(truncated)
    }

    fn reset(&mut self, arena: &mut Arena) -> Result<()> {
        self.root = arena.clone_tree_over_tree(self.root, self.original)?;
        self.path.apply(arena, self.root)?;
        self.dirty = false;
        Ok(())
    }

    fn evaluate(&mut self, arena: &Arena) {
        self.explored += 1;
        let metric = self.metric.measure(arena, self.root);
        if metric < self.best_metric {
            trace!(metric, path = ?self.path.directions(), "simpler tree found");
            self.best_metric = metric;
            self.best_path = self.path.clone();
            self.best_path.trim_trailing_moves();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduced(arena: &mut Arena, text: &str) -> Node {
        let node = arena.parse(text).unwrap();
        deep_reduce(arena, node).unwrap();
        node
    }

    #[test]
    fn test_pythagoras_needs_search() {
        let mut arena = Arena::new();
        let node = reduced(&mut arena, "(+ (^ (trig x 0) 2) (^ (trig x 1) 2))");
        assert_eq!(
            arena.display(node).to_string(),
            "(+ (^ (trig x 0) 2) (^ (trig x 1) 2))"
        );
        assert!(advanced_reduce(&mut arena, node, &SearchConfig::default()).unwrap());
        assert_eq!(arena.display(node).to_string(), "1");
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_contraction_lowers_metric() {
        let mut arena = Arena::new();
        let node = reduced(&mut arena, "(* (exp x) (exp y))");
        let report =
            search(&mut arena, node, &SearchConfig::default(), &MetricKind::NodeCount).unwrap();
        assert!(report.changed);
        assert_eq!(report.initial_metric, 5);
        assert_eq!(report.final_metric, 4);
        assert_eq!(arena.display(node).to_string(), "(exp (+ x y))");
    }

    #[test]
    fn test_nothing_to_gain() {
        let mut arena = Arena::new();
        let node = reduced(&mut arena, "(+ x y)");
        let before = arena.tree_bytes(node).to_vec();
        assert!(!advanced_reduce(&mut arena, node, &SearchConfig::default()).unwrap());
        assert_eq!(arena.tree_bytes(node), &before[..]);
    }

    #[test]
    fn test_short_path_still_valid() {
        let mut arena = Arena::new();
        let text = "(* (+ a b) (+ c d) (+ e f) (^ (+ g h) 3))";
        let node = reduced(&mut arena, text);
        let initial = arena.node_count(node);
        let config = SearchConfig {
            max_path_length: 2,
            memo_capacity: 4,
            ..SearchConfig::default()
        };
        advanced_reduce(&mut arena, node, &config).unwrap();
        assert!(arena.node_count(node) <= initial);
        let printed = arena.display(node).to_string();
        let mut fresh = Arena::new();
        let reparsed = fresh.parse(&printed).unwrap();
        assert_eq!(fresh.tree_bytes(reparsed), arena.tree_bytes(node));
    }

    #[test]
    fn test_small_arena_ends_search_early() {
        let mut arena = Arena::with_capacity(96);
        let node = reduced(&mut arena, "(+ (* a (+ b c)) (* a (+ d e)))");
        let initial = arena.node_count(node);
        advanced_reduce(&mut arena, node, &SearchConfig::default()).unwrap();
        assert!(arena.node_count(node) <= initial);
    }

    #[test]
    fn test_input_state_is_remembered_first() {
        let mut arena = Arena::new();
        let node = reduced(&mut arena, "(ln (* x y))");
        let input = arena.hash_tree(node);
        let config = SearchConfig {
            memo_capacity: 1,
            ..SearchConfig::default()
        };
        let metric = MetricKind::default();
        let mut state = Search::new(&arena, node, &config, &metric);
        state.run(&mut arena).unwrap();
        assert_eq!(state.memo.entries, vec![(input, 0)]);
        assert!(!state.memo.visit(input, 1));
    }

    #[test]
    fn test_search_is_deterministic() {
        let run = || {
            let mut arena = Arena::new();
            let node = reduced(&mut arena, "(+ (ln x) (ln y) (* (exp a) (exp b)))");
            let config = SearchConfig::default();
            let report = search(&mut arena, node, &config, &MetricKind::NodeCount).unwrap();
            (arena.tree_bytes(node).to_vec(), report)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_path_merges_moves() {
        let mut path = Path::new(2);
        assert!(path.append(Direction::next_node(1)));
        assert!(path.append(Direction::next_node(1)));
        assert_eq!(path.directions(), &[Direction::next_node(2)]);
        assert!(path.append(Direction::CONTRACT));
        assert!(!path.append(Direction::EXPAND));
        assert!(!path.append(Direction::next_node(1)));
        assert_eq!(path.pop(), Some(Direction::CONTRACT));
        assert_eq!(path.pop(), Some(Direction::next_node(1)));
        assert_eq!(path.directions(), &[Direction::next_node(1)]);
    }

    #[test]
    fn test_memo_table() {
        let mut memo = MemoTable::with_capacity(2);
        assert!(memo.visit(7, 3));
        assert!(!memo.visit(7, 3));
        assert!(!memo.visit(7, 5));
        assert!(memo.visit(7, 1));
        memo.mark_exhausted(7);
        assert!(!memo.visit(7, 0));
        assert!(memo.visit(1, 4));
        assert!(memo.is_full());
        // untracked once full
        assert!(memo.visit(9, 0));
        assert!(memo.visit(9, 0));
        assert_eq!(memo.len(), 2);
    }
}
