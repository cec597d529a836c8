//! Metrics for ranking equivalent trees.
//!
//! The simplification search keeps the rewrite path whose result has the
//! smallest metric. Lower is simpler.

use arbor_core::{Arena, Node, Tag};

/// Scores a tree; lower is simpler.
pub trait Metric {
    /// Measures the tree at `node`.
    fn measure(&self, arena: &Arena, node: Node) -> u32;
}

/// Counts nodes. This is the default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NodeCountMetric;

impl Metric for NodeCountMetric {
    fn measure(&self, arena: &Arena, node: Node) -> u32 {
        u32::try_from(arena.node_count(node)).unwrap_or(u32::MAX)
    }
}

/// Counts encoded bytes, so large numbers weigh more.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeSizeMetric;

impl Metric for TreeSizeMetric {
    fn measure(&self, arena: &Arena, node: Node) -> u32 {
        u32::try_from(arena.tree_size(node)).unwrap_or(u32::MAX)
    }
}

/// Weighs nodes by kind.
#[derive(Clone, Copy, Debug)]
pub struct WeightedMetric {
    /// Cost of a transcendental function node.
    pub transcendental: u32,
    /// Cost of a power node.
    pub power: u32,
}

impl Default for WeightedMetric {
    fn default() -> Self {
        Self {
            transcendental: 5,
            power: 3,
        }
    }
}

impl Metric for WeightedMetric {
    fn measure(&self, arena: &Arena, node: Node) -> u32 {
        arena
            .descendants(node)
            .map(|descendant| match arena.tag(descendant) {
                // Numbers are free
                tag if tag.is_number() && tag != Tag::Constant => 0,
                Tag::Power => self.power,
                Tag::Trig | Tag::Exponential | Tag::Ln | Tag::Abs => self.transcendental,
                Tag::Addition | Tag::Multiplication => 2,
                _ => 1,
            })
            .sum()
    }
}

/// The metrics available by name in configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MetricKind {
    /// [`NodeCountMetric`].
    #[default]
    NodeCount,
    /// [`TreeSizeMetric`].
    TreeSize,
    /// [`WeightedMetric`] with default weights.
    Weighted,
}

impl Metric for MetricKind {
    fn measure(&self, arena: &Arena, node: Node) -> u32 {
        match self {
            MetricKind::NodeCount => NodeCountMetric.measure(arena, node),
            MetricKind::TreeSize => TreeSizeMetric.measure(arena, node),
            MetricKind::Weighted => WeightedMetric::default().measure(arena, node),
        }
    }
}
