//! The main simplification engine.
//!
//! [`Simplifier`] runs the whole pipeline on a copy of the input under a
//! checkpoint: projection, systematic reduction, the advanced search and
//! beautification. Only a finished copy is moved over the input, so a
//! failure leaves the arena as it was.

use arbor_core::{checkpoint, Arena, Error, Node, ParseError, Result, DEFAULT_CAPACITY};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::advanced::{search, SearchConfig, SearchReport};
use crate::beautification::deep_beautify;
use crate::metric::Metric;
use crate::projection::{deep_project, ProjectionContext, Strategy};
use crate::systematic::deep_reduce;

/// Configuration for the simplification engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimplifierConfig {
    /// Strategy of the first attempt.
    pub strategy: Strategy,
    /// Whether to run the advanced search after systematic reduction.
    pub advanced_reduction: bool,
    /// Limits of the advanced search.
    pub search: SearchConfig,
    /// Capacity of arenas created by [`Simplifier::simplify_str`].
    pub arena_capacity: usize,
}

impl Default for SimplifierConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Default,
            advanced_reduction: true,
            search: SearchConfig::default(),
            arena_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Errors from [`Simplifier::simplify_str`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimplifyError {
    /// The input is not a valid expression.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// Simplification failed.
    #[error(transparent)]
    Kernel(#[from] Error),
}

/// Statistics about the simplification process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimplificationStats {
    /// Whether the input was rewritten.
    pub changed: bool,
    /// Attempts restarted under a relaxed strategy.
    pub retries: usize,
    /// States evaluated by the advanced search.
    pub explored_states: usize,
    /// Metric after systematic reduction.
    pub metric_before: u32,
    /// Metric after the advanced search.
    pub metric_after: u32,
    /// Strategy of the attempt that succeeded.
    pub strategy: Strategy,
}

/// The main simplification engine.
#[derive(Clone, Debug, Default)]
pub struct Simplifier {
    config: SimplifierConfig,
}

impl Simplifier {
    /// Creates a simplifier with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simplifier with a custom configuration.
    #[must_use]
    pub fn with_config(config: SimplifierConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &SimplifierConfig {
        &self.config
    }

    /// Simplifies an expression given as an s-expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression cannot be parsed or simplified.
    pub fn simplify_str(&self, text: &str) -> Result<String, SimplifyError> {
        let mut arena = Arena::with_capacity(self.config.arena_capacity);
        let node = arena.parse(text)?;
        self.simplify(&mut arena, node)?;
        Ok(arena.display(node).to_string())
    }

    /// Simplifies the tree at `node` in place.
    ///
    /// # Errors
    ///
    /// Returns the first error no relaxed strategy recovers from. The arena
    /// is left unchanged in that case.
    pub fn simplify(&self, arena: &mut Arena, node: Node) -> Result<bool> {
        Ok(self.simplify_with_stats(arena, node)?.changed)
    }

    /// Simplifies in place and returns statistics.
    ///
    /// # Errors
    ///
    /// See [`Simplifier::simplify`].
    #[instrument(level = "debug", skip_all, fields(input = %arena.display(node)))]
    pub fn simplify_with_stats(
        &self,
        arena: &mut Arena,
        node: Node,
    ) -> Result<SimplificationStats> {
        let mut context = ProjectionContext {
            strategy: self.config.strategy,
        };
        let mut retries = 0;
        let (result, metric_before, report) = checkpoint::execute(
            arena,
            &mut context,
            |arena, context| self.run(arena, node, *context),
            |context, _| {
                retries += 1;
                relax(context)
            },
        )?;
        let changed = !arena.tree_is_identical(node, result);
        arena.move_tree_over_tree(node, result);
        debug!(output = %arena.display(node), retries, "simplified");
        Ok(SimplificationStats {
            changed,
            retries,
            explored_states: report.explored_states,
            metric_before,
            metric_after: report.final_metric,
            strategy: context.strategy,
        })
    }

    fn run(
        &self,
        arena: &mut Arena,
        node: Node,
        context: ProjectionContext,
    ) -> Result<(Node, u32, SearchReport)> {
        let copy = arena.clone_tree(node)?;
        deep_project(arena, copy, context)?;
        deep_reduce(arena, copy)?;
        let metric = &self.config.search.metric;
        let metric_before = metric.measure(arena, copy);
        let report = if self.config.advanced_reduction {
            search(arena, copy, &self.config.search, metric)?
        } else {
            SearchReport {
                initial_metric: metric_before,
                final_metric: metric_before,
                ..SearchReport::default()
            }
        };
        deep_beautify(arena, copy)?;
        Ok((copy, metric_before, report))
    }
}

fn relax(context: &mut ProjectionContext) -> bool {
    match context.strategy {
        Strategy::Default => {
            context.strategy = Strategy::ApproximateToFloat;
            true
        }
        Strategy::ApproximateToFloat => false,
    }
}
