//! Kernel errors.
//!
//! These are control flow, not user-facing diagnostics: recoverable kinds
//! unwind to a [`crate::checkpoint`] which retries under a relaxed strategy.

use thiserror::Error;

use crate::tag::Tag;

/// Errors raised while building or rewriting trees.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The arena would grow past its capacity.
    #[error("arena exhausted: {requested} bytes needed, capacity is {capacity}")]
    ArenaExhausted {
        /// Total length the edit required.
        requested: usize,
        /// The arena's capacity.
        capacity: usize,
    },

    /// A variable-arity node would exceed 255 children.
    #[error("{0:?} node cannot hold more than 255 children")]
    ArityOverflow(Tag),

    /// A payload does not fit its length prefix.
    #[error("{0:?} payload exceeds 255 bytes")]
    PayloadOverflow(Tag),

    /// An operation is not supported in exact form.
    #[error("{0:?} cannot be handled exactly")]
    Unhandled(Tag),

    /// Exactness guarantees must be relaxed to go on.
    #[error("exact computation must be relaxed")]
    RelaxContext,

    /// A recursive pass went deeper than its limit.
    #[error("recursion depth limit {limit} exceeded")]
    DepthExceeded {
        /// The enforced limit.
        limit: usize,
    },

    /// No relocation slot is left for a new cursor.
    #[error("too many live cursors")]
    CursorsExhausted,

    /// A rewrite template uses a placeholder its pattern did not bind.
    #[error("template uses a placeholder the pattern does not bind")]
    UnboundPlaceholder,
}

impl Error {
    /// Whether retrying under a relaxed strategy can succeed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Unhandled(_) | Error::RelaxContext)
    }
}

/// Result alias for kernel operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_kinds() {
        assert!(Error::RelaxContext.is_recoverable());
        assert!(Error::Unhandled(Tag::Float).is_recoverable());
        assert!(!Error::DepthExceeded { limit: 3 }.is_recoverable());
        assert!(!Error::UnboundPlaceholder.is_recoverable());
        assert!(!Error::ArenaExhausted {
            requested: 10,
            capacity: 8
        }
        .is_recoverable());
    }

    #[test]
    fn test_messages() {
        let err = Error::ArenaExhausted {
            requested: 10,
            capacity: 8,
        };
        assert_eq!(
            err.to_string(),
            "arena exhausted: 10 bytes needed, capacity is 8"
        );
    }
}
