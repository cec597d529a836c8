//! Recovery points.
//!
//! A checkpoint remembers the arena length. Work done under it must only
//! append past that length (build a copy, edit the copy), so rolling back
//! is a truncation. Recoverable errors retry the work once the caller has
//! relaxed its context.

use tracing::debug;

use crate::arena::Arena;
use crate::error::{Error, Result};

/// Runs `action` under a checkpoint, retrying recoverable failures.
///
/// After each failure the arena is truncated back to its length on entry.
/// If the error [`is_recoverable`](Error::is_recoverable) and
/// `relax(context, &err)` returns `true`, the action runs again with the
/// relaxed context; otherwise the error is returned.
///
/// # Errors
///
/// Returns the first error that cannot be recovered from.
pub fn execute<C, T>(
    arena: &mut Arena,
    context: &mut C,
    mut action: impl FnMut(&mut Arena, &C) -> Result<T>,
    mut relax: impl FnMut(&mut C, &Error) -> bool,
) -> Result<T> {
    let checkpoint = arena.len();
    loop {
        match action(arena, context) {
            Ok(value) => return Ok(value),
            Err(err) => {
                arena.truncate(checkpoint);
                if !err.is_recoverable() || !relax(context, &err) {
                    debug!(%err, "checkpoint gave up");
                    return Err(err);
                }
                debug!(%err, "retrying from checkpoint with a relaxed context");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tag;

    #[test]
    fn test_retry_after_relax() {
        let mut arena = Arena::new();
        let input = arena.parse("(+ x 1)").unwrap();
        let before = arena.tree_bytes(input).to_vec();
        let mut exact = true;
        let mut attempts = 0;
        let result = execute(
            &mut arena,
            &mut exact,
            |arena, exact| {
                attempts += 1;
                arena.clone_tree(input)?;
                if *exact {
                    Err(Error::RelaxContext)
                } else {
                    Ok(arena.len())
                }
            },
            |exact, _| std::mem::replace(exact, false),
        );
        assert_eq!(result, Ok(2 * before.len()));
        assert_eq!(attempts, 2);
        assert_eq!(arena.tree_bytes(input), before.as_slice());
    }

    #[test]
    fn test_unrecoverable_restores_arena() {
        let mut arena = Arena::with_capacity(16);
        let input = arena.parse("(* 3 y)").unwrap();
        let len = arena.len();
        let result: Result<()> = execute(
            &mut arena,
            &mut (),
            |arena, ()| {
                arena.clone_tree(input)?;
                arena.clone_tree(input)?;
                Ok(())
            },
            |(), _| true,
        );
        assert!(matches!(result, Err(Error::ArenaExhausted { .. })));
        assert_eq!(arena.len(), len);
        assert_eq!(arena.tag(input), Tag::Multiplication);
    }
}
