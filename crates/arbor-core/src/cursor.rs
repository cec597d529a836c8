//! Self-relocating cursors.
//!
//! Every cursor is an id into one relocation table owned by the arena.
//! The arena's splice primitives rewrite the table after each edit, so this
//! is the only place offset-shifting happens.

use std::fmt;

use crate::handle::Node;

/// A reference to a logical node that survives edits elsewhere in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor(u16);

impl Cursor {
    /// Returns the slot of this cursor in the relocation table.
    #[must_use]
    pub const fn id(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cursor({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Free,
    Tracking(usize),
    Invalidated,
}

/// Offsets of every live cursor.
#[derive(Clone, Debug, Default)]
pub(crate) struct ReferenceTable {
    slots: Vec<Slot>,
}

impl ReferenceTable {
    /// Stores an offset, reusing the first free slot.
    ///
    /// Returns `None` once every id is in use.
    pub(crate) fn store(&mut self, offset: usize) -> Option<Cursor> {
        let index = match self.slots.iter().position(|slot| *slot == Slot::Free) {
            Some(index) => {
                self.slots[index] = Slot::Tracking(offset);
                index
            }
            None => {
                self.slots.push(Slot::Tracking(offset));
                self.slots.len() - 1
            }
        };
        match u16::try_from(index) {
            Ok(id) => Some(Cursor(id)),
            Err(_) => {
                self.slots[index] = Slot::Free;
                None
            }
        }
    }

    pub(crate) fn get(&self, cursor: Cursor) -> Option<Node> {
        match self.slots.get(usize::from(cursor.0)) {
            Some(Slot::Tracking(offset)) => Some(Node::at(*offset)),
            _ => None,
        }
    }

    pub(crate) fn set(&mut self, cursor: Cursor, offset: usize) {
        if let Some(slot) = self.slots.get_mut(usize::from(cursor.0)) {
            *slot = Slot::Tracking(offset);
        }
    }

    pub(crate) fn release(&mut self, cursor: Cursor) {
        if let Some(slot) = self.slots.get_mut(usize::from(cursor.0)) {
            *slot = Slot::Free;
        }
        while self.slots.last() == Some(&Slot::Free) {
            self.slots.pop();
        }
    }

    /// Cursors currently sitting exactly on `offset`.
    pub(crate) fn at_offset(&self, offset: usize) -> Vec<Cursor> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| **slot == Slot::Tracking(offset))
            .filter_map(|(index, _)| u16::try_from(index).ok().map(Cursor))
            .collect()
    }

    /// Rewrites every tracked offset; `None` invalidates the cursor.
    pub(crate) fn relocate(&mut self, mut map: impl FnMut(usize) -> Option<usize>) {
        for slot in &mut self.slots {
            if let Slot::Tracking(offset) = *slot {
                *slot = map(offset).map_or(Slot::Invalidated, Slot::Tracking);
            }
        }
    }

    pub(crate) fn live(&self) -> usize {
        self.slots.iter().filter(|slot| **slot != Slot::Free).count()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_reused() {
        let mut table = ReferenceTable::default();
        let a = table.store(4).unwrap();
        let b = table.store(9).unwrap();
        table.release(a);
        let c = table.store(1).unwrap();
        assert_eq!(a.id(), c.id());
        assert_eq!(table.get(b), Some(Node::new(9)));
        assert_eq!(table.live(), 2);
    }

    #[test]
    fn test_relocate_invalidates() {
        let mut table = ReferenceTable::default();
        let a = table.store(4).unwrap();
        let b = table.store(10).unwrap();
        table.relocate(|offset| (offset > 5).then(|| offset - 2));
        assert_eq!(table.get(a), None);
        assert_eq!(table.get(b), Some(Node::new(8)));
    }
}
