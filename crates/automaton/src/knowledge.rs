//! The automaton's private memory of the level layout.
//!
//! Unlit floor never gets the host's "remembered" flag, so without its own
//! memory the automaton would forget every dark room it walked through.
//! The mask records every cell that was ever seen while the automaton was
//! active and is only discarded on deactivation.
use crate::grid::{Cell, Dimensions};
use crate::world::{CellFlags, WorldView};

#[derive(Clone, Debug)]
pub struct KnowledgeMask {
    dimensions: Dimensions,
    cells: Vec<bool>,
}

impl KnowledgeMask {
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            cells: vec![false; dimensions.area()],
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Whether the mask itself has recorded `cell`.
    pub fn contains(&self, cell: Cell) -> bool {
        self.dimensions
            .index(cell)
            .is_some_and(|index| self.cells[index])
    }

    /// Known = remembered by the host or recorded by the mask.
    pub fn is_known<W: WorldView + ?Sized>(&self, world: &W, cell: Cell) -> bool {
        world.flags(cell).contains(CellFlags::MARKED) || self.contains(cell)
    }

    pub fn mark(&mut self, cell: Cell) {
        if let Some(index) = self.dimensions.index(cell) {
            self.cells[index] = true;
        }
    }

    /// Records every currently seen interior cell plus the player's own
    /// cell, which the host never flags as seen.
    pub fn merge_visible<W: WorldView + ?Sized>(&mut self, world: &W) {
        if world.dimensions() != self.dimensions {
            tracing::debug!(
                old = ?self.dimensions,
                new = ?world.dimensions(),
                "level dimensions changed, resetting knowledge mask"
            );
            *self = Self::new(world.dimensions());
        }

        let mut added = 0usize;
        for cell in self.dimensions.interior() {
            if world.flags(cell).contains(CellFlags::SEEN) && !self.contains(cell) {
                self.mark(cell);
                added += 1;
            }
        }
        self.mark(world.player().position);

        tracing::trace!(added, "merged visible cells into knowledge mask");
    }

    /// Marks the 8 cells around `center` as known.
    pub fn mark_neighbors(&mut self, center: Cell) {
        for cell in center.neighbors() {
            self.mark(cell);
        }
    }

    pub fn known_count(&self) -> usize {
        self.cells.iter().filter(|known| **known).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_outside_the_level_are_ignored() {
        let mut mask = KnowledgeMask::new(Dimensions::new(3, 3));
        mask.mark(Cell::new(-1, 0));
        mask.mark(Cell::new(3, 3));
        assert_eq!(mask.known_count(), 0);
        assert!(!mask.contains(Cell::new(-1, 0)));
    }

    #[test]
    fn neighbours_clip_at_the_border() {
        let mut mask = KnowledgeMask::new(Dimensions::new(3, 3));
        mask.mark_neighbors(Cell::new(0, 0));
        assert_eq!(mask.known_count(), 3);
        assert!(!mask.contains(Cell::new(0, 0)));
    }
}
