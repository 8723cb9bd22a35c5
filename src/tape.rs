//! The machine's memory: a fixed ring of byte cells and a data pointer.

/// Default number of cells when nothing else is configured.
pub const DEFAULT_TAPE_SIZE: usize = 10_000;

/// A fixed-capacity byte tape with a wrapping data pointer.
///
/// Both the pointer and the cell values wrap around; no operation on a
/// `Tape` can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Box<[u8]>,
    pointer: usize,
}

impl Tape {
    /// Create a zeroed tape with `capacity` cells.
    ///
    /// A zero capacity is bumped to a single cell so the pointer always has
    /// somewhere to point. [`VmConfig`](crate::VmConfig) rejects zero before
    /// it gets this far.
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![0; capacity.max(1)].into_boxed_slice(),
            pointer: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Move the pointer one cell right, wrapping from the last cell to 0.
    pub fn advance(&mut self) {
        self.pointer += 1;
        if self.pointer >= self.cells.len() {
            self.pointer = 0;
        }
    }

    /// Move the pointer one cell left, wrapping from 0 to the last cell.
    pub fn retreat(&mut self) {
        // Check before subtracting; a post-decrement `< 0` test can never fire on usize.
        if self.pointer == 0 {
            self.pointer = self.cells.len() - 1;
        } else {
            self.pointer -= 1;
        }
    }

    pub fn increment_cell(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_add(1);
    }

    pub fn decrement_cell(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_sub(1);
    }

    pub fn read_cell(&self) -> u8 {
        self.cells[self.pointer]
    }

    pub fn write_cell(&mut self, value: u8) {
        self.cells[self.pointer] = value;
    }

    /// Value at an absolute index, `None` when the index is off the tape.
    pub fn get(&self, index: usize) -> Option<u8> {
        self.cells.get(index).copied()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(DEFAULT_TAPE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_from_last_cell_wraps_to_zero() {
        let mut tape = Tape::new(3);
        tape.advance();
        tape.advance();
        assert_eq!(tape.pointer(), 2);
        tape.advance();
        assert_eq!(tape.pointer(), 0);
    }

    #[test]
    fn retreat_from_zero_wraps_to_last_cell() {
        let mut tape = Tape::new(10);
        tape.retreat();
        assert_eq!(tape.pointer(), 9);
    }

    #[test]
    fn single_cell_tape_stays_put() {
        let mut tape = Tape::new(1);
        tape.advance();
        assert_eq!(tape.pointer(), 0);
        tape.retreat();
        assert_eq!(tape.pointer(), 0);
    }

    #[test]
    fn zero_capacity_still_has_one_cell() {
        let tape = Tape::new(0);
        assert_eq!(tape.capacity(), 1);
    }

    #[test]
    fn wrapping_subtraction() {
        let mut tape = Tape::new(1);
        tape.decrement_cell();
        assert_eq!(tape.read_cell(), 255);
    }

    #[test]
    fn wrapping_addition() {
        let mut tape = Tape::new(1);
        tape.write_cell(255);
        tape.increment_cell();
        assert_eq!(tape.read_cell(), 0);
    }

    #[test]
    fn cells_are_independent() {
        let mut tape = Tape::new(4);
        tape.write_cell(7);
        tape.advance();
        tape.increment_cell();
        assert_eq!(tape.cells(), &[7, 1, 0, 0]);
        assert_eq!(tape.get(4), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn pointer_never_leaves_tape(
            capacity in 1usize..64,
            moves in prop::collection::vec(any::<bool>(), 0..512)
        ) {
            let mut tape = Tape::new(capacity);
            for right in moves {
                if right { tape.advance() } else { tape.retreat() }
                prop_assert!(tape.pointer() < capacity);
            }
        }

        #[test]
        fn moves_are_modular(capacity in 1usize..64, rights in 0usize..300, lefts in 0usize..300) {
            let mut tape = Tape::new(capacity);
            for _ in 0..rights { tape.advance(); }
            for _ in 0..lefts { tape.retreat(); }
            let expected = (rights as isize - lefts as isize).rem_euclid(capacity as isize) as usize;
            prop_assert_eq!(tape.pointer(), expected);
        }

        #[test]
        fn full_increment_cycle_restores_cell(start in any::<u8>()) {
            let mut tape = Tape::new(1);
            tape.write_cell(start);
            for _ in 0..256 { tape.increment_cell(); }
            prop_assert_eq!(tape.read_cell(), start);
        }

        #[test]
        fn decrement_undoes_increment(start in any::<u8>()) {
            let mut tape = Tape::new(1);
            tape.write_cell(start);
            tape.increment_cell();
            tape.decrement_cell();
            prop_assert_eq!(tape.read_cell(), start);
        }
    }
}
