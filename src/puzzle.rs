use crate::error::LoadError;
use bitvec::{bitvec, vec::BitVec};
use std::fmt;
use std::fs;
use std::path::Path;

/// Index of a slot within `Puzzle::slots()`.
pub type SlotIndex = usize;

/************************
 *     Slot             *
 ************************/

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Across,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// One blank to be filled with a word: it starts at `(row, col)` and runs `length` cells in
/// `direction`.
///
/// Slots order by row, then column, then `Across` before `Down`. The solver breaks ties between
/// otherwise equally good slots by picking the smallest one in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Slot {
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Slot {
        Slot {
            row,
            col,
            direction,
            length,
        }
    }

    pub fn across(row: usize, col: usize, length: usize) -> Slot {
        Slot::new(row, col, Direction::Across, length)
    }

    pub fn down(row: usize, col: usize, length: usize) -> Slot {
        Slot::new(row, col, Direction::Down, length)
    }

    /// The grid cell holding character `k` of this slot's word.
    pub fn cell(&self, k: usize) -> (usize, usize) {
        match self.direction {
            Direction::Across => (self.row, self.col + k),
            Direction::Down => (self.row + k, self.col),
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.length).map(|k| self.cell(k))
    }

    fn fits(&self, width: usize, height: usize) -> bool {
        let (last_row, last_col) = self.cell(self.length - 1);
        last_row < height && last_col < width
    }

    /// Where `self` and `other` cross, as `(index into self, index into other)`. Slots running in
    /// the same direction never cross.
    fn crossing(&self, other: &Slot) -> Option<(usize, usize)> {
        if self.direction == other.direction {
            return None;
        }
        let (across, down) = match self.direction {
            Direction::Across => (self, other),
            Direction::Down => (other, self),
        };
        let in_across = down.col >= across.col && down.col < across.col + across.length;
        let in_down = across.row >= down.row && across.row < down.row + down.length;
        if !in_across || !in_down {
            return None;
        }
        let across_index = down.col - across.col;
        let down_index = across.row - down.row;
        match self.direction {
            Direction::Across => Some((across_index, down_index)),
            Direction::Down => Some((down_index, across_index)),
        }
    }

    fn collinear_with(&self, other: &Slot) -> bool {
        if self.direction != other.direction {
            return false;
        }
        let (line, start, other_line, other_start) = match self.direction {
            Direction::Across => (self.row, self.col, other.row, other.col),
            Direction::Down => (self.col, self.row, other.col, other.row),
        };
        line == other_line && start < other_start + other.length && other_start < start + self.length
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} at ({}, {}) of length {}",
            self.direction, self.row, self.col, self.length
        )
    }
}

/************************
 *     Puzzle           *
 ************************/

/// The shape of a crossword: its grid, its slots, and how the slots cross each other.
///
/// A `Puzzle` never changes once built. Slots are kept sorted, so `SlotIndex` order matches the
/// `Ord` order of `Slot`.
#[derive(Debug, Clone)]
pub struct Puzzle {
    width: usize,
    height: usize,
    /// row * width + col -> is the cell open?
    open: BitVec,
    /// SlotIndex -> Slot
    slots: Vec<Slot>,
    /// x * slots.len() + y -> overlap of x with y
    overlaps: Vec<Option<(usize, usize)>>,
    /// SlotIndex -> crossing slots, ascending
    neighbors: Vec<Vec<SlotIndex>>,
}

impl Puzzle {
    /// Build a puzzle out of explicit slots. The open cells are exactly the cells covered by
    /// some slot.
    pub fn from_slots(
        width: usize,
        height: usize,
        slots: impl IntoIterator<Item = Slot>,
    ) -> Result<Puzzle, LoadError> {
        let slots = slots.into_iter().collect::<Vec<_>>();
        let mut open = bitvec![0; width * height];
        for slot in &slots {
            if slot.length == 0 {
                return Err(LoadError::EmptySlot(*slot));
            }
            if !slot.fits(width, height) {
                return Err(LoadError::SlotOutOfBounds {
                    slot: *slot,
                    width,
                    height,
                });
            }
            for (row, col) in slot.cells() {
                open.set(row * width + col, true);
            }
        }
        Puzzle::build(width, height, open, slots)
    }

    /// Read a crossword structure: one line per row, where `_` marks an open cell and anything
    /// else (including the missing tail of a short line) is blocked.
    ///
    /// Every maximal run of two or more open cells, across or down, becomes a slot.
    pub fn from_structure(structure: &str) -> Result<Puzzle, LoadError> {
        let rows = structure.lines().collect::<Vec<_>>();
        let height = rows.len();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);

        let mut open = bitvec![0; width * height];
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch == '_' {
                    open.set(row * width + col, true);
                }
            }
        }
        let is_open = |row: usize, col: usize| open[row * width + col];

        let mut slots = Vec::new();
        for row in 0..height {
            for col in 0..width {
                if !is_open(row, col) {
                    continue;
                }
                if col == 0 || !is_open(row, col - 1) {
                    let length = (col..width).take_while(|c| is_open(row, *c)).count();
                    if length > 1 {
                        slots.push(Slot::across(row, col, length));
                    }
                }
                if row == 0 || !is_open(row - 1, col) {
                    let length = (row..height).take_while(|r| is_open(*r, col)).count();
                    if length > 1 {
                        slots.push(Slot::down(row, col, length));
                    }
                }
            }
        }

        Puzzle::build(width, height, open, slots)
    }

    /// Read a crossword structure file. See `from_structure` for the format.
    pub fn load(path: impl AsRef<Path>) -> Result<Puzzle, LoadError> {
        let path = path.as_ref();
        let structure = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        Puzzle::from_structure(&structure)
    }

    fn build(
        width: usize,
        height: usize,
        open: BitVec,
        mut slots: Vec<Slot>,
    ) -> Result<Puzzle, LoadError> {
        slots.sort();
        for pair in slots.windows(2) {
            if pair[0] == pair[1] {
                return Err(LoadError::DuplicateSlot(pair[0]));
            }
        }

        let n = slots.len();
        let mut overlaps = vec![None; n * n];
        let mut neighbors = vec![Vec::new(); n];
        for x in 0..n {
            for y in 0..n {
                if x == y {
                    continue;
                }
                if slots[x].collinear_with(&slots[y]) {
                    return Err(LoadError::CollinearSlots(slots[x], slots[y]));
                }
                if let Some(overlap) = slots[x].crossing(&slots[y]) {
                    overlaps[x * n + y] = Some(overlap);
                    neighbors[x].push(y);
                }
            }
        }

        Ok(Puzzle {
            width,
            height,
            open,
            slots,
            overlaps,
            neighbors,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_open(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.open[row * self.width + col]
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, slot: SlotIndex) -> &Slot {
        &self.slots[slot]
    }

    pub fn slot_index(&self, slot: &Slot) -> Option<SlotIndex> {
        self.slots.binary_search(slot).ok()
    }

    /// `Some((i, j))` if character `i` of `x`'s word must equal character `j` of `y`'s word.
    pub fn overlap(&self, x: SlotIndex, y: SlotIndex) -> Option<(usize, usize)> {
        self.overlaps[x * self.slots.len() + y]
    }

    /// The slots that cross `slot`, in ascending order.
    pub fn neighbors(&self, slot: SlotIndex) -> &[SlotIndex] {
        &self.neighbors[slot]
    }

    pub fn degree(&self, slot: SlotIndex) -> usize {
        self.neighbors[slot].len()
    }

    /// Every ordered pair `(x, y)` where `y` crosses `x`.
    pub fn arcs(&self) -> impl Iterator<Item = (SlotIndex, SlotIndex)> + '_ {
        (0..self.slots.len()).flat_map(move |x| self.neighbors[x].iter().map(move |y| (x, *y)))
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..self.height {
            for col in 0..self.width {
                if self.is_open(row, col) {
                    write!(f, "_")?;
                } else {
                    write!(f, "#")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) const STRUCTURE_0: &str = "\
#___#
#_##_
#_##_
#_##_
#____
";

#[test]
fn test_structure_slots() {
    let puzzle = Puzzle::from_structure(STRUCTURE_0).unwrap();
    assert_eq!(puzzle.width(), 5);
    assert_eq!(puzzle.height(), 5);
    assert_eq!(
        puzzle.slots(),
        &[
            Slot::across(0, 1, 3),
            Slot::down(0, 1, 5),
            Slot::down(1, 4, 4),
            Slot::across(4, 1, 4),
        ]
    );
    assert!(puzzle.is_open(0, 2));
    assert!(!puzzle.is_open(1, 2));
    assert!(!puzzle.is_open(9, 9));
    assert_eq!(format!("{}", puzzle), STRUCTURE_0);
}

#[test]
fn test_structure_overlaps() {
    let puzzle = Puzzle::from_structure(STRUCTURE_0).unwrap();

    // 0: across (0, 1) len 3
    // 1: down (0, 1) len 5
    // 2: down (1, 4) len 4
    // 3: across (4, 1) len 4
    assert_eq!(puzzle.overlap(0, 1), Some((0, 0)));
    assert_eq!(puzzle.overlap(1, 0), Some((0, 0)));
    assert_eq!(puzzle.overlap(3, 1), Some((0, 4)));
    assert_eq!(puzzle.overlap(1, 3), Some((4, 0)));
    assert_eq!(puzzle.overlap(3, 2), Some((3, 3)));
    assert_eq!(puzzle.overlap(0, 2), None);
    assert_eq!(puzzle.overlap(0, 3), None);

    assert_eq!(puzzle.neighbors(0), &[1]);
    assert_eq!(puzzle.neighbors(1), &[0, 3]);
    assert_eq!(puzzle.neighbors(3), &[1, 2]);
    assert_eq!(puzzle.degree(2), 1);
    assert_eq!(puzzle.arcs().count(), 6);

    for x in 0..puzzle.num_slots() {
        assert!(!puzzle.neighbors(x).contains(&x));
        for y in 0..puzzle.num_slots() {
            let mirrored = puzzle.overlap(y, x).map(|(j, i)| (i, j));
            assert_eq!(puzzle.overlap(x, y), mirrored);
        }
    }
}

#[test]
fn test_structure_ragged_lines() {
    // The second line is short; its missing cells are blocked.
    let puzzle = Puzzle::from_structure("___\n_\n___\n").unwrap();
    assert_eq!(puzzle.width(), 3);
    assert_eq!(
        puzzle.slots(),
        &[
            Slot::across(0, 0, 3),
            Slot::down(0, 0, 3),
            Slot::across(2, 0, 3),
        ]
    );
    assert!(!puzzle.is_open(1, 1));
}

#[test]
fn test_from_slots_errors() {
    use LoadError::{CollinearSlots, DuplicateSlot, EmptySlot, SlotOutOfBounds};

    assert!(matches!(
        Puzzle::from_slots(3, 3, [Slot::across(0, 1, 3)]),
        Err(SlotOutOfBounds { .. })
    ));
    assert!(matches!(
        Puzzle::from_slots(3, 3, [Slot::down(3, 0, 1)]),
        Err(SlotOutOfBounds { .. })
    ));
    assert!(matches!(
        Puzzle::from_slots(3, 3, [Slot::down(0, 0, 0)]),
        Err(EmptySlot(_))
    ));
    assert!(matches!(
        Puzzle::from_slots(3, 3, [Slot::down(0, 0, 3), Slot::down(0, 0, 3)]),
        Err(DuplicateSlot(_))
    ));
    assert!(matches!(
        Puzzle::from_slots(5, 1, [Slot::across(0, 0, 3), Slot::across(0, 2, 3)]),
        Err(CollinearSlots(..))
    ));
    // Touching end to end is fine.
    assert!(Puzzle::from_slots(6, 1, [Slot::across(0, 0, 3), Slot::across(0, 3, 3)]).is_ok());
}

#[test]
fn test_from_slots_crossing() {
    let puzzle = Puzzle::from_slots(3, 3, [Slot::down(0, 1, 3), Slot::across(0, 0, 3)]).unwrap();
    let across = puzzle.slot_index(&Slot::across(0, 0, 3)).unwrap();
    let down = puzzle.slot_index(&Slot::down(0, 1, 3)).unwrap();
    assert_eq!(across, 0);
    assert_eq!(puzzle.overlap(across, down), Some((1, 0)));
    assert_eq!(puzzle.overlap(down, across), Some((0, 1)));
    assert!(puzzle.is_open(2, 1));
    assert!(!puzzle.is_open(2, 0));
}
