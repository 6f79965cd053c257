use crate::puzzle::{Puzzle, Slot};
use crate::render::Grid;
use std::collections::{BTreeMap, HashSet};

/// A mapping from slots to the words filling them. `solve` returns a complete one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    words: BTreeMap<Slot, String>,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment::default()
    }

    /// Fill `slot` with `word`, returning the word previously there, if any.
    pub fn insert(&mut self, slot: Slot, word: impl Into<String>) -> Option<String> {
        self.words.insert(slot, word.into())
    }

    /// Empty `slot`, returning the word that was there, if any.
    pub fn remove(&mut self, slot: &Slot) -> Option<String> {
        self.words.remove(slot)
    }

    pub fn get(&self, slot: &Slot) -> Option<&str> {
        self.words.get(slot).map(|word| word.as_str())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The filled slots, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&Slot, &str)> + '_ {
        self.words.iter().map(|(slot, word)| (slot, word.as_str()))
    }

    /// Does every slot of `puzzle` have a word?
    pub fn is_complete(&self, puzzle: &Puzzle) -> bool {
        puzzle.slots().iter().all(|slot| self.words.contains_key(slot))
    }

    /// Do the words fit together? Every slot must belong to `puzzle`, no word may be used twice,
    /// every word must have its slot's length, and crossing slots must agree on their shared
    /// cell.
    pub fn is_consistent(&self, puzzle: &Puzzle) -> bool {
        let mut seen = HashSet::new();
        let mut filled = Vec::new();
        for (slot, word) in &self.words {
            let index = match puzzle.slot_index(slot) {
                Some(index) => index,
                None => return false,
            };
            if !seen.insert(word.as_str()) {
                return false;
            }
            let chars = word.chars().collect::<Vec<_>>();
            if chars.len() != slot.length {
                return false;
            }
            filled.push((index, chars));
        }

        for (x, x_chars) in &filled {
            for (y, y_chars) in &filled {
                if let Some((i, j)) = puzzle.overlap(*x, *y) {
                    if x_chars[i] != y_chars[j] {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// `grid[row][col]` is the letter written in that cell, if any.
    pub fn letter_grid(&self, puzzle: &Puzzle) -> Vec<Vec<Option<char>>> {
        let mut grid = vec![vec![None; puzzle.width()]; puzzle.height()];
        for (slot, word) in &self.words {
            for (k, ch) in word.chars().take(slot.length).enumerate() {
                let (row, col) = slot.cell(k);
                if row < puzzle.height() && col < puzzle.width() {
                    grid[row][col] = Some(ch);
                }
            }
        }
        grid
    }

    /// Show the filled-in grid.
    pub fn display<'a>(&self, puzzle: &'a Puzzle) -> Grid<'a> {
        Grid::new(puzzle, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::STRUCTURE_0;

    fn structure_0_solution() -> (Puzzle, Assignment) {
        let puzzle = Puzzle::from_structure(STRUCTURE_0).unwrap();
        let mut assignment = Assignment::new();
        assignment.insert(Slot::across(0, 1, 3), "CAT");
        assignment.insert(Slot::down(0, 1, 5), "CRABS");
        assignment.insert(Slot::down(1, 4, 4), "DART");
        assignment.insert(Slot::across(4, 1, 4), "SENT");
        (puzzle, assignment)
    }

    #[test]
    fn test_complete_and_consistent() {
        let (puzzle, mut assignment) = structure_0_solution();
        assert!(assignment.is_complete(&puzzle));
        assert!(assignment.is_consistent(&puzzle));

        // Wrong letter where SENT crosses DART.
        assignment.insert(Slot::down(1, 4, 4), "DARK");
        assert!(!assignment.is_consistent(&puzzle));

        // Wrong length.
        assignment.insert(Slot::down(1, 4, 4), "DARTS");
        assert!(!assignment.is_consistent(&puzzle));

        // Repeated word.
        assignment.insert(Slot::down(1, 4, 4), "SENT");
        assert!(!assignment.is_consistent(&puzzle));
    }

    #[test]
    fn test_partial_assignments() {
        let puzzle = Puzzle::from_structure(STRUCTURE_0).unwrap();
        let mut assignment = Assignment::new();
        assert!(!assignment.is_complete(&puzzle));
        assert!(assignment.is_consistent(&puzzle));

        assignment.insert(Slot::across(0, 1, 3), "CAT");
        assert!(assignment.is_consistent(&puzzle));
        assert_eq!(assignment.get(&Slot::across(0, 1, 3)), Some("CAT"));
        assert_eq!(assignment.get(&Slot::down(0, 1, 5)), None);

        // Not a slot of this puzzle.
        assignment.insert(Slot::across(2, 0, 3), "DOG");
        assert!(!assignment.is_consistent(&puzzle));
        assert_eq!(assignment.remove(&Slot::across(2, 0, 3)), Some("DOG".to_owned()));
        assert!(assignment.is_consistent(&puzzle));
        assert_eq!(assignment.len(), 1);
    }

    #[test]
    fn test_letter_grid() {
        let (puzzle, assignment) = structure_0_solution();
        let grid = assignment.letter_grid(&puzzle);
        assert_eq!(grid[0], vec![None, Some('C'), Some('A'), Some('T'), None]);
        assert_eq!(grid[4], vec![None, Some('S'), Some('E'), Some('N'), Some('T')]);
        assert_eq!(grid[3][4], Some('R'));
        assert_eq!(grid[2][2], None);
    }
}
