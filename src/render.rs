use crate::assignment::Assignment;
use crate::puzzle::Puzzle;
use std::fmt;

const BLOCKED: char = '█';
const UNFILLED: char = ' ';

/// A filled-in crossword, ready to print. Blocked cells are drawn solid and open cells hold
/// their letter, or a space if nothing was written there.
pub struct Grid<'a> {
    puzzle: &'a Puzzle,
    letters: Vec<Vec<Option<char>>>,
    spaced: bool,
}

impl<'a> Grid<'a> {
    pub fn new(puzzle: &'a Puzzle, assignment: &Assignment) -> Grid<'a> {
        Grid {
            puzzle,
            letters: assignment.letter_grid(puzzle),
            spaced: false,
        }
    }

    /// Put a space between neighboring cells, so the grid looks closer to square.
    pub fn spaced(mut self, spaced: bool) -> Grid<'a> {
        self.spaced = spaced;
        self
    }

    /// How many columns of text each line takes.
    pub fn text_width(&self) -> usize {
        let width = self.puzzle.width();
        if self.spaced && width > 0 {
            2 * width - 1
        } else {
            width
        }
    }
}

impl fmt::Display for Grid<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (row, letters) in self.letters.iter().enumerate() {
            for (col, letter) in letters.iter().enumerate() {
                if self.spaced && col != 0 {
                    write!(f, " ")?;
                }
                if !self.puzzle.is_open(row, col) {
                    write!(f, "{}", BLOCKED)?;
                } else {
                    write!(f, "{}", letter.unwrap_or(UNFILLED))?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::Slot;

    #[test]
    fn test_grid_display() {
        let puzzle = Puzzle::from_structure("___#\n_#__\n").unwrap();
        let mut assignment = Assignment::new();
        assignment.insert(Slot::across(0, 0, 3), "CAT");

        let grid = assignment.display(&puzzle);
        assert_eq!(grid.text_width(), 4);
        assert_eq!(format!("{}", grid), "CAT█\n █  \n");

        let grid = assignment.display(&puzzle).spaced(true);
        assert_eq!(grid.text_width(), 7);
        assert_eq!(format!("{}", grid), "C A T █\n  █    \n");
    }
}
