//! Backtracking search over partial assignments.

use crate::assignment::Assignment;
use crate::domain::Domains;
use crate::propagate::Propagator;
use crate::puzzle::{Puzzle, SlotIndex};
use crate::words::{WordIndex, WordList};
use crate::Config;
use bitvec::{bitvec, vec::BitVec};
use log::{debug, trace};
use rayon::prelude::*;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/************************
 *     Partial          *
 ************************/

/// An assignment under construction. `assign` and `unassign` undo each other exactly.
#[derive(Debug, Clone)]
pub struct PartialAssignment {
    /// SlotIndex -> assigned word
    values: Vec<Option<WordIndex>>,
    /// WordIndex -> is it assigned to some slot?
    used: BitVec,
    count: usize,
}

impl PartialAssignment {
    pub fn new(num_slots: usize, num_words: usize) -> PartialAssignment {
        PartialAssignment {
            values: vec![None; num_slots],
            used: bitvec![0; num_words],
            count: 0,
        }
    }

    pub fn get(&self, slot: SlotIndex) -> Option<WordIndex> {
        self.values[slot]
    }

    pub fn is_assigned(&self, slot: SlotIndex) -> bool {
        self.values[slot].is_some()
    }

    pub fn is_used(&self, word: WordIndex) -> bool {
        self.used[word]
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_complete(&self) -> bool {
        self.count == self.values.len()
    }

    pub fn assign(&mut self, slot: SlotIndex, word: WordIndex) {
        assert!(self.values[slot].is_none(), "slot {} assigned twice", slot);
        self.values[slot] = Some(word);
        self.used.set(word, true);
        self.count += 1;
    }

    pub fn unassign(&mut self, slot: SlotIndex) {
        if let Some(word) = self.values[slot].take() {
            self.used.set(word, false);
            self.count -= 1;
        }
    }

    pub fn to_assignment(&self, puzzle: &Puzzle, words: &WordList) -> Assignment {
        let mut assignment = Assignment::new();
        for (slot, value) in self.values.iter().enumerate() {
            if let Some(word) = value {
                assignment.insert(*puzzle.slot(slot), words.word(*word));
            }
        }
        assignment
    }
}

/************************
 *     Search           *
 ************************/

/// Counters describing how much work a search did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Partial assignments expanded
    pub nodes: usize,
    /// Candidates undone after failing further down
    pub backtracks: usize,
}

/// Depth-first search for a complete, consistent assignment.
pub struct Search<'a> {
    puzzle: &'a Puzzle,
    words: &'a WordList,
    config: &'a Config,
    cancel: &'a AtomicBool,
    /// Raised by whichever parallel branch succeeds first.
    finished: Option<&'a AtomicBool>,
    stats: Stats,
}

impl<'a> Search<'a> {
    pub fn new(
        puzzle: &'a Puzzle,
        words: &'a WordList,
        config: &'a Config,
        cancel: &'a AtomicBool,
    ) -> Search<'a> {
        Search {
            puzzle,
            words,
            config,
            cancel,
            finished: None,
            stats: Stats::default(),
        }
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    fn should_stop(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
            || self
                .finished
                .map_or(false, |finished| finished.load(Ordering::Relaxed))
    }

    /// Pick the next slot to fill: the one with the fewest candidates left, then the one that
    /// crosses the most slots, then the first in slot order. `None` if every slot is assigned.
    pub fn select_unassigned_variable(
        &self,
        domains: &Domains,
        partial: &PartialAssignment,
    ) -> Option<SlotIndex> {
        (0..self.puzzle.num_slots())
            .filter(|slot| !partial.is_assigned(*slot))
            .min_by_key(|slot| (domains.len(*slot), Reverse(self.puzzle.degree(*slot)), *slot))
    }

    /// The candidates for `slot`, least constraining first.
    ///
    /// A candidate's cost is the number of unassigned neighbors that still have that same word
    /// among their own candidates. Candidates of equal cost stay in word list order.
    pub fn order_domain_values(
        &self,
        slot: SlotIndex,
        domains: &Domains,
        partial: &PartialAssignment,
    ) -> Vec<WordIndex> {
        let neighbors = self.puzzle.neighbors(slot);
        let mut values = domains.words(slot).collect::<Vec<_>>();
        values.sort_by_key(|word| {
            neighbors
                .iter()
                .filter(|z| !partial.is_assigned(**z) && domains.contains(**z, *word))
                .count()
        });
        values
    }

    /// Would assigning `word` to the unassigned `slot` keep `partial` consistent? That is: the
    /// word isn't used elsewhere, it has the slot's length, and it agrees with every assigned
    /// neighbor where they cross.
    ///
    /// `partial` is assumed consistent already, so checking the new slot against the others is
    /// the same as checking the whole assignment.
    pub fn consistent(&self, partial: &PartialAssignment, slot: SlotIndex, word: WordIndex) -> bool {
        if partial.is_used(word) {
            return false;
        }
        if self.words.word_len(word) != self.puzzle.slot(slot).length {
            return false;
        }
        for neighbor in self.puzzle.neighbors(slot) {
            if let Some(other) = partial.get(*neighbor) {
                let (i, j) = self.puzzle.overlap(slot, *neighbor).unwrap_or_else(|| {
                    panic!("neighbors {} and {} have no overlap", slot, neighbor)
                });
                if self.words.char_at(word, i) != self.words.char_at(other, j) {
                    return false;
                }
            }
        }
        true
    }

    /// Extend `partial` to a complete assignment. On success, returns true and leaves the
    /// solution in `partial`. On failure, returns false and leaves `partial` as it was.
    pub fn backtrack(&mut self, domains: &Domains, partial: &mut PartialAssignment) -> bool {
        if self.should_stop() {
            return false;
        }
        let slot = match self.select_unassigned_variable(domains, partial) {
            Some(slot) => slot,
            None => return true,
        };
        self.stats.nodes += 1;

        for word in self.order_domain_values(slot, domains, partial) {
            if self.try_value(domains, partial, slot, word) {
                return true;
            }
        }
        false
    }

    fn try_value(
        &mut self,
        domains: &Domains,
        partial: &mut PartialAssignment,
        slot: SlotIndex,
        word: WordIndex,
    ) -> bool {
        if !self.consistent(partial, slot, word) {
            return false;
        }
        partial.assign(slot, word);
        if self.config.log_search {
            trace!(
                "{:>depth$}assign {} = {}",
                "",
                self.puzzle.slot(slot),
                self.words.word(word),
                depth = partial.len()
            );
        }

        let found = if self.config.maintain_arc_consistency {
            let mut branch = domains.clone();
            branch.restrict(slot, word);
            let arcs = self
                .puzzle
                .neighbors(slot)
                .iter()
                .filter(|z| !partial.is_assigned(**z))
                .map(|z| (*z, slot))
                .collect::<Vec<_>>();
            match Propagator::new(self.puzzle, self.words).ac3(&mut branch, Some(arcs)) {
                Ok(()) => self.backtrack(&branch, partial),
                Err(unsat) => {
                    if self.config.log_search {
                        trace!("{:>depth$}pruned: {}", "", unsat, depth = partial.len());
                    }
                    false
                }
            }
        } else {
            self.backtrack(domains, partial)
        };

        if !found {
            partial.unassign(slot);
            self.stats.backtracks += 1;
        }
        found
    }

    /// Search from the empty assignment.
    pub fn run(&mut self, domains: &Domains) -> Option<PartialAssignment> {
        let mut partial = PartialAssignment::new(self.puzzle.num_slots(), self.words.len());
        if self.backtrack(domains, &mut partial) {
            Some(partial)
        } else {
            None
        }
    }
}

/// Like `Search::run`, but each candidate for the first slot is searched as its own branch, in
/// parallel. Whichever branch finishes first wins, and the rest are abandoned.
pub fn run_parallel(
    puzzle: &Puzzle,
    words: &WordList,
    config: &Config,
    cancel: &AtomicBool,
    domains: &Domains,
) -> (Option<PartialAssignment>, Stats) {
    let root_search = Search::new(puzzle, words, config, cancel);
    let root = PartialAssignment::new(puzzle.num_slots(), words.len());
    if cancel.load(Ordering::Relaxed) {
        return (None, Stats::default());
    }
    let slot = match root_search.select_unassigned_variable(domains, &root) {
        Some(slot) => slot,
        None => return (Some(root), Stats::default()),
    };
    let candidates = root_search.order_domain_values(slot, domains, &root);
    debug!(
        "Searching {} branches for {} in parallel",
        candidates.len(),
        puzzle.slot(slot)
    );

    let finished = AtomicBool::new(false);
    let nodes = AtomicUsize::new(1);
    let backtracks = AtomicUsize::new(0);
    let solution = candidates.par_iter().find_map_any(|word| {
        let mut search = Search {
            finished: Some(&finished),
            ..Search::new(puzzle, words, config, cancel)
        };
        let mut partial = root.clone();
        let found = search.try_value(domains, &mut partial, slot, *word);
        nodes.fetch_add(search.stats.nodes, Ordering::Relaxed);
        backtracks.fetch_add(search.stats.backtracks, Ordering::Relaxed);
        if found {
            finished.store(true, Ordering::Relaxed);
            Some(partial)
        } else {
            None
        }
    });

    let stats = Stats {
        nodes: nodes.into_inner(),
        backtracks: backtracks.into_inner(),
    };
    (solution, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::Slot;

    fn setup(puzzle: &Puzzle, words: &WordList) -> Domains {
        let mut domains = Domains::new(puzzle.num_slots(), words.len());
        domains.enforce_node_consistency(puzzle, words);
        domains
    }

    #[test]
    fn test_partial_assign_unassign() {
        let mut partial = PartialAssignment::new(3, 5);
        assert!(partial.is_empty());
        partial.assign(1, 4);
        assert_eq!(partial.get(1), Some(4));
        assert!(partial.is_used(4));
        assert_eq!(partial.len(), 1);

        partial.unassign(1);
        assert_eq!(partial.get(1), None);
        assert!(!partial.is_used(4));
        assert!(partial.is_empty());

        // Unassigning an unassigned slot does nothing.
        partial.unassign(0);
        assert!(partial.is_empty());
    }

    #[test]
    fn test_select_unassigned_variable() {
        // Two across slots crossed by one down slot, plus a lone across slot.
        //
        //   ___.___
        //   .._....
        //   ___....
        let puzzle = Puzzle::from_slots(
            7,
            3,
            [
                Slot::across(0, 0, 3),
                Slot::across(0, 4, 3),
                Slot::down(0, 2, 3),
                Slot::across(2, 0, 3),
            ],
        )
        .unwrap();
        let words = WordList::new(["aaa", "bbb", "ccc"]);
        let config = Config::default();
        let cancel = AtomicBool::new(false);
        let search = Search::new(&puzzle, &words, &config, &cancel);
        let mut domains = setup(&puzzle, &words);
        let mut partial = PartialAssignment::new(puzzle.num_slots(), words.len());

        let down = puzzle.slot_index(&Slot::down(0, 2, 3)).unwrap();
        let lone = puzzle.slot_index(&Slot::across(0, 4, 3)).unwrap();
        let top = puzzle.slot_index(&Slot::across(0, 0, 3)).unwrap();

        // All domains the same size: the down slot has the highest degree.
        assert_eq!(search.select_unassigned_variable(&domains, &partial), Some(down));

        // Fewest remaining values wins over degree.
        domains.remove(lone, 0);
        assert_eq!(search.select_unassigned_variable(&domains, &partial), Some(lone));

        // Ties on both counts go to the first slot.
        partial.assign(lone, 1);
        partial.assign(down, 0);
        assert_eq!(search.select_unassigned_variable(&domains, &partial), Some(top));

        partial.assign(top, 2);
        let bottom = puzzle.slot_index(&Slot::across(2, 0, 3)).unwrap();
        assert_eq!(search.select_unassigned_variable(&domains, &partial), Some(bottom));
    }

    #[test]
    fn test_order_domain_values() {
        // across (0, 0) crossed by down (0, 0) and down (0, 2)
        let puzzle = Puzzle::from_slots(
            3,
            3,
            [Slot::across(0, 0, 3), Slot::down(0, 0, 3), Slot::down(0, 2, 3)],
        )
        .unwrap();
        let words = WordList::new(["abc", "bcd", "cde"]);
        let config = Config::default();
        let cancel = AtomicBool::new(false);
        let search = Search::new(&puzzle, &words, &config, &cancel);
        let mut domains = setup(&puzzle, &words);
        let mut partial = PartialAssignment::new(puzzle.num_slots(), words.len());

        let across = 0;
        let left = puzzle.slot_index(&Slot::down(0, 0, 3)).unwrap();
        let right = puzzle.slot_index(&Slot::down(0, 2, 3)).unwrap();

        // "abc" (0) is in neither down domain, "bcd" (1) is in one, "cde" (2) in both.
        domains.remove(left, 0);
        domains.remove(right, 0);
        domains.remove(right, 1);
        assert_eq!(search.order_domain_values(across, &domains, &partial), vec![0, 1, 2]);

        // Assigned neighbors don't count.
        domains.remove(left, 2);
        partial.assign(right, 2);
        assert_eq!(search.order_domain_values(across, &domains, &partial), vec![0, 2, 1]);
    }

    #[test]
    fn test_consistent() {
        let puzzle =
            Puzzle::from_slots(4, 3, [Slot::across(0, 0, 3), Slot::down(0, 1, 3)]).unwrap();
        let words = WordList::new(["cat", "art", "toe", "ox"]);
        let config = Config::default();
        let cancel = AtomicBool::new(false);
        let search = Search::new(&puzzle, &words, &config, &cancel);
        let mut partial = PartialAssignment::new(puzzle.num_slots(), words.len());

        let art = words.index_of("art").unwrap();
        let cat = words.index_of("cat").unwrap();
        let toe = words.index_of("toe").unwrap();
        let ox = words.index_of("ox").unwrap();

        assert!(search.consistent(&partial, 0, cat));
        assert!(!search.consistent(&partial, 0, ox));

        partial.assign(0, cat);
        assert!(search.consistent(&partial, 1, art));
        assert!(!search.consistent(&partial, 1, toe));
        // Words can't repeat.
        assert!(!search.consistent(&partial, 1, cat));
    }

    #[test]
    fn test_backtrack_restores_partial() {
        // Both slots need a word starting with the letter at the other's start; there is only
        // one such word.
        let puzzle =
            Puzzle::from_slots(3, 3, [Slot::across(0, 0, 3), Slot::down(0, 0, 3)]).unwrap();
        let words = WordList::new(["abc", "xyz"]);
        let config = Config::default();
        let cancel = AtomicBool::new(false);
        let mut search = Search::new(&puzzle, &words, &config, &cancel);
        let domains = setup(&puzzle, &words);
        let mut partial = PartialAssignment::new(puzzle.num_slots(), words.len());

        assert!(!search.backtrack(&domains, &mut partial));
        assert!(partial.is_empty());
        assert!(search.stats().nodes > 0);
        assert!(search.stats().backtracks > 0);
    }

    #[test]
    fn test_cancelled_search_finds_nothing() {
        let puzzle = Puzzle::from_slots(3, 1, [Slot::across(0, 0, 3)]).unwrap();
        let words = WordList::new(["abc"]);
        let config = Config::default();
        let cancel = AtomicBool::new(true);
        let domains = setup(&puzzle, &words);

        let mut search = Search::new(&puzzle, &words, &config, &cancel);
        assert!(search.run(&domains).is_none());
        let (solution, _) = run_parallel(&puzzle, &words, &config, &cancel, &domains);
        assert!(solution.is_none());
    }

    #[test]
    fn test_run_parallel() {
        let puzzle =
            Puzzle::from_slots(3, 3, [Slot::across(0, 0, 3), Slot::down(0, 1, 3)]).unwrap();
        let words = WordList::new(["cat", "art", "toe", "bat", "ran"]);
        let config = Config::default();
        let cancel = AtomicBool::new(false);
        let domains = setup(&puzzle, &words);

        let (solution, stats) = run_parallel(&puzzle, &words, &config, &cancel, &domains);
        let solution = solution.unwrap().to_assignment(&puzzle, &words);
        assert!(solution.is_complete(&puzzle));
        assert!(solution.is_consistent(&puzzle));
        assert!(stats.nodes >= 1);
    }
}
