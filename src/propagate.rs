//! Arc consistency over the domain store.

use crate::domain::Domains;
use crate::puzzle::{Puzzle, Slot, SlotIndex};
use crate::words::WordList;
use bitvec::{bitvec, vec::BitVec};
use std::collections::{HashSet, VecDeque};

/// Propagation emptied the domain of `slot`: no complete assignment can exist from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no candidate words left for {slot}")]
pub struct Unsatisfiable {
    pub slot: Slot,
}

/// Enforces the pairwise overlap constraints of a `Puzzle` on a `Domains`.
#[derive(Debug, Clone, Copy)]
pub struct Propagator<'a> {
    puzzle: &'a Puzzle,
    words: &'a WordList,
}

impl<'a> Propagator<'a> {
    pub fn new(puzzle: &'a Puzzle, words: &'a WordList) -> Propagator<'a> {
        Propagator { puzzle, words }
    }

    /// Make `x` arc consistent with `y`: remove every candidate of `x` that no candidate of `y`
    /// agrees with at their shared cell. Returns whether anything was removed.
    ///
    /// Slots that don't cross have no constraint between them, so nothing is removed.
    pub fn revise(&self, domains: &mut Domains, x: SlotIndex, y: SlotIndex) -> bool {
        let (i, j) = match self.puzzle.overlap(x, y) {
            Some(overlap) => overlap,
            None => return false,
        };

        let supported = domains
            .words(y)
            .map(|v| self.words.char_at(v, j))
            .collect::<HashSet<char>>();
        let unsupported = domains
            .words(x)
            .filter(|w| !supported.contains(&self.words.char_at(*w, i)))
            .collect::<Vec<_>>();

        for w in &unsupported {
            domains.remove(x, *w);
        }
        !unsupported.is_empty()
    }

    /// AC-3. Revise arcs until none changes anything, starting from `arcs` or, if that's `None`,
    /// from every arc in the puzzle. Arcs are processed first-in first-out.
    ///
    /// Fails if any domain is or becomes empty. On success, every domain is non-empty and every
    /// remaining candidate of every slot agrees with some candidate of each of its neighbors.
    pub fn ac3(
        &self,
        domains: &mut Domains,
        arcs: Option<Vec<(SlotIndex, SlotIndex)>>,
    ) -> Result<(), Unsatisfiable> {
        let n = self.puzzle.num_slots();
        if let Some(x) = (0..n).find(|x| domains.is_empty(*x)) {
            return Err(Unsatisfiable {
                slot: *self.puzzle.slot(x),
            });
        }

        let mut queue = ArcQueue::new(n);
        match arcs {
            Some(arcs) => arcs.into_iter().for_each(|arc| queue.push(arc)),
            None => self.puzzle.arcs().for_each(|arc| queue.push(arc)),
        }

        while let Some((x, y)) = queue.pop() {
            if !self.revise(domains, x, y) {
                continue;
            }
            if domains.is_empty(x) {
                return Err(Unsatisfiable {
                    slot: *self.puzzle.slot(x),
                });
            }
            for z in self.puzzle.neighbors(x) {
                if *z != y {
                    queue.push((*z, x));
                }
            }
        }
        Ok(())
    }
}

/// FIFO worklist of arcs that ignores arcs already waiting in it.
struct ArcQueue {
    num_slots: usize,
    queue: VecDeque<(SlotIndex, SlotIndex)>,
    /// x * num_slots + y -> is (x, y) in the queue?
    queued: BitVec,
}

impl ArcQueue {
    fn new(num_slots: usize) -> ArcQueue {
        ArcQueue {
            num_slots,
            queue: VecDeque::new(),
            queued: bitvec![0; num_slots * num_slots],
        }
    }

    fn push(&mut self, (x, y): (SlotIndex, SlotIndex)) {
        let key = x * self.num_slots + y;
        if !self.queued[key] {
            self.queued.set(key, true);
            self.queue.push_back((x, y));
        }
    }

    fn pop(&mut self) -> Option<(SlotIndex, SlotIndex)> {
        let (x, y) = self.queue.pop_front()?;
        self.queued.set(x * self.num_slots + y, false);
        Some((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::STRUCTURE_0;

    fn node_consistent(puzzle: &Puzzle, words: &WordList) -> Domains {
        let mut domains = Domains::new(puzzle.num_slots(), words.len());
        domains.enforce_node_consistency(puzzle, words);
        domains
    }

    fn domain_words(domains: &Domains, words: &WordList, slot: SlotIndex) -> Vec<String> {
        domains
            .words(slot)
            .map(|w| words.word(w).to_owned())
            .collect()
    }

    fn is_subset(smaller: &Domains, larger: &Domains) -> bool {
        (0..larger.num_slots())
            .all(|slot| smaller.words(slot).all(|word| larger.contains(slot, word)))
    }

    #[test]
    fn test_revise() {
        // across (0, 0) len 3 crossed at its middle by down (0, 1) len 3
        let puzzle =
            Puzzle::from_slots(3, 3, [Slot::across(0, 0, 3), Slot::down(0, 1, 3)]).unwrap();
        let words = WordList::new(["cat", "art", "toe", "bee"]);
        let propagator = Propagator::new(&puzzle, &words);
        let mut domains = node_consistent(&puzzle, &words);

        // across[1] must be the first letter of some down word: a, b, c or t.
        assert!(propagator.revise(&mut domains, 0, 1));
        assert_eq!(domain_words(&domains, &words, 0), vec!["cat"]);
        assert!(!propagator.revise(&mut domains, 0, 1));

        // down[0] must be 'a'.
        assert!(propagator.revise(&mut domains, 1, 0));
        assert_eq!(domain_words(&domains, &words, 1), vec!["art"]);
    }

    #[test]
    fn test_revise_without_overlap() {
        let puzzle =
            Puzzle::from_slots(3, 3, [Slot::across(0, 0, 3), Slot::across(2, 0, 3)]).unwrap();
        let words = WordList::new(["abc", "xyz"]);
        let propagator = Propagator::new(&puzzle, &words);
        let mut domains = node_consistent(&puzzle, &words);
        let before = domains.clone();
        assert!(!propagator.revise(&mut domains, 0, 1));
        assert_eq!(domains, before);
    }

    #[test]
    fn test_ac3_keeps_supported_values() {
        let puzzle =
            Puzzle::from_slots(3, 3, [Slot::across(0, 0, 3), Slot::down(0, 1, 3)]).unwrap();
        let words = WordList::new(["cat", "art", "toe"]);
        let propagator = Propagator::new(&puzzle, &words);
        let mut domains = node_consistent(&puzzle, &words);

        assert_eq!(propagator.ac3(&mut domains, None), Ok(()));
        assert_eq!(domain_words(&domains, &words, 0), vec!["cat"]);
        assert_eq!(domain_words(&domains, &words, 1), vec!["art"]);
    }

    #[test]
    fn test_ac3_properties() {
        let puzzle = Puzzle::from_structure(STRUCTURE_0).unwrap();
        let words = WordList::new([
            "dog", "cat", "sun", "oat", "ten", "crabs", "denim", "adobe", "tents", "dart", "sent",
            "bone", "tend",
        ]);
        let propagator = Propagator::new(&puzzle, &words);
        let original = node_consistent(&puzzle, &words);

        let mut once = original.clone();
        assert_eq!(propagator.ac3(&mut once, None), Ok(()));
        assert!(is_subset(&once, &original));
        assert!(once.size() < original.size());
        for slot in 0..puzzle.num_slots() {
            assert!(!once.is_empty(slot));
        }

        // Every remaining value is supported by every neighbor.
        for (x, y) in puzzle.arcs() {
            let (i, j) = puzzle.overlap(x, y).unwrap();
            for w in once.words(x) {
                assert!(once
                    .words(y)
                    .any(|v| words.char_at(w, i) == words.char_at(v, j)));
            }
        }

        let mut twice = once.clone();
        assert_eq!(propagator.ac3(&mut twice, None), Ok(()));
        assert_eq!(twice, once);
    }

    #[test]
    fn test_ac3_fails_on_empty_domain() {
        let puzzle =
            Puzzle::from_slots(3, 3, [Slot::across(0, 0, 3), Slot::down(0, 1, 3)]).unwrap();
        let words = WordList::new(["cat", "dog"]);
        let propagator = Propagator::new(&puzzle, &words);
        let mut domains = node_consistent(&puzzle, &words);

        let result = propagator.ac3(&mut domains, None);
        assert!(result.is_err());
        let Unsatisfiable { slot } = result.unwrap_err();
        assert!(puzzle.slot_index(&slot).is_some());
    }

    #[test]
    fn test_ac3_fails_on_lone_empty_slot() {
        // Nothing crosses the second slot, and no word fits it.
        let puzzle =
            Puzzle::from_slots(4, 3, [Slot::across(0, 0, 3), Slot::across(2, 0, 4)]).unwrap();
        let words = WordList::new(["cat", "dog"]);
        let propagator = Propagator::new(&puzzle, &words);
        let mut domains = node_consistent(&puzzle, &words);

        assert_eq!(
            propagator.ac3(&mut domains, None),
            Err(Unsatisfiable {
                slot: Slot::across(2, 0, 4)
            })
        );
    }

    #[test]
    fn test_ac3_with_initial_arcs() {
        let puzzle =
            Puzzle::from_slots(3, 3, [Slot::across(0, 0, 3), Slot::down(0, 1, 3)]).unwrap();
        let words = WordList::new(["cat", "art", "toe", "bee"]);
        let propagator = Propagator::new(&puzzle, &words);

        // Nothing to do.
        let mut domains = node_consistent(&puzzle, &words);
        let before = domains.clone();
        assert_eq!(propagator.ac3(&mut domains, Some(vec![])), Ok(()));
        assert_eq!(domains, before);

        // Revising (1, 0) shrinks the down slot. The only arc into it comes from the slot it
        // was just revised against, so the across slot is left alone.
        assert_eq!(propagator.ac3(&mut domains, Some(vec![(1, 0)])), Ok(()));
        assert_eq!(domain_words(&domains, &words, 0).len(), 4);
        assert_eq!(domain_words(&domains, &words, 1), vec!["art"]);

        assert_eq!(propagator.ac3(&mut domains, Some(vec![(0, 1)])), Ok(()));
        assert_eq!(domain_words(&domains, &words, 0), vec!["cat"]);
    }
}
