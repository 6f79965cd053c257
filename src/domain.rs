use crate::puzzle::{Puzzle, SlotIndex};
use crate::words::{WordIndex, WordList};
use bitvec::{bitvec, vec::BitVec};
use std::fmt;

/// The candidate words still possible for each slot.
///
/// Each slot's domain is a bit vector over the `WordList`: bit `w` is set iff word `w` is still a
/// candidate. Domains only ever shrink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    /// SlotIndex -> set of WordIndex
    sets: Vec<BitVec>,
}

impl Domains {
    /// Every slot starts out able to hold every word.
    pub fn new(num_slots: usize, num_words: usize) -> Domains {
        Domains {
            sets: vec![bitvec![1; num_words]; num_slots],
        }
    }

    pub fn num_slots(&self) -> usize {
        self.sets.len()
    }

    pub fn len(&self, slot: SlotIndex) -> usize {
        self.sets[slot].count_ones()
    }

    pub fn is_empty(&self, slot: SlotIndex) -> bool {
        self.sets[slot].not_any()
    }

    pub fn contains(&self, slot: SlotIndex, word: WordIndex) -> bool {
        self.sets[slot][word]
    }

    /// The candidates for `slot`, in ascending `WordIndex` order.
    pub fn words(&self, slot: SlotIndex) -> impl Iterator<Item = WordIndex> + '_ {
        self.sets[slot].iter_ones()
    }

    pub fn remove(&mut self, slot: SlotIndex, word: WordIndex) {
        self.sets[slot].set(word, false);
    }

    /// Shrink `slot`'s domain down to just `word`.
    pub fn restrict(&mut self, slot: SlotIndex, word: WordIndex) {
        let set = &mut self.sets[slot];
        let keep = set[word];
        set.fill(false);
        set.set(word, keep);
    }

    /// The total number of candidates across all slots.
    pub fn size(&self) -> usize {
        self.sets.iter().map(|set| set.count_ones()).sum()
    }

    /// The number of (not necessarily consistent) complete assignments the domains allow.
    pub fn possibilities(&self) -> f64 {
        let mut product = 1.0;
        for set in &self.sets {
            product *= set.count_ones() as f64;
        }
        product
    }

    /// Node consistency: drop every candidate whose length differs from its slot's length.
    pub fn enforce_node_consistency(&mut self, puzzle: &Puzzle, words: &WordList) {
        for (slot, set) in self.sets.iter_mut().enumerate() {
            let length = puzzle.slot(slot).length;
            for word in 0..words.len() {
                if set[word] && words.word_len(word) != length {
                    set.set(word, false);
                }
            }
        }
    }

    /// Borrow the domains for display alongside the words and slots they refer to.
    pub fn display<'a>(&'a self, puzzle: &'a Puzzle, words: &'a WordList) -> DomainsDisplay<'a> {
        DomainsDisplay {
            domains: self,
            puzzle,
            words,
        }
    }
}

pub struct DomainsDisplay<'a> {
    domains: &'a Domains,
    puzzle: &'a Puzzle,
    words: &'a WordList,
}

impl fmt::Display for DomainsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Domains:")?;
        for (slot, set) in self.domains.sets.iter().enumerate() {
            write!(f, "    {}:", self.puzzle.slot(slot))?;
            for word in set.iter_ones() {
                write!(f, " {}", self.words.word(word))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[test]
fn test_node_consistency() {
    use crate::puzzle::STRUCTURE_0;

    let puzzle = Puzzle::from_structure(STRUCTURE_0).unwrap();
    let words = WordList::new(["ab", "cat", "dog", "also", "three", "birds", "horse", "four"]);
    let mut domains = Domains::new(puzzle.num_slots(), words.len());
    assert_eq!(domains.size(), puzzle.num_slots() * words.len());

    domains.enforce_node_consistency(&puzzle, &words);
    for slot in 0..puzzle.num_slots() {
        let length = puzzle.slot(slot).length;
        assert!(!domains.is_empty(slot));
        for word in domains.words(slot) {
            assert_eq!(words.word_len(word), length);
        }
    }
    // Slot 1 is the length-5 down slot.
    let five = domains
        .words(1)
        .map(|w| words.word(w))
        .collect::<Vec<_>>();
    assert_eq!(five, vec!["birds", "horse", "three"]);
    assert_eq!(domains.possibilities(), 2.0 * 3.0 * 2.0 * 2.0);

    // Running it again changes nothing.
    let before = domains.clone();
    domains.enforce_node_consistency(&puzzle, &words);
    assert_eq!(domains, before);
}

#[test]
fn test_restrict_and_remove() {
    let mut domains = Domains::new(2, 4);
    domains.remove(0, 2);
    assert_eq!(domains.words(0).collect::<Vec<_>>(), vec![0, 1, 3]);
    domains.restrict(0, 3);
    assert_eq!(domains.words(0).collect::<Vec<_>>(), vec![3]);
    assert_eq!(domains.len(0), 1);
    // Restricting to a word that was already removed empties the domain.
    domains.restrict(0, 1);
    assert!(domains.is_empty(0));
    assert_eq!(domains.len(1), 4);
}
