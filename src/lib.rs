//! Give it the shape of a crossword and a list of words, and fill-o-matic will fill in the
//! crossword.
//!
//! Every blank in the grid (a _slot_) must hold a different word from the list, of the right
//! length, and crossing slots must agree on the letter they share. Fill-o-matic treats this as a
//! constraint satisfaction problem: it narrows each slot's candidate words by length, then by
//! arc consistency with the slots that cross it, and then runs a backtracking search that fills
//! the most constrained slot first and tries its least constraining words first.
//!
//! Fill-o-matic can be used either as an application invoked on a structure file and a word
//! list file, or as a library.
//!
//! ## Filling a crossword
//!
//! First, the shape of the puzzle. Each line is a row; `_` is an open cell and `#` a blocked one:
//!
//! ```
//! use fillomatic::{Puzzle, Slot};
//!
//! let puzzle = Puzzle::from_structure(
//!     "#___#\n\
//!      #_##_\n\
//!      #_##_\n\
//!      #_##_\n\
//!      #____\n",
//! ).unwrap();
//!
//! assert_eq!(puzzle.slots(), &[
//!     Slot::across(0, 1, 3),
//!     Slot::down(0, 1, 5),
//!     Slot::down(1, 4, 4),
//!     Slot::across(4, 1, 4),
//! ]);
//! ```
//!
//! Then the words to fill it with. `WordList::load` reads them from a file, one per line;
//! `WordList::new` takes them as given:
//!
//! ```
//! # use fillomatic::WordList;
//! let words = WordList::new([
//!     "CAT", "DOG", "SUN", "CRABS", "DENIM", "TENTS", "DART", "SENT", "BONE", "TEND",
//! ]);
//! ```
//!
//! Finally, solve. `None` means there's no way to fill the grid with these words:
//!
//! ```
//! # use fillomatic::{Puzzle, Slot, WordList};
//! # let puzzle = Puzzle::from_structure("#___#\n#_##_\n#_##_\n#_##_\n#____\n").unwrap();
//! # let words = WordList::new([
//! #     "CAT", "DOG", "SUN", "CRABS", "DENIM", "TENTS", "DART", "SENT", "BONE", "TEND",
//! # ]);
//! let solution = fillomatic::solve(&puzzle, &words).expect("No solution");
//! assert!(solution.is_complete(&puzzle));
//! assert!(solution.is_consistent(&puzzle));
//! assert_eq!(solution.get(&Slot::down(1, 4, 4)), Some("DART"));
//! println!("{}", solution.display(&puzzle));
//! ```
//!
//! Which prints:
//!
//! ```text
//! █CAT█
//! █R██D
//! █A██A
//! █B██R
//! █SENT
//! ```
//!
//! To change how the solver works or what it logs, build a `Fillomatic` and set its `config()`
//! before calling `solve()`.

mod assignment;
mod error;
mod render;

pub mod domain;
pub mod propagate;
pub mod puzzle;
pub mod search;
pub mod words;

pub use assignment::Assignment;
pub use error::LoadError;
pub use propagate::Unsatisfiable;
pub use puzzle::{Direction, Puzzle, Slot, SlotIndex};
pub use render::Grid;
pub use words::{WordIndex, WordList};

use domain::Domains;
use log::info;
use propagate::Propagator;
use search::Search;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/************************
 *     Solver           *
 ************************/

pub struct Fillomatic<'a> {
    puzzle: &'a Puzzle,
    words: &'a WordList,
    config: Config,
    cancel: Arc<AtomicBool>,
}

impl<'a> Fillomatic<'a> {
    /// Construct a solver for filling `puzzle` from `words`. Call `solve()` to solve it.
    pub fn new(puzzle: &'a Puzzle, words: &'a WordList) -> Fillomatic<'a> {
        Fillomatic {
            puzzle,
            words,
            config: Config::default(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&mut self) -> &mut Config {
        &mut self.config
    }

    /// A flag that stops the search when set, e.g. from another thread. A stopped search
    /// reports no solution.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// The domains after node consistency and arc consistency, before any search.
    pub fn propagate(&self) -> Result<Domains, Unsatisfiable> {
        let start_time = Instant::now();

        let mut domains = Domains::new(self.puzzle.num_slots(), self.words.len());
        domains.enforce_node_consistency(self.puzzle, self.words);
        self.log_step("node consistency", &domains, start_time);

        Propagator::new(self.puzzle, self.words).ac3(&mut domains, None)?;
        self.log_step("arc consistency", &domains, start_time);

        Ok(domains)
    }

    /// Find a complete, consistent assignment of words to slots, or `None` if there isn't one.
    pub fn solve(&self) -> Option<Assignment> {
        let start_time = Instant::now();

        let domains = match self.propagate() {
            Ok(domains) => domains,
            Err(unsat) => {
                if self.config.log_steps {
                    info!("Unsatisfiable: {}", unsat);
                }
                return None;
            }
        };

        let (solution, stats) = if self.config.parallel {
            search::run_parallel(self.puzzle, self.words, &self.config, &self.cancel, &domains)
        } else {
            let mut search = Search::new(self.puzzle, self.words, &self.config, &self.cancel);
            let solution = search.run(&domains);
            (solution, search.stats())
        };

        if self.config.log_steps {
            info!(
                "Search: {} nodes, {} backtracks, {}",
                stats.nodes,
                stats.backtracks,
                if solution.is_some() {
                    "solved"
                } else if self.cancel.load(Ordering::Relaxed) {
                    "cancelled"
                } else {
                    "no solution"
                }
            );
        }
        if self.config.log_elapsed {
            info!("Total time: {}ms", start_time.elapsed().as_millis());
        }

        solution.map(|partial| partial.to_assignment(self.puzzle, self.words))
    }

    fn log_step(&self, step: &str, domains: &Domains, start_time: Instant) {
        if self.config.log_steps {
            info!(
                "After {:<16}: size = {:6} possibilities = {}",
                step,
                domains.size(),
                domains.possibilities(),
            );
        }
        if self.config.log_domains {
            info!("{}", domains.display(self.puzzle, self.words));
        }
        if self.config.log_elapsed {
            info!("  elapsed: {:5?}ms", start_time.elapsed().as_millis());
        }
    }
}

/// Fill `puzzle` with `words` using the default configuration. `None` means no complete,
/// consistent assignment exists.
pub fn solve(puzzle: &Puzzle, words: &WordList) -> Option<Assignment> {
    Fillomatic::new(puzzle, words).solve()
}

/************************
 *     Config           *
 ************************/

// When running `main`, this is loaded from command line args.
// See `Args` in `main.rs`.
/// Configuration options. Set these using `Fillomatic.config()`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Log domain sizes after each propagation step, and search totals
    pub log_steps: bool,
    /// Log how long each step took
    pub log_elapsed: bool,
    /// Log every candidate domain after each propagation step (these can be very large!)
    pub log_domains: bool,
    /// Log every assignment the search makes (at `trace` level)
    pub log_search: bool,
    /// Re-run arc consistency after each assignment, pruning the search more at the cost of
    /// copying the domains at every step
    pub maintain_arc_consistency: bool,
    /// Search the candidates of the first slot in parallel, returning whichever branch finds a
    /// solution first
    pub parallel: bool,
}
