//! Fill a small crossword with a ring of four words, checking the propagation steps as we go.
//!
//! Run with `RUST_LOG=info` to see the domain sizes after each step.

use fillomatic::{Fillomatic, Puzzle, WordList};

const STRUCTURE: &str = "\
____
_##_
_##_
____
";

const WORDS: &[&str] = &[
    "LAMP", "LOGS", "PITS", "SUDS", "SNOT", "LIMP", "GUST", "MAST", "GOAT", "POTS", "LAST",
    "SIFT", "DOG", "CAT",
];

fn main() {
    env_logger::init();

    println!("Filling a 4x4 ring.");
    println!();

    let puzzle = Puzzle::from_structure(STRUCTURE).unwrap();
    let words = WordList::new(WORDS.iter().copied());

    let mut solver = Fillomatic::new(&puzzle, &words);
    solver.config().log_steps = true;
    solver.config().maintain_arc_consistency = true;

    let domains = solver.propagate().unwrap();
    for (index, slot) in puzzle.slots().iter().enumerate() {
        println!("{}: {} candidates", slot, domains.len(index));
    }
    println!();

    match solver.solve() {
        None => println!("No solution."),
        Some(solution) => {
            for (slot, word) in solution.iter() {
                println!("{:>24}: {}", slot.to_string(), word);
            }
            println!();
            print!("{}", solution.display(&puzzle).spaced(true));
        }
    }
}
