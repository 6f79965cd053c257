//! Command line front end: fill a crossword structure file from a word list file.

use argh::FromArgs;
use fillomatic::{Fillomatic, LoadError, Puzzle, WordList};
use log::LevelFilter;
use std::env;
use std::path::PathBuf;
use std::process;

/// Assume a classic terminal if we can't ask for its size.
const DEFAULT_TERMINAL_WIDTH: usize = 80;

/************************
 *     Main             *
 ************************/

/// fill-o-matic: fill a crossword with words from a word list
#[derive(Debug, Clone, FromArgs)]
struct Args {
    /// the crossword structure file: one line per row, '_' for open cells
    #[argh(positional)]
    structure: PathBuf,

    /// the word list file, one word per line
    #[argh(positional)]
    words: PathBuf,

    /// don't log anything besides the solution
    #[argh(switch, short = 'q', long = "quiet")]
    quiet: bool,

    /// log domain sizes after each propagation step
    #[argh(switch, long = "log-steps")]
    log_steps: bool,

    /// log how long each step took
    #[argh(switch, long = "log-elapsed")]
    log_elapsed: bool,

    /// log every candidate domain (these can be very large!)
    #[argh(switch, long = "log-domains")]
    log_domains: bool,

    /// log every assignment the search makes
    #[argh(switch, long = "log-search")]
    log_search: bool,

    /// re-run arc consistency after each assignment
    #[argh(switch, long = "maintain-arcs")]
    maintain_arcs: bool,

    /// search the first slot's candidates in parallel
    #[argh(switch, long = "parallel")]
    parallel: bool,

    /// log at debug level (trace level with --log-search)
    #[argh(switch, long = "debug")]
    debug: bool,
}

fn init_logger(args: &Args) {
    let level = if args.quiet {
        LevelFilter::Error
    } else if args.log_search {
        LevelFilter::Trace
    } else if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    // Let RUST_LOG override our defaults if explicitly set
    if let Ok(spec) = env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    builder.init();
}

fn load(args: &Args) -> Result<(Puzzle, WordList), LoadError> {
    let puzzle = Puzzle::load(&args.structure)?;
    let words = WordList::load(&args.words)?;
    Ok((puzzle, words))
}

fn main() {
    let args = argh::from_env::<Args>();
    init_logger(&args);

    let (puzzle, words) = load(&args).unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(1);
    });
    log::debug!(
        "Loaded a {}x{} grid with {} slots and {} words",
        puzzle.width(),
        puzzle.height(),
        puzzle.num_slots(),
        words.len()
    );

    let mut solver = Fillomatic::new(&puzzle, &words);
    if !args.quiet {
        solver.config().log_steps = args.log_steps;
        solver.config().log_elapsed = args.log_elapsed;
        solver.config().log_domains = args.log_domains;
        solver.config().log_search = args.log_search;
    }
    solver.config().maintain_arc_consistency = args.maintain_arcs;
    solver.config().parallel = args.parallel;

    match solver.solve() {
        None => println!("No solution."),
        Some(solution) => {
            let terminal_width = termsize::get()
                .map(|size| size.cols as usize)
                .unwrap_or(DEFAULT_TERMINAL_WIDTH);
            let grid = solution.display(&puzzle).spaced(true);
            let grid = if grid.text_width() <= terminal_width {
                grid
            } else {
                grid.spaced(false)
            };
            print!("{}", grid);
        }
    }
}
