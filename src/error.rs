use crate::puzzle::Slot;
use std::io;
use std::path::PathBuf;

/// Failure to build a `Puzzle` or `WordList` from its external description.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("slot {slot} does not fit in a {width}x{height} grid")]
    SlotOutOfBounds {
        slot: Slot,
        width: usize,
        height: usize,
    },

    #[error("slot {0} is listed twice")]
    DuplicateSlot(Slot),

    #[error("slots {0} and {1} lie along the same line and share cells")]
    CollinearSlots(Slot, Slot),

    #[error("slot {0} has length zero")]
    EmptySlot(Slot),
}
