use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can end a run. There is no retry path anywhere in the
/// system; every variant is terminal.
#[derive(Debug, Error)]
pub enum Error {
    /// Input unreadable or output unwritable.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An input or wire symbol outside {a, l, d}.
    #[error("invalid cell symbol {symbol:?} at cell {index}")]
    Symbol { symbol: char, index: usize },

    /// Input holds the wrong number of cells for the configured dimensions.
    #[error("grid needs {expected} cells, input has {found}")]
    CellCount { expected: usize, found: usize },

    /// A band buffer disagrees with its declared dimensions.
    #[error("band needs {expected} cells, got {found}")]
    BandShape { expected: usize, found: usize },

    /// A halo message did not carry exactly one row.
    #[error("halo row carries {found} cells, expected {expected}")]
    HaloLength { expected: usize, found: usize },

    /// Scatter delivered a band that disagrees with the partition.
    #[error("scatter delivered {found} cells to rank {rank}, partition promised {expected}")]
    ScatterMismatch {
        rank: usize,
        expected: usize,
        found: usize,
    },

    /// Gather received a band that disagrees with the partition.
    #[error("gather received {found} cells from rank {rank}, partition promised {expected}")]
    GatherMismatch {
        rank: usize,
        expected: usize,
        found: usize,
    },

    /// The coordinator reached scatter without the full grid in hand.
    #[error("coordinator entered scatter without the full grid")]
    GridMissing,

    /// A peer went away while we were waiting on its message.
    #[error("worker {rank} is gone; the exchange cannot complete")]
    PeerLost { rank: usize },
}
