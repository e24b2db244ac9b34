//! Distributed three-state ecosystem automaton.
//!
//! A grid of tree/lake/desert cells evolves under an 8-neighborhood rule,
//! partitioned by rows across cooperating workers. Each worker owns a
//! contiguous band plus one ghost row per vertical neighbor; the ghosts are
//! refreshed by a non-blocking halo exchange every step, so boundary cells
//! see the same neighbor counts they would in an unpartitioned run.

pub mod band;
pub mod cell;
pub mod comm;
pub mod driver;
pub mod error;
pub mod grid;
pub mod io;
pub mod partition;
pub mod rules;

pub use band::Band;
pub use cell::Cell;
pub use error::{Error, Result};
pub use grid::Grid;
pub use partition::{Links, Plan, Share};
