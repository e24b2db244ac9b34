//! Worker-to-worker communication. The simulation driver talks to one
//! `Communicator`; the MPI transport backs real multi-process runs, and the
//! channel transport backs multi-worker tests inside a single process.

pub mod local;
pub mod mpi;

use crate::cell::Cell;
use crate::error::Result;
use crate::grid::Grid;
use crate::partition::{Links, Plan};

/// Rank that owns the full grid, reads input, and writes output.
pub const COORDINATOR: usize = 0;

/// Run metadata the coordinator broadcasts before anything is partitioned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunHeader {
    pub rows: u64,
    pub cols: u64,
    pub days: u64,
}

/// What one halo exchange produced: the boundary row of the worker above
/// and below, where such a worker exists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HaloRows {
    pub above: Option<Vec<Cell>>,
    pub below: Option<Vec<Cell>>,
}

pub trait Communicator {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    /// Coordinator's header reaches every worker; non-coordinators pass a
    /// default and get it overwritten.
    fn broadcast_header(&self, header: &mut RunHeader) -> Result<()>;

    /// Deliver each worker exactly its owned rows. `full` is read only on
    /// the coordinator, which must hold the grid when it gets here.
    fn scatter_rows(&self, full: Option<&Grid>, plan: &Plan) -> Result<Vec<Cell>>;

    /// Variable-length inverse of scatter: reassemble the full grid on the
    /// coordinator in partition order. Everyone else gets `None`.
    fn gather_rows(&self, owned: &[Cell], plan: &Plan) -> Result<Option<Grid>>;

    /// One step's ghost-row exchange. `up_row`/`down_row` are this worker's
    /// first and last owned rows, present exactly when the matching link
    /// is. All underlying operations are issued before any is waited on,
    /// and all must complete before the result is handed back.
    fn exchange_halo(
        &self,
        links: &Links,
        cols: usize,
        up_row: Option<&[Cell]>,
        down_row: Option<&[Cell]>,
    ) -> Result<HaloRows>;

    /// Tear down the whole run. Used when a local fault would otherwise
    /// leave the other workers blocked forever.
    fn abort(&self, code: i32) -> !;
}
