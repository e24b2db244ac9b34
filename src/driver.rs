//! The lockstep simulation loop every worker runs: broadcast the header,
//! plan the partition, scatter, then for each day exchange ghosts, apply
//! the rule, commit, and finally gather the result on the coordinator.

use log::{debug, trace};

use crate::band::Band;
use crate::cell::Cell;
use crate::comm::{Communicator, RunHeader};
use crate::error::Result;
use crate::grid::Grid;
use crate::partition::Plan;
use crate::rules;

/// What the coordinator brings to the run. Every other worker passes
/// `None` and learns the shape from the header broadcast.
#[derive(Debug)]
pub struct RunInput {
    pub grid: Grid,
    pub days: u64,
}

/// Run the whole simulation on this worker. Returns the final grid on the
/// coordinator and `None` everywhere else.
pub fn run<C: Communicator>(comm: &C, input: Option<RunInput>) -> Result<Option<Grid>> {
    let (full, mut header) = match input {
        Some(RunInput { grid, days }) => {
            let header = RunHeader {
                rows: grid.rows() as u64,
                cols: grid.cols() as u64,
                days,
            };
            (Some(grid), header)
        }
        None => (None, RunHeader::default()),
    };
    comm.broadcast_header(&mut header)?;

    let plan = Plan::new(header.rows as usize, header.cols as usize, comm.size());
    let share = plan.share(comm.rank());
    let links = plan.links(comm.rank());
    debug!(
        "rank {} owns {} rows at offset {} (above: {:?}, below: {:?})",
        comm.rank(),
        share.rows,
        share.offset,
        links.above,
        links.below,
    );

    let owned = comm.scatter_rows(full.as_ref(), &plan)?;
    let mut band = Band::new(share.rows, plan.cols(), owned)?;
    let mut next = vec![Cell::Desert; share.rows * plan.cols()];

    for day in 0..header.days {
        // The exchange for a step only ever sees committed rows: the commit
        // below finishes before the next iteration sends anything.
        let halo = comm.exchange_halo(&links, plan.cols(), band.first_row(), band.last_row())?;
        band.set_ghosts(halo.above, halo.below)?;
        rules::step_band(&band, &mut next);
        band.commit(&mut next);
        trace!("rank {} committed day {}", comm.rank(), day + 1);
    }

    comm.gather_rows(band.owned(), &plan)
}
