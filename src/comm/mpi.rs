//! MPI transport. Collectives carry the grid as its wire bytes; the halo
//! rows travel as tagged point-to-point messages, issued non-blocking in
//! both directions and completed with one wait-all so that two adjacent
//! workers can never deadlock on each other's sends.

use ::mpi::datatype::{Partition, PartitionMut};
use ::mpi::point_to_point::Status;
use ::mpi::request::{multiple_scope, RequestCollection};
use ::mpi::topology::SimpleCommunicator;
use ::mpi::traits::{Communicator as _, Destination as _, Root as _, Source as _};
use ::mpi::{Rank, Tag};

use crate::cell::{self, Cell};
use crate::comm::{Communicator, HaloRows, RunHeader, COORDINATOR};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::partition::{Links, Plan};

/// A row traveling toward a lower rank.
const TAG_ROW_UP: Tag = 0;
/// A row traveling toward a higher rank.
const TAG_ROW_DOWN: Tag = 1;

pub struct MpiComm {
    world: SimpleCommunicator,
}

impl MpiComm {
    pub fn new(world: SimpleCommunicator) -> Self {
        MpiComm { world }
    }
}

impl Communicator for MpiComm {
    fn rank(&self) -> usize {
        self.world.rank() as usize
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }

    fn broadcast_header(&self, header: &mut RunHeader) -> Result<()> {
        let mut buf = [header.rows, header.cols, header.days];
        self.world
            .process_at_rank(COORDINATOR as Rank)
            .broadcast_into(&mut buf);
        *header = RunHeader {
            rows: buf[0],
            cols: buf[1],
            days: buf[2],
        };
        Ok(())
    }

    fn scatter_rows(&self, full: Option<&Grid>, plan: &Plan) -> Result<Vec<Cell>> {
        let share = plan.share(self.rank());
        let mut local = vec![0u8; share.rows * plan.cols()];
        let root = self.world.process_at_rank(COORDINATOR as Rank);
        if self.rank() == COORDINATOR {
            let grid = full.ok_or(Error::GridMissing)?;
            let bytes = grid.to_bytes();
            let counts = plan.elem_counts();
            let displs = plan.elem_displs();
            let partition = Partition::new(&bytes[..], counts, displs);
            root.scatter_varcount_into_root(&partition, &mut local[..]);
        } else {
            root.scatter_varcount_into(&mut local[..]);
        }
        let cells = cell::decode(&local)?;
        if cells.len() != share.rows * plan.cols() {
            return Err(Error::ScatterMismatch {
                rank: self.rank(),
                expected: share.rows * plan.cols(),
                found: cells.len(),
            });
        }
        Ok(cells)
    }

    fn gather_rows(&self, owned: &[Cell], plan: &Plan) -> Result<Option<Grid>> {
        let bytes = cell::encode(owned);
        let root = self.world.process_at_rank(COORDINATOR as Rank);
        if self.rank() == COORDINATOR {
            let mut all = vec![0u8; plan.rows() * plan.cols()];
            {
                let counts = plan.elem_counts();
                let displs = plan.elem_displs();
                let mut partition = PartitionMut::new(&mut all[..], counts, displs);
                root.gather_varcount_into_root(&bytes[..], &mut partition);
            }
            Ok(Some(Grid::from_bytes(plan.rows(), plan.cols(), &all)?))
        } else {
            root.gather_varcount_into(&bytes[..]);
            Ok(None)
        }
    }

    fn exchange_halo(
        &self,
        links: &Links,
        cols: usize,
        up_row: Option<&[Cell]>,
        down_row: Option<&[Cell]>,
    ) -> Result<HaloRows> {
        if links.above.is_none() && links.below.is_none() {
            return Ok(HaloRows::default());
        }

        let up_bytes = up_row.map(cell::encode);
        let down_bytes = down_row.map(cell::encode);
        let mut above_buf = links.above.map(|_| vec![0u8; cols]);
        let mut below_buf = links.below.map(|_| vec![0u8; cols]);

        multiple_scope(4, |scope, coll: &mut RequestCollection<[u8]>| {
            if let (Some(rank), Some(bytes)) = (links.above, up_bytes.as_ref()) {
                let peer = self.world.process_at_rank(rank as Rank);
                coll.add(peer.immediate_send_with_tag(scope, &bytes[..], TAG_ROW_UP));
            }
            if let (Some(rank), Some(buf)) = (links.above, above_buf.as_mut()) {
                let peer = self.world.process_at_rank(rank as Rank);
                coll.add(peer.immediate_receive_into_with_tag(scope, &mut buf[..], TAG_ROW_DOWN));
            }
            if let (Some(rank), Some(bytes)) = (links.below, down_bytes.as_ref()) {
                let peer = self.world.process_at_rank(rank as Rank);
                coll.add(peer.immediate_send_with_tag(scope, &bytes[..], TAG_ROW_DOWN));
            }
            if let (Some(rank), Some(buf)) = (links.below, below_buf.as_mut()) {
                let peer = self.world.process_at_rank(rank as Rank);
                coll.add(peer.immediate_receive_into_with_tag(scope, &mut buf[..], TAG_ROW_UP));
            }

            // Ghost rows must not be read until every pending operation,
            // in both directions, has finished.
            let mut statuses: Vec<(usize, Status, &[u8])> = Vec::with_capacity(4);
            coll.wait_all(&mut statuses);
        });

        Ok(HaloRows {
            above: above_buf.map(|buf| cell::decode(&buf)).transpose()?,
            below: below_buf.map(|buf| cell::decode(&buf)).transpose()?,
        })
    }

    fn abort(&self, code: i32) -> ! {
        self.world.abort(code)
    }
}
