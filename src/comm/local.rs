//! In-process transport: one thread per worker, a dedicated unbounded
//! channel per ordered worker pair, the same protocol as the MPI transport.
//! Sends never block, so the non-blocking halo contract holds trivially,
//! and a worker that dies drops the only sender feeding each of its pair
//! channels, which surfaces on its peers as a fatal `PeerLost` instead of
//! a hang.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::cell::{self, Cell};
use crate::comm::{Communicator, HaloRows, RunHeader, COORDINATOR};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::partition::{Links, Plan};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tag {
    Header,
    Scatter,
    Gather,
    RowUp,
    RowDown,
}

#[derive(Debug)]
struct Packet {
    src: usize,
    tag: Tag,
    payload: Vec<u8>,
}

pub struct LocalComm {
    rank: usize,
    /// `to_peers[d]` feeds rank `d`'s inbox for messages from this rank.
    to_peers: Vec<Sender<Packet>>,
    /// `from_peers[s]` holds everything rank `s` sent here, in send order.
    from_peers: Vec<Receiver<Packet>>,
    /// Messages that arrived ahead of the one being waited for.
    stash: RefCell<VecDeque<Packet>>,
}

impl LocalComm {
    /// Wire up `size` fully connected endpoints, one per worker thread.
    pub fn bus(size: usize) -> Vec<LocalComm> {
        assert!(size > 0, "a run needs at least one worker");
        let mut senders: Vec<Vec<Sender<Packet>>> = (0..size).map(|_| Vec::new()).collect();
        let mut receivers: Vec<Vec<Receiver<Packet>>> = (0..size).map(|_| Vec::new()).collect();
        for src in 0..size {
            for dst in 0..size {
                let (tx, rx) = channel();
                senders[src].push(tx);
                receivers[dst].push(rx);
            }
        }
        senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (to_peers, from_peers))| LocalComm {
                rank,
                to_peers,
                from_peers,
                stash: RefCell::new(VecDeque::new()),
            })
            .collect()
    }

    fn send(&self, dst: usize, tag: Tag, payload: Vec<u8>) -> Result<()> {
        self.to_peers[dst]
            .send(Packet {
                src: self.rank,
                tag,
                payload,
            })
            .map_err(|_| Error::PeerLost { rank: dst })
    }

    /// Blocking receive of the message with the given source and tag,
    /// stashing anything from that source that arrives in between.
    fn recv_matching(&self, src: usize, tag: Tag) -> Result<Vec<u8>> {
        {
            let mut stash = self.stash.borrow_mut();
            if let Some(pos) = stash.iter().position(|p| p.src == src && p.tag == tag) {
                let packet = stash.remove(pos).expect("position came from this stash");
                return Ok(packet.payload);
            }
        }
        loop {
            let packet = self.from_peers[src]
                .recv()
                .map_err(|_| Error::PeerLost { rank: src })?;
            if packet.tag == tag {
                return Ok(packet.payload);
            }
            self.stash.borrow_mut().push_back(packet);
        }
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.to_peers.len()
    }

    fn broadcast_header(&self, header: &mut RunHeader) -> Result<()> {
        if self.rank == COORDINATOR {
            let mut payload = Vec::with_capacity(24);
            for word in [header.rows, header.cols, header.days] {
                payload.extend_from_slice(&word.to_le_bytes());
            }
            for dst in 0..self.size() {
                if dst != COORDINATOR {
                    self.send(dst, Tag::Header, payload.clone())?;
                }
            }
        } else {
            let payload = self.recv_matching(COORDINATOR, Tag::Header)?;
            let word = |i: usize| {
                u64::from_le_bytes(payload[i * 8..(i + 1) * 8].try_into().expect("8-byte word"))
            };
            *header = RunHeader {
                rows: word(0),
                cols: word(1),
                days: word(2),
            };
        }
        Ok(())
    }

    fn scatter_rows(&self, full: Option<&Grid>, plan: &Plan) -> Result<Vec<Cell>> {
        if self.rank == COORDINATOR {
            let grid = full.ok_or(Error::GridMissing)?;
            let mut mine = Vec::new();
            for (rank, share) in plan.shares().iter().enumerate() {
                let start = share.offset * plan.cols();
                let end = start + share.rows * plan.cols();
                let rows = &grid.cells()[start..end];
                if rank == COORDINATOR {
                    mine = rows.to_vec();
                } else {
                    self.send(rank, Tag::Scatter, cell::encode(rows))?;
                }
            }
            Ok(mine)
        } else {
            let cells = cell::decode(&self.recv_matching(COORDINATOR, Tag::Scatter)?)?;
            let expected = plan.share(self.rank).rows * plan.cols();
            if cells.len() != expected {
                return Err(Error::ScatterMismatch {
                    rank: self.rank,
                    expected,
                    found: cells.len(),
                });
            }
            Ok(cells)
        }
    }

    fn gather_rows(&self, owned: &[Cell], plan: &Plan) -> Result<Option<Grid>> {
        if self.rank == COORDINATOR {
            let mut cells = Vec::with_capacity(plan.rows() * plan.cols());
            for (rank, share) in plan.shares().iter().enumerate() {
                let part = if rank == COORDINATOR {
                    owned.to_vec()
                } else {
                    cell::decode(&self.recv_matching(rank, Tag::Gather)?)?
                };
                let expected = share.rows * plan.cols();
                if part.len() != expected {
                    return Err(Error::GatherMismatch {
                        rank,
                        expected,
                        found: part.len(),
                    });
                }
                cells.extend_from_slice(&part);
            }
            Ok(Some(Grid::from_cells(plan.rows(), plan.cols(), cells)?))
        } else {
            self.send(COORDINATOR, Tag::Gather, cell::encode(owned))?;
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
        // Both sends go out before either receive; channel sends are
        // non-blocking, so neighbors cannot wedge on each other.
        if let (Some(rank), Some(row)) = (links.above, up_row) {
            self.send(rank, Tag::RowUp, cell::encode(row))?;
        }
        if let (Some(rank), Some(row)) = (links.below, down_row) {
            self.send(rank, Tag::RowDown, cell::encode(row))?;
        }
        let mut halo = HaloRows::default();
        if let Some(rank) = links.above {
            let row = cell::decode(&self.recv_matching(rank, Tag::RowDown)?)?;
            if row.len() != cols {
                return Err(Error::HaloLength {
                    expected: cols,
                    found: row.len(),
                });
            }
            halo.above = Some(row);
        }
        if let Some(rank) = links.below {
            let row = cell::decode(&self.recv_matching(rank, Tag::RowUp)?)?;
            if row.len() != cols {
                return Err(Error::HaloLength {
                    expected: cols,
                    found: row.len(),
                });
            }
            halo.below = Some(row);
        }
        Ok(halo)
    }

    fn abort(&self, code: i32) -> ! {
        // Unwinding drops this endpoint, which is what unblocks the peers.
        panic!("worker {} aborted the run (code {code})", self.rank);
    }
}
