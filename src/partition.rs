//! The row partition: which worker owns which contiguous band of grid rows,
//! and which workers sit directly above and below it. Computed once per run
//! on every rank from the broadcast header, immutable afterward.

/// One worker's slice of the grid: owned row count plus starting row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Share {
    pub rows: usize,
    pub offset: usize,
}

/// A worker's vertical neighbors, by rank. `None` marks a global grid edge
/// on that side (or a worker that owns no rows at all).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Links {
    pub above: Option<usize>,
    pub below: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct Plan {
    rows: usize,
    cols: usize,
    shares: Vec<Share>,
}

impl Plan {
    /// Balance `rows` across `workers` in rank order: `rows / workers` each,
    /// with the remainder rows going one apiece to the lowest ranks. With
    /// more workers than rows the trailing ranks own zero rows, which is
    /// legal and must stay a no-op everywhere downstream.
    pub fn new(rows: usize, cols: usize, workers: usize) -> Self {
        assert!(workers > 0, "a run needs at least one worker");
        let base = rows / workers;
        let remainder = rows % workers;
        let mut shares = Vec::with_capacity(workers);
        let mut offset = 0;
        for rank in 0..workers {
            let count = base + usize::from(rank < remainder);
            shares.push(Share {
                rows: count,
                offset,
            });
            offset += count;
        }
        Plan { rows, cols, shares }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn workers(&self) -> usize {
        self.shares.len()
    }

    pub fn share(&self, rank: usize) -> Share {
        self.shares[rank]
    }

    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    /// Neighbor existence for `rank`, resolved once from the partition.
    /// The neighbor on each side is the nearest rank with a non-empty
    /// share; empty shares are skipped so their owners drop out of the
    /// exchange entirely.
    pub fn links(&self, rank: usize) -> Links {
        if self.shares[rank].rows == 0 {
            return Links::default();
        }
        let above = self.shares[..rank].iter().rposition(|s| s.rows > 0);
        let below = self.shares[rank + 1..]
            .iter()
            .position(|s| s.rows > 0)
            .map(|i| rank + 1 + i);
        Links { above, below }
    }

    /// Per-worker element counts for the variable-count collectives.
    pub fn elem_counts(&self) -> Vec<i32> {
        self.shares
            .iter()
            .map(|s| (s.rows * self.cols) as i32)
            .collect()
    }

    /// Per-worker element displacements for the variable-count collectives.
    pub fn elem_displs(&self) -> Vec<i32> {
        self.shares
            .iter()
            .map(|s| (s.offset * self.cols) as i32)
            .collect()
    }
}
