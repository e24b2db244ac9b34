//! A worker's local band: its owned rows plus two ghost rows. The ghosts are
//! read-only copies of the adjacent workers' boundary rows, refreshed by the
//! halo exchange each step; `None` on a side means the band touches a global
//! grid edge there, which contributes nothing to any neighbor count.

use std::mem;

use crate::cell::Cell;
use crate::error::{Error, Result};

#[derive(Clone, Debug)]
pub struct Band {
    rows: usize,
    cols: usize,
    owned: Vec<Cell>,
    ghost_above: Option<Vec<Cell>>,
    ghost_below: Option<Vec<Cell>>,
}

impl Band {
    /// Wrap a scattered band. `owned` is row-major, `rows * cols` cells;
    /// both ghosts start empty until the first exchange.
    pub fn new(rows: usize, cols: usize, owned: Vec<Cell>) -> Result<Self> {
        if owned.len() != rows * cols {
            return Err(Error::BandShape {
                expected: rows * cols,
                found: owned.len(),
            });
        }
        Ok(Band {
            rows,
            cols,
            owned,
            ghost_above: None,
            ghost_below: None,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn owned(&self) -> &[Cell] {
        &self.owned
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        &self.owned[row * self.cols..(row + 1) * self.cols]
    }

    /// First owned row, the one sent upward. `None` for an empty band.
    pub fn first_row(&self) -> Option<&[Cell]> {
        (self.rows > 0).then(|| self.row(0))
    }

    /// Last owned row, the one sent downward. `None` for an empty band.
    pub fn last_row(&self) -> Option<&[Cell]> {
        (self.rows > 0).then(|| self.row(self.rows - 1))
    }

    /// Install the rows received by this step's exchange. Each present row
    /// must be exactly one row wide.
    pub fn set_ghosts(&mut self, above: Option<Vec<Cell>>, below: Option<Vec<Cell>>) -> Result<()> {
        for ghost in [&above, &below].into_iter().flatten() {
            if ghost.len() != self.cols {
                return Err(Error::HaloLength {
                    expected: self.cols,
                    found: ghost.len(),
                });
            }
        }
        self.ghost_above = above;
        self.ghost_below = below;
        Ok(())
    }

    /// Row lookup in band coordinates: `-1` is the upper ghost row, `rows`
    /// the lower one, anything else outside the owned range is off-grid.
    pub fn row_or_ghost(&self, index: isize) -> Option<&[Cell]> {
        match index {
            -1 => self.ghost_above.as_deref(),
            i if i >= 0 && (i as usize) < self.rows => Some(self.row(i as usize)),
            i if i >= 0 && i as usize == self.rows => self.ghost_below.as_deref(),
            _ => None,
        }
    }

    /// End-of-step commit: the freshly written next buffer becomes the
    /// owned state, and the old owned buffer is recycled as the next
    /// scratch. Ghosts are left stale; the next exchange replaces them
    /// before anything reads them again.
    pub fn commit(&mut self, next: &mut Vec<Cell>) {
        debug_assert_eq!(next.len(), self.owned.len());
        mem::swap(&mut self.owned, next);
    }
}
