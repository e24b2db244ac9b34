//! The full grid. It lives on the coordinator before scatter and after
//! gather; workers only ever see their own band.

use std::fmt;

use crate::cell::{self, Cell};
use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid from row-major cells, checking the shape.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<Cell>) -> Result<Self> {
        if cells.len() != rows * cols {
            return Err(Error::CellCount {
                expected: rows * cols,
                found: cells.len(),
            });
        }
        Ok(Grid { rows, cols, cells })
    }

    /// Parse a whitespace-tolerant sequence of exactly `rows * cols`
    /// single-character tokens. Anything outside {a, l, d} is rejected
    /// with its position.
    pub fn parse(text: &str, rows: usize, cols: usize) -> Result<Self> {
        let mut cells = Vec::with_capacity(rows * cols);
        for (index, symbol) in text.chars().filter(|c| !c.is_whitespace()).enumerate() {
            let cell = Cell::from_symbol(symbol).ok_or(Error::Symbol { symbol, index })?;
            cells.push(cell);
        }
        Self::from_cells(rows, cols, cells)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Row-major wire form for the collectives.
    pub fn to_bytes(&self) -> Vec<u8> {
        cell::encode(&self.cells)
    }

    pub fn from_bytes(rows: usize, cols: usize, bytes: &[u8]) -> Result<Self> {
        Self::from_cells(rows, cols, cell::decode(bytes)?)
    }
}

impl fmt::Display for Grid {
    /// Output-file form: one row per line, cells separated by one space.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.get(row, col).symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
