//! File I/O wrappers around the core. Only the coordinator calls these.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::grid::Grid;

/// Read and parse the initial grid.
pub fn read_grid(path: &Path, rows: usize, cols: usize) -> Result<Grid> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })?;
    Grid::parse(&text, rows, cols)
}

/// Write the final grid, one row per line, cells separated by one space.
pub fn write_grid(path: &Path, grid: &Grid) -> Result<()> {
    let as_io_error = |source| Error::Io {
        path: path.to_owned(),
        source,
    };
    let file = File::create(path).map_err(as_io_error)?;
    let mut out = BufWriter::new(file);
    write!(out, "{grid}").map_err(as_io_error)?;
    out.flush().map_err(as_io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_write_then_read_round_trip() {
        let grid = Grid::parse("a l d a l d a l d", 3, 3).unwrap();
        let path = env::temp_dir().join("ecotone-io-round-trip.txt");
        write_grid(&path, &grid).unwrap();
        let back = read_grid(&path, 3, 3).unwrap();
        assert_eq!(back, grid);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_input_is_an_io_fault() {
        let err = read_grid(Path::new("no-such-grid.txt"), 8, 8).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
