//! The transition rule and the engines that apply it: the band engine every
//! worker runs each day, and a sequential full-grid engine that doubles as
//! the reference implementation in the tests.

use crate::band::Band;
use crate::cell::Cell;
use crate::grid::Grid;

/// Next state of one cell from its Moore-neighborhood composition. The
/// clauses are ordered; the first match wins.
pub fn transition(current: Cell, trees: u32, lakes: u32) -> Cell {
    match current {
        Cell::Tree if lakes >= 4 => Cell::Lake,
        Cell::Lake if lakes < 3 => Cell::Desert,
        Cell::Desert if trees >= 3 => Cell::Tree,
        Cell::Tree if trees > 4 => Cell::Desert,
        unchanged => unchanged,
    }
}

fn tally(cell: Cell, trees: &mut u32, lakes: &mut u32) {
    match cell {
        Cell::Tree => *trees += 1,
        Cell::Lake => *lakes += 1,
        Cell::Desert => {}
    }
}

/// Tree and lake counts around column `col` of `here`, given the rows above
/// and below (absent at a grid edge). Columns clamp at the sides; nothing
/// wraps around.
fn count_neighbors(
    above: Option<&[Cell]>,
    here: &[Cell],
    below: Option<&[Cell]>,
    col: usize,
) -> (u32, u32) {
    let mut trees = 0;
    let mut lakes = 0;
    let lo = col.saturating_sub(1);
    let hi = if col + 1 < here.len() { col + 1 } else { col };
    if let Some(row) = above {
        for c in lo..=hi {
            tally(row[c], &mut trees, &mut lakes);
        }
    }
    for c in lo..=hi {
        if c != col {
            tally(here[c], &mut trees, &mut lakes);
        }
    }
    if let Some(row) = below {
        for c in lo..=hi {
            tally(row[c], &mut trees, &mut lakes);
        }
    }
    (trees, lakes)
}

/// One synchronous step over a worker's band: reads the owned rows and the
/// ghost rows, writes every owned cell's next state into `next`. Ghost rows
/// are only ever read; a missing ghost contributes zero to every count.
pub fn step_band(band: &Band, next: &mut [Cell]) {
    let cols = band.cols();
    debug_assert_eq!(next.len(), band.rows() * cols);
    for row in 0..band.rows() {
        let above = band.row_or_ghost(row as isize - 1);
        let here = band.row(row);
        let below = band.row_or_ghost(row as isize + 1);
        for col in 0..cols {
            let (trees, lakes) = count_neighbors(above, here, below, col);
            next[row * cols + col] = transition(here[col], trees, lakes);
        }
    }
}

/// One synchronous step over a whole grid, no partitioning involved.
pub fn step_grid(grid: &Grid) -> Grid {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut next = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        let above = (row > 0).then(|| grid.row(row - 1));
        let here = grid.row(row);
        let below = (row + 1 < rows).then(|| grid.row(row + 1));
        for col in 0..cols {
            let (trees, lakes) = count_neighbors(above, here, below, col);
            next.push(transition(here[col], trees, lakes));
        }
    }
    Grid::from_cells(rows, cols, next).expect("step preserves the grid shape")
}

/// Sequential reference run: `days` synchronous steps over the whole grid.
pub fn simulate(grid: &Grid, days: u64) -> Grid {
    let mut current = grid.clone();
    for _ in 0..days {
        current = step_grid(&current);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: usize, cols: usize, symbols: &str) -> Grid {
        Grid::parse(symbols, rows, cols).unwrap()
    }

    #[test]
    fn test_transition_priority_order() {
        // A tree crowded by both lakes and trees drowns before it withers:
        // the lake clause is checked first.
        assert_eq!(transition(Cell::Tree, 5, 4), Cell::Lake);
        assert_eq!(transition(Cell::Tree, 5, 3), Cell::Desert);
        assert_eq!(transition(Cell::Tree, 4, 3), Cell::Tree);
    }

    #[test]
    fn test_transition_lake_and_desert() {
        assert_eq!(transition(Cell::Lake, 0, 2), Cell::Desert);
        assert_eq!(transition(Cell::Lake, 0, 3), Cell::Lake);
        assert_eq!(transition(Cell::Desert, 3, 0), Cell::Tree);
        assert_eq!(transition(Cell::Desert, 2, 0), Cell::Desert);
    }

    #[test]
    fn test_tree_surrounded_by_lakes_drowns() {
        // 8x8, tree at (3,3), all 8 neighbors lakes: rule 1 fires.
        let mut symbols = vec!['d'; 64];
        for r in 2..=4 {
            for c in 2..=4 {
                symbols[r * 8 + c] = 'l';
            }
        }
        symbols[3 * 8 + 3] = 'a';
        let text: String = symbols.iter().collect();
        let next = step_grid(&grid(8, 8, &text));
        assert_eq!(next.get(3, 3), Cell::Lake);
    }

    #[test]
    fn test_lake_with_two_lake_neighbors_dries() {
        // Center lake sees exactly 2 lakes, rest desert.
        let next = step_grid(&grid(3, 3, "ldd dld dld"));
        assert_eq!(next.get(1, 1), Cell::Desert);
    }

    #[test]
    fn test_corner_tree_missing_neighbors_contribute_nothing() {
        // Tree at (0,0) with its only 3 real neighbors all lakes:
        // lake count is 3, not 8, so rule 1 does not fire.
        let next = step_grid(&grid(3, 3, "ald lld ddd"));
        assert_eq!(next.get(0, 0), Cell::Tree);
    }

    #[test]
    fn test_band_edges_match_grid_edges() {
        // A single-worker band with no ghosts must behave exactly like the
        // whole grid.
        let full = grid(4, 3, "ala ldl dad all");
        let band = crate::band::Band::new(4, 3, full.cells().to_vec()).unwrap();
        let mut next = vec![Cell::Desert; 12];
        step_band(&band, &mut next);
        assert_eq!(next, step_grid(&full).cells());
    }

    #[test]
    fn test_band_ghosts_stand_in_for_neighbor_rows() {
        // Split a 4x3 grid into two 2-row bands and hand each the other's
        // boundary row as a ghost; the pieces must reproduce the full step.
        let full = grid(4, 3, "ala ldl dad all");
        let stepped = step_grid(&full);

        let mut top = crate::band::Band::new(2, 3, full.cells()[..6].to_vec()).unwrap();
        top.set_ghosts(None, Some(full.row(2).to_vec())).unwrap();
        let mut top_next = vec![Cell::Desert; 6];
        step_band(&top, &mut top_next);
        assert_eq!(top_next, stepped.cells()[..6]);

        let mut bottom = crate::band::Band::new(2, 3, full.cells()[6..].to_vec()).unwrap();
        bottom.set_ghosts(Some(full.row(1).to_vec()), None).unwrap();
        let mut bottom_next = vec![Cell::Desert; 6];
        step_band(&bottom, &mut bottom_next);
        assert_eq!(bottom_next, stepped.cells()[6..]);
    }

    #[test]
    fn test_zero_days_is_identity() {
        let full = grid(2, 2, "al da");
        assert_eq!(simulate(&full, 0), full);
    }
}
