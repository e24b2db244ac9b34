//! End-to-end runs over the in-process transport: every worker is a thread,
//! the protocol is the same as the MPI transport, and the whole pipeline
//! (broadcast, scatter, per-day halo exchange, gather) is exercised without
//! an MPI launcher.

use std::thread;

use ecotone::comm::local::LocalComm;
use ecotone::driver::{self, RunInput};
use ecotone::rules;
use ecotone::{Cell, Grid};

/// Run `grid` for `days` across `workers` threads and return the gathered
/// result from the coordinator.
fn run_partitioned(grid: &Grid, days: u64, workers: usize) -> Grid {
    let mut result = None;
    let handles: Vec<_> = LocalComm::bus(workers)
        .into_iter()
        .enumerate()
        .map(|(rank, comm)| {
            let input = (rank == 0).then(|| RunInput {
                grid: grid.clone(),
                days,
            });
            thread::spawn(move || driver::run(&comm, input).unwrap())
        })
        .collect();
    for handle in handles {
        if let Some(gathered) = handle.join().unwrap() {
            result = Some(gathered);
        }
    }
    result.expect("the coordinator returns the gathered grid")
}

/// Deterministic pseudo-random grid, so failures reproduce.
fn scrambled_grid(rows: usize, cols: usize, mut seed: u64) -> Grid {
    let cells = (0..rows * cols)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            match (seed >> 33) % 3 {
                0 => Cell::Tree,
                1 => Cell::Lake,
                _ => Cell::Desert,
            }
        })
        .collect();
    Grid::from_cells(rows, cols, cells).unwrap()
}

#[test]
fn test_scatter_gather_round_trip() {
    let grid = scrambled_grid(10, 7, 42);
    for workers in [1, 2, 3, 4, 7, 10] {
        assert_eq!(run_partitioned(&grid, 0, workers), grid, "workers={workers}");
    }
}

#[test]
fn test_round_trip_with_more_workers_than_rows() {
    let grid = scrambled_grid(3, 5, 7);
    assert_eq!(run_partitioned(&grid, 0, 6), grid);
    assert_eq!(run_partitioned(&grid, 2, 6), rules::simulate(&grid, 2));
}

#[test]
fn test_single_worker_matches_sequential_reference() {
    let grid = scrambled_grid(8, 8, 1234);
    for days in [0, 1, 2, 5, 10] {
        assert_eq!(
            run_partitioned(&grid, days, 1),
            rules::simulate(&grid, days),
            "days={days}"
        );
    }
}

#[test]
fn test_partition_count_does_not_change_the_result() {
    let grid = scrambled_grid(12, 9, 99);
    let reference = run_partitioned(&grid, 6, 1);
    assert_eq!(reference, rules::simulate(&grid, 6));
    for workers in [2, 3, 4, 5, 12] {
        assert_eq!(run_partitioned(&grid, 6, workers), reference, "workers={workers}");
    }
}

#[test]
fn test_zero_days_returns_input_unchanged() {
    let grid = scrambled_grid(9, 4, 5);
    for workers in [1, 3, 9] {
        assert_eq!(run_partitioned(&grid, 0, workers), grid, "workers={workers}");
    }
}

#[test]
fn test_activity_straddling_a_partition_boundary() {
    // 8x8 grid, tree at (3,3) ringed by lakes. With two workers the ring
    // spans the partition line between rows 3 and 4, so the step only
    // comes out right if the ghost rows carry the real boundary data.
    let mut symbols = vec!['d'; 64];
    for r in 2..=4 {
        for c in 2..=4 {
            symbols[r * 8 + c] = 'l';
        }
    }
    symbols[3 * 8 + 3] = 'a';
    let text: String = symbols.iter().collect();
    let grid = Grid::parse(&text, 8, 8).unwrap();

    let sequential = rules::simulate(&grid, 1);
    assert_eq!(sequential.get(3, 3), Cell::Lake);
    for workers in [2, 4, 8] {
        assert_eq!(run_partitioned(&grid, 1, workers), sequential, "workers={workers}");
    }
}

#[test]
fn test_long_run_stays_partition_invariant() {
    let grid = scrambled_grid(16, 6, 2024);
    let reference = rules::simulate(&grid, 20);
    for workers in [2, 5, 16] {
        assert_eq!(run_partitioned(&grid, 20, workers), reference, "workers={workers}");
    }
}
