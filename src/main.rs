//! MPI launcher. Run as `mpirun -np <workers> ecotone <input> <days>`.
//! Rank 0 reads the input grid and writes the final one; every rank runs
//! the same simulation loop.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use mpi::traits::Communicator as _;

use ecotone::comm::mpi::MpiComm;
use ecotone::comm::{Communicator, COORDINATOR};
use ecotone::driver::{self, RunInput};
use ecotone::io;

#[derive(Parser, Debug)]
#[command(name = "ecotone", version, about = "Distributed three-state ecosystem automaton")]
struct Cli {
    /// Input grid file
    input: PathBuf,

    /// Number of simulated days
    days: u64,

    /// Grid height in rows
    #[arg(short = 'r', long, default_value_t = 8, value_parser = clap::value_parser!(u64).range(1..))]
    rows: u64,

    /// Grid width in columns
    #[arg(short = 'c', long, default_value_t = 8, value_parser = clap::value_parser!(u64).range(1..))]
    cols: u64,

    /// Where to write the final grid
    #[arg(short = 'o', long, default_value = "final.txt")]
    output: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let Some(universe) = mpi::initialize() else {
        eprintln!("failed to initialize MPI");
        return ExitCode::FAILURE;
    };
    let world = universe.world();
    let rank = world.rank();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(usage) => {
            // Bad usage is not a runtime failure: rank 0 explains, everyone
            // exits cleanly, and MPI finalizes on the way out.
            if rank == 0 {
                let _ = usage.print();
            }
            return ExitCode::SUCCESS;
        }
    };

    let comm = MpiComm::new(world);
    let input = if comm.rank() == COORDINATOR {
        let grid = match io::read_grid(&cli.input, cli.rows as usize, cli.cols as usize) {
            Ok(grid) => grid,
            // The workers are already waiting on the header broadcast;
            // only an abort reaches them all.
            Err(err) => {
                error!("{err}");
                comm.abort(1);
            }
        };
        info!(
            "{}x{} grid, {} workers, {} days",
            grid.rows(),
            grid.cols(),
            comm.size(),
            cli.days,
        );
        Some(RunInput {
            grid,
            days: cli.days,
        })
    } else {
        None
    };

    match driver::run(&comm, input) {
        Ok(Some(grid)) => {
            if let Err(err) = io::write_grid(&cli.output, &grid) {
                error!("{err}");
                comm.abort(1);
            }
            info!("final grid written to {}", cli.output.display());
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(err) => {
            error!("rank {rank}: {err}");
            comm.abort(1);
        }
    }
}
