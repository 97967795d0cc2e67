use std::process::ExitCode;

use clap::Parser;
use tracker_cli::TrackerCli;

fn main() -> ExitCode {
    tracker_cli::init_logging();

    let cli = TrackerCli::parse();
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
