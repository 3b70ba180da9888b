use clap::Parser;
use stratbench::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
