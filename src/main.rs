use clap::Parser;
use delimited_validator::cli::{self, Args};
use std::process;

fn main() {
    // Missing arguments exit here with clap's usage error
    let args = Args::parse();

    if let Err(error) = cli::setup_logging(&args) {
        eprintln!("Failed to initialize logging: {:#}", error);
    }

    match cli::run(&args) {
        Ok(()) => process::exit(cli::success_code()),
        Err(error) => {
            cli::report_failure(&error, args.format);
            process::exit(cli::exit_code(&error));
        }
    }
}
