// imgpress-cli/src/main.rs
//
// Entry point for the imgpress binary: parses arguments, installs the
// logger, dispatches to the command and maps the result to an exit code.
// A run with per-file failures still exits 0 unless --fail-on-error is set.

use clap::Parser;
use imgpress_cli::{Cli, Commands, logging, run_convert, terminal};
use std::process;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Convert(args) => run_convert(args),
    };

    if let Err(e) = result {
        terminal::print_error(
            "imgpress failed",
            &format!("{e:#}"),
            Some("Run with --verbose for per-file details"),
        );
        process::exit(1);
    }
}
