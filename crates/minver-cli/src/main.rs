//! `minver` entry point: parse arguments, set up logging, dispatch.

use std::process::ExitCode;

use clap::Parser;
use minver_cli::{cli, commands, error, logger, ui};

fn main() -> miette::Result<ExitCode> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init(args.no_color, args.quiet);

    let config = args.config.as_deref();
    let result = match args.command {
        cli::Command::Check(check_args) => commands::check_execute(check_args, config),
        cli::Command::BuildStore(store_args) => commands::build_store_execute(store_args, config),
    };

    result
        .map(ExitCode::from)
        .map_err(error::cli_error_to_miette)
}
