use clap::Parser;
use jbw_viewer::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // Without a subcommand, show an overview instead of failing
    if args.command.is_none() {
        commands::print_overview(&args.reference_path);
        process::exit(0);
    }

    if let Err(error) = commands::run(args) {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}
