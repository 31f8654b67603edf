//! Quarry CLI entry point.
//!
//! Runs the SELECT statement in `input_file` against the database in
//! `database_dir` and writes the result rows to `output_file` as CSV.

mod run;

use clap::Parser;

fn main() {
    let args = run::Args::parse();
    run::init_logger(args.verbose);
    if let Err(e) = run::run(&args) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
