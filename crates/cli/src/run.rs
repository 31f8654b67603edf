use clap::Parser;
use env_logger::Builder;
use log::{info, LevelFilter};
use quarry_core::{Error, Result};
use quarry_query::{executor, plan_select, sql, Catalog};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Run a SELECT statement over a directory of CSV tables.
#[derive(Parser, Debug)]
#[command(name = "quarry", version, about)]
pub struct Args {
    /// Database directory holding schema.txt and data/<table>.csv
    pub database_dir: PathBuf,
    /// File containing the SELECT statement
    pub input_file: PathBuf,
    /// Where to write the result rows
    pub output_file: PathBuf,
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = Builder::new()
        .filter_level(level)
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}

/// Loads the catalog, plans the query and writes its rows.
///
/// Returns the number of rows written.
pub fn run(args: &Args) -> Result<usize> {
    let catalog = Arc::new(Catalog::load(&args.database_dir)?);

    let query = fs::read_to_string(&args.input_file)
        .map_err(|e| Error::io(args.input_file.display().to_string(), e.to_string()))?;
    let stmt = sql::parse_select(&query)?;
    let mut root = plan_select(catalog, &stmt)?;

    // Rows go to a temporary file in the output directory; the output path
    // only appears once the whole plan has drained.
    let output = args.output_file.display().to_string();
    let dir = match args.output_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(|e| Error::io(&output, e.to_string()))?;
    let rows = {
        let mut out = BufWriter::new(staged.as_file_mut());
        executor::write_csv(&mut root, &mut out)?
    };
    staged
        .persist(&args.output_file)
        .map_err(|e| Error::io(&output, e.error.to_string()))?;
    info!("wrote {} rows to {}", rows, output);
    Ok(rows)
}
