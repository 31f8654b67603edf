//! Sequential table scan executor.

use crate::catalog::Catalog;
use quarry_core::{Error, Result, Tuple};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Table scan executor - reads a table file one row per line.
///
/// Storage format: a line that is empty or whitespace-only, after a trailing
/// `\r` is removed, is not a row. The scan yields the file's remaining lines
/// in file order.
pub struct TableScanExecutor {
    table: String,
    path: PathBuf,
    lines: Lines<BufReader<File>>,
}

impl TableScanExecutor {
    /// Creates a scan over `table`, opening its storage file.
    pub fn new(catalog: &Catalog, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        let path = catalog.locator(&table)?.to_path_buf();
        let lines = open(&path)?;
        Ok(Self { table, path, lines })
    }

    /// Returns the scanned table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Reads the next row, skipping lines that are not rows.
    pub fn next(&mut self) -> Result<Option<Tuple>> {
        for line in self.lines.by_ref() {
            let line = line.map_err(|e| Error::io(self.path.display().to_string(), e.to_string()))?;
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if line.trim().is_empty() {
                continue;
            }
            return Ok(Some(Tuple::from_line(line)));
        }
        Ok(None)
    }

    /// Reopens the file so the next pull starts from the first row.
    pub fn reset(&mut self) -> Result<()> {
        self.lines = open(&self.path)?;
        Ok(())
    }
}

fn open(path: &Path) -> Result<Lines<BufReader<File>>> {
    let file = File::open(path).map_err(|e| Error::io(path.display().to_string(), e.to_string()))?;
    Ok(BufReader::new(file).lines())
}
