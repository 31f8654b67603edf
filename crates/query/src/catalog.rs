//! Catalog of tables available to a query.
//!
//! The catalog maps a table name to its schema and to the file holding its
//! rows. It is built once, is read-only afterwards, and is shared by every
//! operator of a plan through an `Arc`.
//!
//! On disk a catalog is a directory:
//!
//! ```text
//! <dir>/schema.txt        one line per table: name followed by column names
//! <dir>/data/<table>.csv  one comma-separated row per line, no header
//! ```

use hashbrown::HashMap;
use log::{debug, info};
use quarry_core::schema::TableSchema;
use quarry_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the schema description file inside a catalog directory.
pub const SCHEMA_FILE: &str = "schema.txt";

/// Directory holding table files inside a catalog directory.
pub const DATA_DIR: &str = "data";

/// Extension of table files.
pub const DATA_EXTENSION: &str = "csv";

/// Catalog entry for one table.
#[derive(Clone, Debug)]
pub struct TableInfo {
    schema: TableSchema,
    locator: PathBuf,
}

impl TableInfo {
    /// Returns the table schema.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Returns the path of the table's storage file.
    pub fn locator(&self) -> &Path {
        &self.locator
    }
}

/// Read-only mapping from table name to schema and storage locator.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    tables: HashMap<String, TableInfo>,
    /// Table names in declaration order.
    order: Vec<String>,
}

impl Catalog {
    /// Starts building a catalog whose tables live under `dir/data/`.
    pub fn builder(dir: impl Into<PathBuf>) -> CatalogBuilder {
        CatalogBuilder::new(dir)
    }

    /// Loads the catalog stored in `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let schema_path = dir.join(SCHEMA_FILE);
        let text = fs::read_to_string(&schema_path)
            .map_err(|e| Error::io(schema_path.display().to_string(), e.to_string()))?;
        let catalog = Self::from_schema_text(dir, &text)?;
        info!(
            "loaded catalog from {} with {} tables",
            dir.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    /// Builds a catalog from the contents of a schema description file.
    ///
    /// Each non-blank line is a table name followed by whitespace-separated
    /// column names, used verbatim.
    pub fn from_schema_text(dir: impl Into<PathBuf>, text: &str) -> Result<Self> {
        let mut builder = CatalogBuilder::new(dir);
        for line in text.lines() {
            let mut parts = line.split_whitespace();
            let Some(name) = parts.next() else {
                continue;
            };
            builder = builder.add_table(name, parts);
        }
        builder.build()
    }

    /// Returns the catalog entry for a table.
    pub fn table(&self, name: &str) -> Result<&TableInfo> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::unknown_table(name))
    }

    /// Returns the schema of a table.
    pub fn schema(&self, name: &str) -> Result<&TableSchema> {
        self.table(name).map(TableInfo::schema)
    }

    /// Returns the storage locator of a table.
    pub fn locator(&self, name: &str) -> Result<&Path> {
        self.table(name).map(TableInfo::locator)
    }

    /// Returns true if the table is part of the catalog.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns the table names in declaration order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Returns the number of tables.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the catalog has no tables.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Builder for [`Catalog`].
///
/// Definitions are validated in [`CatalogBuilder::build`]; declaring the same
/// table twice, or a column twice within a table, is a `ConfigConflict`.
#[derive(Debug)]
pub struct CatalogBuilder {
    data_dir: PathBuf,
    pending: Vec<(String, Vec<String>, Option<PathBuf>)>,
}

impl CatalogBuilder {
    /// Creates a builder whose default table locators live under `dir/data/`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into().join(DATA_DIR),
            pending: Vec::new(),
        }
    }

    /// Adds a table stored at the default location `data/<name>.csv`.
    pub fn add_table<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        self.pending.push((name.into(), columns, None));
        self
    }

    /// Adds a table stored at an explicit path.
    pub fn add_table_at<I, S>(
        mut self,
        name: impl Into<String>,
        columns: I,
        locator: impl Into<PathBuf>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        self.pending
            .push((name.into(), columns, Some(locator.into())));
        self
    }

    /// Validates the definitions and builds the catalog.
    pub fn build(self) -> Result<Catalog> {
        let mut catalog = Catalog::default();
        for (name, columns, locator) in self.pending {
            if catalog.tables.contains_key(&name) {
                return Err(Error::config_conflict(format!(
                    "table {} declared twice",
                    name
                )));
            }
            let locator = locator.unwrap_or_else(|| {
                self.data_dir
                    .join(format!("{}.{}", name, DATA_EXTENSION))
            });
            let schema = TableSchema::new(name.clone(), columns)?;
            debug!(
                "catalog table {} ({}) at {}",
                name,
                schema.columns().join(", "),
                locator.display()
            );
            catalog.order.push(name.clone());
            catalog.tables.insert(name, TableInfo { schema, locator });
        }
        Ok(catalog)
    }
}
