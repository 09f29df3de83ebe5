//! CSV loading into in-memory tables.
//!
//! Cells stay as text; each analyzer picks the columns it needs and types
//! them itself, so a missing column only disables the stage that needs it.

use crate::error::{LoadError, MissingColumns};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;
use tracing::info;

/// Cell values treated as missing, besides the empty string.
const NA_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(cell: &str) -> bool {
    cell.is_empty() || NA_MARKERS.contains(&cell)
}

/// A header row plus its records, as read from one CSV file.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<StringRecord>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// File name the table came from, used in warnings
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Resolve every column in `names`, or report all that are absent.
    pub fn require(&self, names: &[&str]) -> Result<Vec<usize>, MissingColumns> {
        let missing: Vec<String> = names
            .iter()
            .filter(|n| self.column(n).is_none())
            .map(|n| n.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(MissingColumns {
                source_name: self.name.clone(),
                missing,
            });
        }

        Ok(names.iter().filter_map(|n| self.column(n)).collect())
    }

    /// Cell at (`row`, `col`), `None` when empty or an NA marker.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .filter(|c| !is_missing(c))
    }

    /// Iterate one column's cells top to bottom.
    pub fn values(&self, col: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        (0..self.rows.len()).map(move |row| self.cell(row, col))
    }
}

/// Read a headed CSV file.
pub fn load_table(path: &Path) -> Result<Table, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    info!("Loaded {} rows from {:?}", rows.len(), path);
    Ok(Table::new(name, headers, rows))
}

/// The three input tables of one run.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub events: Table,
    pub messages: Table,
    pub orders: Table,
}

impl Inputs {
    /// Load all inputs, failing on the first unreadable one.
    pub fn load(events: &Path, messages: &Path, orders: &Path) -> Result<Self, LoadError> {
        Ok(Self {
            events: load_table(events)?,
            messages: load_table(messages)?,
            orders: load_table(orders)?,
        })
    }
}

#[cfg(test)]
pub(crate) fn table_from_str(name: &str, data: &str) -> Table {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());
    let headers = reader
        .headers()
        .unwrap()
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = reader.records().map(|r| r.unwrap()).collect();
    Table::new(name, headers, rows)
}
