use crate::config::validate_table_name;
use crate::workflows::ingest::Table;
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid table name '{name}'")]
    InvalidTable { name: String },
    #[error("table '{name}' does not exist in the dump")]
    MissingTable { name: String },
}

/// Append-only SQLite dump of flattened job-search hits. Every column is
/// stored as `TEXT`; new keys widen the table.
pub struct JobAdStore {
    conn: Connection,
}

impl JobAdStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opened job-ad dump");
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Column names of `table`, empty when the table does not exist.
    pub fn columns(&self, table: &str) -> Result<Vec<String>, StoreError> {
        checked(table)?;
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote(table)))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    /// Appends rows in one transaction and returns how many were written.
    pub fn append(&mut self, table: &str, rows: &[BTreeMap<String, String>]) -> Result<usize, StoreError> {
        checked(table)?;
        if rows.is_empty() {
            return Ok(0);
        }

        let mut columns: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for row in rows {
            for key in row.keys() {
                if seen.insert(key.as_str()) {
                    columns.push(key.clone());
                }
            }
        }

        let existing = self.columns(table)?;
        let tx = self.conn.transaction()?;

        if existing.is_empty() {
            let definitions: Vec<String> = columns
                .iter()
                .map(|column| format!("{} TEXT", quote(column)))
                .collect();
            tx.execute(
                &format!("CREATE TABLE {} ({})", quote(table), definitions.join(", ")),
                [],
            )?;
            info!(table, columns = columns.len(), "created job-ad dump table");
        } else {
            let known: HashSet<&str> = existing.iter().map(String::as_str).collect();
            for column in columns.iter().filter(|column| !known.contains(column.as_str())) {
                tx.execute(
                    &format!("ALTER TABLE {} ADD COLUMN {} TEXT", quote(table), quote(column)),
                    [],
                )?;
                debug!(table, column = %column, "added dump column");
            }
        }

        {
            let placeholders = vec!["?"; columns.len()].join(", ");
            let names: Vec<String> = columns.iter().map(|column| quote(column)).collect();
            let mut insert = tx.prepare(&format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote(table),
                names.join(", "),
                placeholders
            ))?;

            for row in rows {
                insert.execute(params_from_iter(columns.iter().map(|column| row.get(column))))?;
            }
        }

        tx.commit()?;
        info!(table, rows = rows.len(), "appended job ads to dump");
        Ok(rows.len())
    }

    /// Reads a whole table; NULLs load as empty cells.
    pub fn load(&self, table: &str) -> Result<Table, StoreError> {
        if self.columns(table)?.is_empty() {
            return Err(StoreError::MissingTable {
                name: table.to_string(),
            });
        }

        let mut stmt = self.conn.prepare(&format!("SELECT * FROM {}", quote(table)))?;
        let headers: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let width = headers.len();
        let mut loaded = Table::new(headers);

        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for index in 0..width {
                cells.push(render(row.get_ref(index)?));
            }
            loaded.push_row(cells);
        }

        debug!(table, rows = loaded.len(), "loaded job-ad dump");
        Ok(loaded)
    }
}

fn checked(table: &str) -> Result<(), StoreError> {
    validate_table_name(table).map_err(|_| StoreError::InvalidTable {
        name: table.to_string(),
    })
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn render(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(number) => number.to_string(),
        ValueRef::Real(number) => number.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn append_creates_then_widens_the_table() {
        let mut store = JobAdStore::in_memory().expect("in-memory store");
        let written = store
            .append(
                "annonser",
                &[row(&[("id", "1"), ("employer.name", "Acme AB")])],
            )
            .expect("first append");
        assert_eq!(written, 1);

        store
            .append(
                "annonser",
                &[row(&[("id", "2"), ("employer.organization_number", "5561234567")])],
            )
            .expect("second append");

        assert_eq!(
            store.columns("annonser").expect("columns"),
            vec!["employer.name", "id", "employer.organization_number"]
        );

        let table = store.load("annonser").expect("load");
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], vec!["Acme AB", "1", ""]);
        assert_eq!(table.rows[1], vec!["", "2", "5561234567"]);
    }

    #[test]
    fn append_keeps_duplicates() {
        let mut store = JobAdStore::in_memory().expect("in-memory store");
        let hit = row(&[("id", "1")]);
        store.append("annonser", &[hit.clone()]).expect("append");
        store.append("annonser", &[hit]).expect("append again");
        assert_eq!(store.load("annonser").expect("load").len(), 2);
    }

    #[test]
    fn rejects_unsafe_or_missing_tables() {
        let mut store = JobAdStore::in_memory().expect("in-memory store");
        let error = store
            .append("annonser; DROP TABLE x", &[row(&[("id", "1")])])
            .expect_err("invalid table");
        assert!(matches!(error, StoreError::InvalidTable { .. }));

        let error = store.load("saknas").expect_err("missing table");
        assert!(matches!(error, StoreError::MissingTable { .. }));
        assert_eq!(store.append("annonser", &[]).expect("empty append"), 0);
    }
}
