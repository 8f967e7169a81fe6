use crate::config::{Config, DeletePolicy};
use crate::error::{Error, Result};
use crate::schema::{configure_connection, initialize_database};
use chrono::NaiveDate;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, Params, Row};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Handle to the finance database.
///
/// Holds configuration only. Every operation opens its own connection,
/// runs a single statement (or a read followed by a write), and drops the
/// connection before returning. Mutations are committed immediately.
#[derive(Debug, Clone)]
pub struct Store {
    config: Config,
}

impl Store {
    pub fn new(config: Config) -> Self {
        Store { config }
    }

    /// Store on `path` with every other setting at its default
    pub fn open(path: impl AsRef<Path>) -> Self {
        Store::new(Config::new(path.as_ref()))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create any missing tables
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connect()?;
        initialize_database(&conn)?;
        log::info!(
            "Initialized database '{}'",
            self.config.database_path.display()
        );
        Ok(())
    }

    pub(crate) fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.config.database_path)?;
        configure_connection(&conn)?;
        Ok(conn)
    }

    /// Run an INSERT and return the id SQLite assigned
    pub(crate) fn insert<P: Params>(&self, sql: &str, params: P) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(sql, params)?;
        Ok(conn.last_insert_rowid())
    }

    /// Run a mutating statement and return the number of rows it touched
    pub(crate) fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        let conn = self.connect()?;
        let affected = conn.execute(sql, params)?;
        Ok(affected)
    }

    pub(crate) fn query<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, map)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub(crate) fn query_one<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        Ok(self.query(sql, params, map)?.into_iter().next())
    }

    /// Apply a partial update as one UPDATE statement.
    ///
    /// An empty assignment set never reaches the database.
    pub(crate) fn update_columns(
        &self,
        table: &'static str,
        id: i64,
        assignments: Assignments,
    ) -> Result<usize> {
        if assignments.is_empty() {
            log::debug!("{}: empty update for id {}, nothing to do", table, id);
            return Ok(0);
        }

        let set_clause = assignments
            .columns
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            set_clause,
            assignments.columns.len() + 1
        );

        let mut values: Vec<Value> = assignments.columns.into_iter().map(|(_, v)| v).collect();
        values.push(Value::Integer(id));

        let affected = self.execute(&sql, params_from_iter(values.iter()))?;
        log::debug!("{}: updated id {} ({} row(s))", table, id, affected);
        Ok(affected)
    }

    /// Delete one row by id, honoring the configured delete policy.
    ///
    /// `dependents` lists the (table, column) pairs that may hold this id.
    pub(crate) fn delete_row(
        &self,
        entity: &'static str,
        table: &'static str,
        id: i64,
        dependents: &[(&'static str, &'static str)],
    ) -> Result<usize> {
        let conn = self.connect()?;

        if self.config.delete_policy == DeletePolicy::Restrict {
            let exists: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE id = ?1", table),
                params![id],
                |row| row.get(0),
            )?;

            if exists > 0 {
                let mut referencing = 0;
                for (dep_table, dep_column) in dependents {
                    let count: i64 = conn.query_row(
                        &format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", dep_table, dep_column),
                        params![id],
                        |row| row.get(0),
                    )?;
                    referencing += count;
                }

                if referencing > 0 {
                    log::warn!(
                        "Refusing to delete {} {}: {} dependent row(s)",
                        entity,
                        id,
                        referencing
                    );
                    return Err(Error::Referenced {
                        entity,
                        id,
                        dependents: referencing,
                    });
                }
            }
        }

        let affected = conn.execute(&format!("DELETE FROM {} WHERE id = ?1", table), params![id])?;
        log::debug!("{}: deleted id {} ({} row(s))", table, id, affected);
        Ok(affected)
    }

    /// Number of rows in one of the schema tables
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        if !crate::schema::TABLES.contains(&table) {
            return Err(Error::Database(rusqlite::Error::InvalidParameterName(
                table.to_string(),
            )));
        }
        let conn = self.connect()?;
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }
}

/// Column assignments collected from a patch struct
#[derive(Debug, Default)]
pub(crate) struct Assignments {
    columns: Vec<(&'static str, Value)>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `column = value` only when the caller supplied a value
    pub fn set(&mut self, column: &'static str, value: Option<Value>) -> &mut Self {
        if let Some(value) = value {
            self.columns.push((column, value));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

pub(crate) fn nullable<T: Into<Value>>(value: Option<T>) -> Value {
    value.map(Into::into).unwrap_or(Value::Null)
}

pub(crate) fn date_to_sql(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored date. Only the leading `YYYY-MM-DD` is read, so timestamps
/// written by other tools still load.
pub fn parse_date(text: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    let head = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(head, DATE_FORMAT)
}

pub(crate) fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    parse_date(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn optional_date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        parse_date(&t)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}


#[cfg(test)]
mod tests {
    use super::test_support::temp_store;
    use super::*;

    #[test]
    fn test_parse_date_accepts_plain_and_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        assert_eq!(parse_date("2024-01-05").unwrap(), expected);
        assert_eq!(parse_date("2024-01-05 10:30:00").unwrap(), expected);
        assert!(parse_date("05/01/2024").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_date_to_sql() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert_eq!(date_to_sql(date), "2025-05-01");
    }

    #[test]
    fn test_fresh_schema_has_empty_tables() {
        let (_dir, store) = temp_store();

        for table in crate::schema::TABLES {
            assert_eq!(store.count_rows(table).unwrap(), 0, "table {}", table);
        }
    }

    #[test]
    fn test_count_rows_rejects_unknown_table() {
        let (_dir, store) = temp_store();
        assert!(store.count_rows("sqlite_master").is_err());
    }

    #[test]
    fn test_empty_assignments_skip_database() {
        let (_dir, store) = temp_store();

        let affected = store
            .update_columns("accounts", 1, Assignments::new())
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[test]
    fn test_data_survives_across_connections() {
        let (_dir, store) = temp_store();

        let id = store
            .insert("INSERT INTO tags (name) VALUES (?1)", params!["persisted"])
            .unwrap();
        let names = store
            .query("SELECT name FROM tags WHERE id = ?1", params![id], |row| {
                row.get::<_, String>(0)
            })
            .unwrap();

        assert_eq!(names, vec!["persisted".to_string()]);
    }

    #[test]
    fn test_every_connection_leaves_foreign_keys_off() {
        let (_dir, store) = temp_store();

        let conn = store.connect().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 0);

        store
            .insert(
                "INSERT INTO transaction_tags (transaction_id, tag_id) VALUES (?1, ?2)",
                params![41, 42],
            )
            .unwrap();
        assert_eq!(store.count_rows("transaction_tags").unwrap(), 1);
    }
}
