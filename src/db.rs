// 💾 Persister - append the unified lead table to a relational store
// Whole batch commits or nothing does

use crate::secrets::DatabaseCredentials;
use crate::table::{Table, Value};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{params, params_from_iter, Connection, Transaction};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Table the unified leads are appended to
pub const TARGET_TABLE: &str = "prospective_leads";

// ============================================================================
// LOAD RUN (audit trail)
// ============================================================================

/// One pipeline run, written next to the rows it produced
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoadRun {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub rows_written: i64,
    /// Per-source provenance (file, rows, checksum)
    pub sources: serde_json::Value,
}

impl LoadRun {
    pub fn new(sources: serde_json::Value) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            rows_written: 0,
            sources,
        }
    }
}

// ============================================================================
// SINK
// ============================================================================

/// LeadSink - opaque destination for the unified table.
/// Either every row is written or none is.
pub trait LeadSink {
    fn write(
        &mut self,
        table: &Table,
        credentials: &DatabaseCredentials,
        run: &LoadRun,
    ) -> Result<usize>;
}

/// SQLite-backed sink: the credential's database name selects
/// `<dir>/<database>.db`
pub struct SqliteSink {
    dir: PathBuf,
    table_name: String,
}

impl SqliteSink {
    pub fn new(dir: impl Into<PathBuf>, table_name: &str) -> Self {
        SqliteSink {
            dir: dir.into(),
            table_name: table_name.to_string(),
        }
    }

    pub fn database_path(&self, credentials: &DatabaseCredentials) -> PathBuf {
        self.dir.join(format!("{}.db", credentials.engine))
    }
}

impl LeadSink for SqliteSink {
    fn write(
        &mut self,
        table: &Table,
        credentials: &DatabaseCredentials,
        run: &LoadRun,
    ) -> Result<usize> {
        let db_path = self.database_path(credentials);
        info!(
            target_db = %credentials.redacted_connection_string(),
            path = %db_path.display(),
            "connecting to lead store"
        );

        let mut conn = open_database(&db_path)?;
        setup_database(&conn)?;
        append_table(&mut conn, &self.table_name, table, run)
    }
}

pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory: {}", parent.display()))?;
    }
    Connection::open(path).with_context(|| format!("Failed to open database: {}", path.display()))
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS load_runs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id TEXT UNIQUE NOT NULL,
            started_at TEXT NOT NULL,
            rows_written INTEGER NOT NULL,
            sources TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_load_runs_started ON load_runs(started_at)",
        [],
    )?;

    Ok(())
}

/// Append every row of `table` to `table_name` in one transaction.
///
/// The target table is created on first use. Columns the table has not seen
/// before are added, so sources with new columns can still append.
pub fn append_table(
    conn: &mut Connection,
    table_name: &str,
    table: &Table,
    run: &LoadRun,
) -> Result<usize> {
    let tx = conn.transaction()?;

    ensure_columns(&tx, table_name, table)?;

    let mut column_list = vec![quote_identifier("run_id")];
    column_list.extend(table.columns().iter().map(|c| quote_identifier(c)));
    let placeholders = (1..=column_list.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table_name),
        column_list.join(", "),
        placeholders
    );

    let mut inserted = 0;
    {
        let mut stmt = tx.prepare(&sql)?;
        let run_id = Value::Text(run.run_id.clone());

        for row in table.rows() {
            stmt.execute(params_from_iter(std::iter::once(&run_id).chain(row.iter())))?;
            inserted += 1;
        }
    }

    let sources_json = serde_json::to_string(&run.sources)?;
    tx.execute(
        "INSERT INTO load_runs (run_id, started_at, rows_written, sources)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            run.run_id,
            run.started_at.to_rfc3339(),
            inserted as i64,
            sources_json
        ],
    )?;

    tx.commit()?;

    println!("✓ Inserted: {} leads into {}", inserted, table_name);
    Ok(inserted)
}

/// Create the lead table, or add any columns it is missing
fn ensure_columns(tx: &Transaction, table_name: &str, table: &Table) -> Result<()> {
    let quoted_table = quote_identifier(table_name);

    tx.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {} (
                lead_id INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id TEXT NOT NULL
            )",
            quoted_table
        ),
        [],
    )?;

    let existing = existing_columns(tx, table_name)?;

    for column in table.columns() {
        if existing.iter().any(|c| c == column) {
            continue;
        }
        tx.execute(
            &format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                quoted_table,
                quote_identifier(column),
                column_type(table, column)
            ),
            [],
        )?;
    }

    Ok(())
}

fn existing_columns(conn: &Connection, table_name: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_identifier(table_name)))?;

    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(columns)
}

/// SQL type affinity for a column, from the values it holds
fn column_type(table: &Table, column: &str) -> &'static str {
    let values = match table.column(column) {
        Ok(values) => values,
        Err(_) => return "TEXT",
    };

    let non_null: Vec<&&Value> = values.iter().filter(|v| !v.is_null()).collect();
    if non_null.is_empty() {
        return "TEXT";
    }

    if non_null.iter().all(|v| matches!(v, Value::Int(_))) {
        "INTEGER"
    } else if non_null
        .iter()
        .all(|v| matches!(v, Value::Int(_) | Value::Float(_)))
    {
        "REAL"
    } else if non_null.iter().all(|v| matches!(v, Value::Date(_))) {
        "DATE"
    } else {
        "TEXT"
    }
}

/// Double-quote an identifier ("Operation #" and friends)
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Int(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Float(x) => ToSqlOutput::Owned(SqlValue::Real(*x)),
            Value::Date(d) => ToSqlOutput::Owned(SqlValue::Text(d.format("%Y-%m-%d").to_string())),
        })
    }
}

pub fn verify_count(conn: &Connection, table_name: &str) -> Result<i64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_identifier(table_name)),
        [],
        |row| row.get(0),
    )?;

    Ok(count)
}

/// All recorded runs, newest first
pub fn get_load_runs(conn: &Connection) -> Result<Vec<LoadRun>> {
    let mut stmt = conn.prepare(
        "SELECT run_id, started_at, rows_written, sources
         FROM load_runs
         ORDER BY id DESC",
    )?;

    let runs = stmt
        .query_map([], |row| {
            let started_at: String = row.get(1)?;
            let sources_json: String = row.get(3)?;

            Ok(LoadRun {
                run_id: row.get(0)?,
                started_at: DateTime::parse_from_rfc3339(&started_at)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?
                    .with_timezone(&Utc),
                rows_written: row.get(2)?,
                sources: serde_json::from_str(&sources_json)
                    .map_err(|_| rusqlite::Error::InvalidQuery)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn credentials(engine: &str) -> DatabaseCredentials {
        DatabaseCredentials {
            username: "leads".to_string(),
            password: "secret".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            engine: engine.to_string(),
        }
    }

    fn unified() -> Table {
        let mut table = Table::from_strings(
            &["company", "Operation #", "phone"],
            &[&["Acme", "1", "555"], &["Globex", "", ""]],
        );
        table.set_column("capacity", vec![Value::Int(12), Value::Float(2.5)]);
        table.set_column(
            "license_issued",
            vec![
                Value::Date(NaiveDate::from_ymd_opt(2023, 7, 7).unwrap()),
                Value::Null,
            ],
        );
        table
    }

    #[test]
    fn test_append_twice_appends_duplicates() {
        let mut conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let table = unified();
        let first = append_table(&mut conn, TARGET_TABLE, &table, &LoadRun::new(serde_json::json!({}))).unwrap();
        let second = append_table(&mut conn, TARGET_TABLE, &table, &LoadRun::new(serde_json::json!({}))).unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 2);
        // no idempotence: re-running appends the same rows again
        assert_eq!(verify_count(&conn, TARGET_TABLE).unwrap(), 4);
        assert_eq!(get_load_runs(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_values_round_trip_through_sqlite() {
        let mut conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        append_table(&mut conn, TARGET_TABLE, &unified(), &LoadRun::new(serde_json::json!({}))).unwrap();

        let (capacity, issued, operation): (f64, Option<String>, Option<String>) = conn
            .query_row(
                "SELECT capacity, license_issued, \"Operation #\" FROM prospective_leads ORDER BY lead_id LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();

        assert_eq!(capacity, 12.0);
        assert_eq!(issued.as_deref(), Some("2023-07-07"));
        assert_eq!(operation.as_deref(), Some("1"));
    }

    #[test]
    fn test_new_columns_are_added() {
        let mut conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        append_table(&mut conn, TARGET_TABLE, &unified(), &LoadRun::new(serde_json::json!({}))).unwrap();

        let wider = Table::from_strings(&["company", "provider_id"], &[&["Initech", "F-9"]]);
        append_table(&mut conn, TARGET_TABLE, &wider, &LoadRun::new(serde_json::json!({}))).unwrap();

        let columns = existing_columns(&conn, TARGET_TABLE).unwrap();
        assert!(columns.contains(&"provider_id".to_string()));
        assert_eq!(verify_count(&conn, TARGET_TABLE).unwrap(), 3);
    }

    #[test]
    fn test_column_type_affinity() {
        let table = unified();
        assert_eq!(column_type(&table, "company"), "TEXT");
        assert_eq!(column_type(&table, "capacity"), "REAL");
        assert_eq!(column_type(&table, "license_issued"), "DATE");
        assert_eq!(quote_identifier("Operation #"), "\"Operation #\"");
    }

    #[test]
    fn test_sqlite_sink_records_run() {
        let dir = TempDir::new().unwrap();
        let mut sink = SqliteSink::new(dir.path(), TARGET_TABLE);
        let creds = credentials("leads");
        let run = LoadRun::new(serde_json::json!({"NV": {"rows": 2}}));

        let written = sink.write(&unified(), &creds, &run).unwrap();
        assert_eq!(written, 2);

        let conn = Connection::open(sink.database_path(&creds)).unwrap();
        let runs = get_load_runs(&conn).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].run_id, run.run_id);
        assert_eq!(runs[0].rows_written, 2);
        assert_eq!(runs[0].sources["NV"]["rows"], 2);
    }
}
