use primescape_core::errors::{ErrorInfo, ScapeError};
use rusqlite::{params, Connection, OptionalExtension};

pub const SCHEMA_VERSION: i64 = 1;

pub(crate) fn store_error(code: &str, err: impl ToString) -> ScapeError {
    ScapeError::Store(ErrorInfo::new(code, err.to_string()))
}

/// SQLite integers are signed; values above `i64::MAX` cannot be cached.
pub(crate) fn sql_value(value: u64) -> Result<i64, ScapeError> {
    i64::try_from(value).map_err(|_| {
        ScapeError::Store(
            ErrorInfo::new("store.value_range", "value exceeds the SQLite integer range")
                .with_context("value", value),
        )
    })
}

pub fn init_schema(conn: &Connection) -> Result<(), ScapeError> {
    conn.execute_batch(
        "BEGIN;
        CREATE TABLE IF NOT EXISTS meta(version INTEGER NOT NULL);
        CREATE TABLE IF NOT EXISTS composites(
            value INTEGER PRIMARY KEY,
            is_prime INTEGER NOT NULL,
            ideal_factor REAL NOT NULL,
            prime_factors TEXT NOT NULL,
            mean_deviation REAL NOT NULL,
            antislope REAL NOT NULL,
            division_family INTEGER NOT NULL
        );
        COMMIT;",
    )
    .map_err(|err| store_error("store.schema", err))?;
    set_version(conn, SCHEMA_VERSION)?;
    Ok(())
}

fn set_version(conn: &Connection, version: i64) -> Result<(), ScapeError> {
    let existing: Option<i64> = conn
        .query_row("SELECT version FROM meta LIMIT 1", [], |row| row.get(0))
        .optional()
        .map_err(|err| store_error("store.schema", err))?;
    match existing {
        Some(current) if current == version => Ok(()),
        Some(current) => Err(ScapeError::Store(
            ErrorInfo::new(
                "store.schema_version",
                format!("cache schema {current} incompatible with expected {version}"),
            )
            .with_hint("delete the cache database to rebuild it"),
        )),
        None => {
            conn.execute("INSERT INTO meta(version) VALUES (?)", params![version])
                .map_err(|err| store_error("store.schema", err))?;
            Ok(())
        }
    }
}
