use primescape_core::errors::{ErrorInfo, ScapeError};
use primescape_core::NumericRecord;
use rusqlite::{params_from_iter, Connection};

use crate::schema::{sql_value, store_error};

/// Largest `IN (...)` list issued per query unless the caller asks for less.
pub const DEFAULT_BATCH_LIMIT: usize = 200_000;

// Bundled SQLite caps host parameters per statement.
const MAX_SQL_PARAMS: usize = 32_766;

type CompositeRow = (i64, bool, f64, String, f64, f64, i64);

/// Stored records for `values`, ascending by value. Unknown values are skipped.
pub fn load_records(
    conn: &Connection,
    values: &[u64],
    batch_limit: usize,
) -> Result<Vec<NumericRecord>, ScapeError> {
    if batch_limit == 0 {
        return Err(ScapeError::invalid_input(
            "store.batch_limit",
            "batch limit must be at least 1",
        ));
    }
    let keys = values
        .iter()
        .map(|&value| sql_value(value))
        .collect::<Result<Vec<_>, _>>()?;
    let mut records = Vec::new();
    for batch in keys.chunks(batch_limit.min(MAX_SQL_PARAMS)) {
        let placeholders = vec!["?"; batch.len()].join(", ");
        let sql = format!(
            "SELECT value, is_prime, ideal_factor, prime_factors, mean_deviation, antislope, division_family
             FROM composites WHERE value IN ({placeholders}) ORDER BY value"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|err| store_error("store.query", err))?;
        let rows = stmt
            .query_map(params_from_iter(batch.iter()), |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })
            .map_err(|err| store_error("store.query", err))?;
        for row in rows {
            let row: CompositeRow = row.map_err(|err| store_error("store.query", err))?;
            records.push(decode_row(row)?);
        }
    }
    records.sort_by_key(|record| record.value);
    records.dedup_by_key(|record| record.value);
    Ok(records)
}

/// Number of cached records.
pub fn record_count(conn: &Connection) -> Result<usize, ScapeError> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM composites", [], |row| row.get(0))
        .map_err(|err| store_error("store.query", err))?;
    Ok(count.max(0) as usize)
}

fn decode_row(row: CompositeRow) -> Result<NumericRecord, ScapeError> {
    let (value, is_prime, ideal_factor, factors, mean_deviation, antislope, division_family) = row;
    let prime_factors = decode_factors(&factors).ok_or_else(|| {
        ScapeError::Store(
            ErrorInfo::new("store.decode", "malformed prime factor list")
                .with_context("value", value)
                .with_context("prime_factors", &factors),
        )
    })?;
    Ok(NumericRecord {
        value: unsigned(value)?,
        is_prime,
        prime_factors,
        ideal_factor,
        mean_deviation,
        antislope,
        division_family: unsigned(division_family)?,
    })
}

fn decode_factors(text: &str) -> Option<Vec<u64>> {
    if text.is_empty() {
        return Some(Vec::new());
    }
    text.split(',').map(|part| part.trim().parse().ok()).collect()
}

fn unsigned(raw: i64) -> Result<u64, ScapeError> {
    u64::try_from(raw).map_err(|_| {
        ScapeError::Store(ErrorInfo::new("store.decode", "negative integer in cache").with_context("raw", raw))
    })
}
