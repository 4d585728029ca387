use primescape_core::errors::ScapeError;
use primescape_core::NumericRecord;
use rusqlite::{params, Connection};

use crate::schema::{sql_value, store_error};

pub(crate) fn encode_factors(factors: &[u64]) -> String {
    factors
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Upserts `records` in a single transaction and returns how many were written.
pub fn save_records(conn: &Connection, records: &[NumericRecord]) -> Result<usize, ScapeError> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|err| store_error("store.transaction", err))?;
    {
        let mut stmt = tx
            .prepare_cached(
                "INSERT OR REPLACE INTO composites(
                    value, is_prime, ideal_factor, prime_factors,
                    mean_deviation, antislope, division_family
                ) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .map_err(|err| store_error("store.insert", err))?;
        for record in records {
            stmt.execute(params![
                sql_value(record.value)?,
                record.is_prime,
                record.ideal_factor,
                encode_factors(&record.prime_factors),
                record.mean_deviation,
                record.antislope,
                sql_value(record.division_family)?,
            ])
            .map_err(|err| {
                store_error("store.insert", err).map_info(|info| info.with_context("value", record.value))
            })?;
        }
    }
    tx.commit().map_err(|err| store_error("store.commit", err))?;
    Ok(records.len())
}
