use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

use primescape_core::errors::{ErrorInfo, ScapeError};
use primescape_core::NumericRecord;

use crate::decompose::{decompose_with, invalid_value};
use crate::partition::{available_workers, effective_workers, partition};
use crate::primes::PrimeTable;

/// Options governing a parallel decomposition batch.
#[derive(Debug, Clone, Default)]
pub struct DecomposeOpts {
    /// Requested worker count; `None` uses the available parallelism.
    pub workers: Option<usize>,
    /// Cooperative cancellation flag checked between chunk items.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl DecomposeOpts {
    /// Options requesting a fixed number of workers.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: Some(workers),
            cancel: None,
        }
    }
}

/// Decomposes every value on a pool of workers, one contiguous chunk each.
///
/// The returned collection is unordered across workers; callers that need
/// ascending values must sort. Any worker failure aborts the whole batch.
pub fn decompose_all(
    values: &[u64],
    opts: &DecomposeOpts,
) -> Result<Vec<NumericRecord>, ScapeError> {
    if values.is_empty() {
        return Ok(Vec::new());
    }
    if let Some(position) = values.iter().position(|&value| value < 1) {
        return Err(invalid_value(values[position])
            .map_info(|info| info.with_context("index", position)));
    }

    let requested = opts.workers.unwrap_or_else(available_workers);
    let workers = effective_workers(values.len(), requested);
    let max_value = values.iter().copied().max().unwrap_or(1);
    let table = PrimeTable::covering(max_value);
    let chunks = partition(values, workers);

    run_workers(&chunks, opts.cancel.as_deref(), |chunk, flags| {
        decompose_chunk(&table, chunk, flags)
    })
}

/// Runs `job` once per chunk on a dedicated pool and merges the batches in
/// arrival order. Blocks until every worker has reported.
fn run_workers<T, F>(
    chunks: &[&[u64]],
    cancel: Option<&AtomicBool>,
    job: F,
) -> Result<Vec<T>, ScapeError>
where
    T: Send,
    F: Fn(&[u64], StopFlags<'_>) -> Result<Vec<T>, ScapeError> + Sync,
{
    let workers = chunks.len();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("decomposer-{index}"))
        .build()
        .map_err(|err| worker_error("decomp.thread_pool", err.to_string()))?;

    let abort = AtomicBool::new(false);
    let flags = StopFlags {
        abort: &abort,
        cancel,
    };
    let (sender, receiver) = mpsc::sync_channel::<ChunkReport<T>>(workers);
    let job = &job;

    pool.in_place_scope(|scope| {
        for (index, &chunk) in chunks.iter().enumerate() {
            let sender = sender.clone();
            scope.spawn(move |_| {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(chunk, flags)))
                    .unwrap_or_else(|payload| {
                        Err(worker_error("decomp.worker_panic", panic_message(payload)))
                    });
                // The receiver outlives the scope, so a send only fails if
                // the coordinator itself is unwinding.
                let _ = sender.send(ChunkReport { index, outcome });
            });
        }
        drop(sender);

        let mut merged = Vec::new();
        let mut failure: Option<ScapeError> = None;
        for _ in 0..workers {
            let report = receiver.recv().map_err(|_| {
                worker_error(
                    "decomp.worker_lost",
                    "a worker exited without reporting its chunk",
                )
            })?;
            match report.outcome {
                Ok(batch) => merged.extend(batch),
                Err(err) => {
                    abort.store(true, Ordering::Relaxed);
                    failure = Some(prefer_root_cause(failure, tag_worker(err, report.index)));
                }
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(merged),
        }
    })
}

#[derive(Clone, Copy)]
struct StopFlags<'a> {
    abort: &'a AtomicBool,
    cancel: Option<&'a AtomicBool>,
}

impl StopFlags<'_> {
    fn stop_requested(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
            || self
                .cancel
                .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }
}

struct ChunkReport<T> {
    index: usize,
    outcome: Result<Vec<T>, ScapeError>,
}

fn decompose_chunk(
    table: &PrimeTable,
    chunk: &[u64],
    flags: StopFlags<'_>,
) -> Result<Vec<NumericRecord>, ScapeError> {
    let mut records = Vec::with_capacity(chunk.len());
    for &value in chunk {
        if flags.stop_requested() {
            return Err(ScapeError::Cancelled(
                ErrorInfo::new("decomp.cancelled", "batch stopped before chunk completed")
                    .with_context("completed", records.len())
                    .with_context("chunk_len", chunk.len()),
            ));
        }
        records.push(decompose_with(table, value)?);
    }
    Ok(records)
}

/// Workers stopped by the internal abort flag report `Cancelled`; the
/// failure that raised the flag is the one worth surfacing.
fn prefer_root_cause(current: Option<ScapeError>, next: ScapeError) -> ScapeError {
    match current {
        Some(existing @ ScapeError::WorkerFailure(_)) => existing,
        Some(existing) if matches!(next, ScapeError::Cancelled(_)) => existing,
        _ => next,
    }
}

fn worker_error(code: &str, message: impl Into<String>) -> ScapeError {
    ScapeError::WorkerFailure(ErrorInfo::new(code, message))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

fn tag_worker(err: ScapeError, index: usize) -> ScapeError {
    err.map_info(|info| info.with_context("worker", index))
}
