use std::num::NonZeroUsize;
use std::thread;

/// Number of parallel execution units available to the process, at least 1.
pub fn available_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Worker count actually used for `len` values: never more workers than
/// values, never fewer than one.
pub fn effective_workers(len: usize, requested: usize) -> usize {
    requested.min(len).max(1)
}

/// Splits `values` into exactly `worker_count` contiguous chunks.
///
/// The first `len % worker_count` chunks hold `ceil(len / worker_count)`
/// values and the rest hold the floor, so a chunk is empty only when there
/// are fewer values than workers. A zero `worker_count` is treated as 1.
pub fn partition(values: &[u64], worker_count: usize) -> Vec<&[u64]> {
    let workers = worker_count.max(1);
    let base = values.len() / workers;
    let extra = values.len() % workers;
    let mut chunks = Vec::with_capacity(workers);
    let mut start = 0;
    for index in 0..workers {
        let size = base + usize::from(index < extra);
        chunks.push(&values[start..start + size]);
        start += size;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_are_balanced_and_contiguous() {
        let values: Vec<u64> = (1..=10).collect();
        let chunks = partition(&values, 4);
        let sizes: Vec<usize> = chunks.iter().map(|chunk| chunk.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
        assert_eq!(chunks.concat(), values);
    }

    #[test]
    fn short_inputs_shrink_the_worker_count() {
        assert_eq!(effective_workers(3, 16), 3);
        assert_eq!(effective_workers(0, 16), 1);
        assert_eq!(effective_workers(100, 4), 4);
    }

    #[test]
    fn more_workers_than_values_yields_trailing_empty_chunks() {
        let chunks = partition(&[7, 8], 4);
        assert_eq!(chunks.len(), 4);
        assert!(chunks[2].is_empty() && chunks[3].is_empty());
    }
}
