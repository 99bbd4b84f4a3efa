//! Common utilities for photostack.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

/// Chunk size for parallel operations.
/// Large enough that per-chunk overhead (scratch setup, progress reporting)
/// is negligible next to the work inside the chunk.
pub(crate) const CHUNK_SIZE: usize = 4096;

/// Apply a function to each index in parallel, collecting results into a Vec.
///
/// Every rayon task gets its own scratch state from `init`, so `f` can reuse
/// buffers across indices. Each index is computed exactly once and written to
/// its own slot, so the result does not depend on scheduling. `on_chunk` is
/// called with `(chunks_done, total_chunks)` after each finished chunk.
pub(crate) fn parallel_map_init<T, S, I, F, P>(len: usize, init: I, f: F, on_chunk: P) -> Vec<T>
where
    T: Default + Clone + Send,
    I: Fn() -> S + Sync + Send,
    F: Fn(&mut S, usize) -> T + Sync + Send,
    P: Fn(usize, usize) + Sync + Send,
{
    if len == 0 {
        return Vec::new();
    }

    let mut result = vec![T::default(); len];
    let total_chunks = len.div_ceil(CHUNK_SIZE);
    let done = AtomicUsize::new(0);

    // Process chunks in parallel, each task writes to its own chunk
    result
        .par_chunks_mut(CHUNK_SIZE)
        .enumerate()
        .for_each_init(init, |state, (chunk_idx, chunk)| {
            let start_idx = chunk_idx * CHUNK_SIZE;
            for (i, val) in chunk.iter_mut().enumerate() {
                *val = f(state, start_idx + i);
            }
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            on_chunk(finished, total_chunks);
        });

    debug_assert_eq!(result.len(), len);

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_map_init() {
        let result = parallel_map_init(10, || (), |_, i| i as f32 * 2.0, |_, _| {});
        assert_eq!(result.len(), 10);
        for (i, &v) in result.iter().enumerate() {
            assert!((v - i as f32 * 2.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_parallel_map_init_empty() {
        let result: Vec<f32> = parallel_map_init(0, || (), |_, i| i as f32, |_, _| {});
        assert!(result.is_empty());
    }

    #[test]
    fn test_parallel_map_init_spans_chunks() {
        let len = CHUNK_SIZE * 3 + 17;
        let calls = AtomicUsize::new(0);
        let last_total = AtomicUsize::new(0);

        let result = parallel_map_init(
            len,
            Vec::<usize>::new,
            |scratch, i| {
                scratch.clear();
                scratch.push(i);
                scratch[0]
            },
            |_, total| {
                calls.fetch_add(1, Ordering::Relaxed);
                last_total.store(total, Ordering::Relaxed);
            },
        );

        assert_eq!(result, (0..len).collect::<Vec<_>>());
        assert_eq!(calls.load(Ordering::Relaxed), 4);
        assert_eq!(last_total.load(Ordering::Relaxed), 4);
    }
}
