//! Row-aligned parallel processing utilities.
//!
//! Images are split into bands of whole rows so each rayon task owns a
//! disjoint, contiguous region of the output.

use std::ops::Range;

use rayon::prelude::*;


/// Multiplier for number of chunks relative to CPU threads.
/// Using 3x threads provides good load balancing when some chunks finish faster.
const CHUNKS_PER_THREAD: usize = 3;

/// Rows per parallel band for an image of `height` rows. Minimum of 1.
#[inline]
pub fn rows_per_chunk(height: usize) -> usize {
    let num_chunks = rayon::current_num_threads() * CHUNKS_PER_THREAD;
    (height / num_chunks).max(1)
}

/// Extension trait for splitting a row-major slice into mutable bands of rows.
pub trait ParRowsMutAuto<'a, T: Send + 'a> {
    /// Split into mutable parallel chunks aligned to row boundaries, where a
    /// row is `row_len` elements long. Yields `(chunk_start_row, chunk)` pairs.
    fn par_rows_mut_auto(
        &'a mut self,
        row_len: usize,
    ) -> impl IndexedParallelIterator<Item = (usize, &'a mut [T])>;
}

impl<'a, T: Send + 'a> ParRowsMutAuto<'a, T> for [T] {
    fn par_rows_mut_auto(
        &'a mut self,
        row_len: usize,
    ) -> impl IndexedParallelIterator<Item = (usize, &'a mut [T])> {
        assert!(row_len > 0, "row_len must be > 0");
        assert_eq!(
            self.len() % row_len,
            0,
            "slice length must be a multiple of row_len"
        );
        let chunk_rows = rows_per_chunk(self.len() / row_len);
        self.par_chunks_mut(row_len * chunk_rows)
            .enumerate()
            .map(move |(idx, chunk)| (idx * chunk_rows, chunk))
    }
}

/// Parallel iterator over bands of row indices covering `0..height`, in order.
///
/// Used by read-only passes that reduce per-band partial results.
pub fn par_row_ranges(height: usize) -> impl IndexedParallelIterator<Item = Range<usize>> {
    let chunk_rows = rows_per_chunk(height);
    let num_chunks = height.div_ceil(chunk_rows);
    (0..num_chunks)
        .into_par_iter()
        .map(move |idx| idx * chunk_rows..((idx + 1) * chunk_rows).min(height))
}

/// Folds each band of rows with `fold` and merges the partial results with
/// `merge`, always combining an earlier band on the left of a later one.
pub fn par_fold_rows<A, F, M>(height: usize, identity: A, fold: F, merge: M) -> A
where
    A: Clone + Send + Sync,
    F: Fn(Range<usize>) -> A + Sync + Send,
    M: Fn(A, A) -> A + Sync + Send,
{
    par_row_ranges(height)
        .map(fold)
        .reduce(|| identity.clone(), merge)
}
