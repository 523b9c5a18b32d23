//! Row-block sweeps over ghost-padded field storage.
//!
//! Fields are stored row-major with rows of length `nx + 2`. Each helper hands
//! one whole storage row at a time to the closure. With the `parallel` feature
//! the rows are spread over Rayon's pool; otherwise they run in order. Both
//! paths produce identical values: row updates never read the slice being
//! written, and reductions are summed serially in row order.
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runs `update(j, row)` for every storage row `j` of `data`.
pub fn for_each_row<F>(data: &mut [f64], row_len: usize, update: F)
where
    F: Fn(usize, &mut [f64]) + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        data.par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(j, row)| update(j, row));
    }

    #[cfg(not(feature = "parallel"))]
    {
        data.chunks_mut(row_len)
            .enumerate()
            .for_each(|(j, row)| update(j, row));
    }
}

/// Runs `update(j, row_a, row_b)` over the matching rows of two equally sized buffers.
pub fn for_each_row_pair<F>(a: &mut [f64], b: &mut [f64], row_len: usize, update: F)
where
    F: Fn(usize, &mut [f64], &mut [f64]) + Sync + Send,
{
    debug_assert_eq!(a.len(), b.len());

    #[cfg(feature = "parallel")]
    {
        a.par_chunks_mut(row_len)
            .zip(b.par_chunks_mut(row_len))
            .enumerate()
            .for_each(|(j, (row_a, row_b))| update(j, row_a, row_b));
    }

    #[cfg(not(feature = "parallel"))]
    {
        a.chunks_mut(row_len)
            .zip(b.chunks_mut(row_len))
            .enumerate()
            .for_each(|(j, (row_a, row_b))| update(j, row_a, row_b));
    }
}

/// Evaluates `partial(j)` for `rows` rows and returns the results in row order.
pub fn map_rows<F>(rows: usize, partial: F) -> Vec<f64>
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        (0..rows).into_par_iter().map(partial).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..rows).map(partial).collect()
    }
}

/// Sum of per-row partials, accumulated serially so the result does not depend on scheduling.
pub fn sum_rows<F>(rows: usize, partial: F) -> f64
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    map_rows(rows, partial).iter().sum()
}

/// Maximum of per-row partials. NaN partials propagate.
pub fn max_rows<F>(rows: usize, partial: F) -> f64
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    map_rows(rows, partial)
        .into_iter()
        .fold(0.0, |acc: f64, x| if x.is_nan() || acc.is_nan() { f64::NAN } else { acc.max(x) })
}
