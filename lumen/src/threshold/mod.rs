//! Otsu's adaptive binarization.


use common::parallel::{par_fold_rows, ParRowsMutAuto};
use common::Buffer2;
use rayon::prelude::*;

use crate::buffer::{PixelBuffer, CHANNELS};
use crate::luminance::luminance_plane;

pub const NUM_BINS: usize = 256;

/// 256-bucket intensity histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram(pub [u32; NUM_BINS]);

impl Default for Histogram {
    fn default() -> Self {
        Self([0; NUM_BINS])
    }
}

impl Histogram {
    /// Counts every sample of `plane`. Bands of rows are counted in parallel
    /// and merged before returning.
    pub fn from_plane(plane: &Buffer2<u8>) -> Self {
        par_fold_rows(
            plane.height(),
            Histogram::default(),
            |rows| {
                let mut hist = Histogram::default();
                for y in rows {
                    for &v in plane.row(y) {
                        hist.0[v as usize] += 1;
                    }
                }
                hist
            },
            |mut a, b| {
                a.merge(&b);
                a
            },
        )
    }

    pub fn merge(&mut self, other: &Histogram) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += b;
        }
    }

    #[inline]
    pub fn count(&self, value: u8) -> u32 {
        self.0[value as usize]
    }

    /// Number of samples.
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&c| c as u64).sum()
    }

    /// Sum of `value * count` over all bins.
    pub fn weighted_sum(&self) -> u64 {
        self.0
            .iter()
            .enumerate()
            .map(|(v, &c)| v as u64 * c as u64)
            .sum()
    }
}

/// Threshold maximizing the between-class variance of `hist`.
///
/// Candidates are scanned from 0 upward and only a strictly larger variance
/// replaces the current best, so the lowest maximizing threshold wins.
/// Candidates with an empty background are skipped and the scan stops once
/// the foreground is empty. A single-valued histogram therefore yields 0.
///
/// Variances are computed in `f64`; an `f32` evaluation of the same loop can
/// pick a different threshold on rare near-ties.
pub fn otsu_threshold(hist: &Histogram) -> u8 {
    let total = hist.total();
    let sum = hist.weighted_sum() as f64;

    let mut weight_bg = 0u64;
    let mut sum_bg = 0.0f64;
    let mut max_variance = 0.0f64;
    let mut threshold = 0u8;

    for (t, &count) in hist.0.iter().enumerate() {
        weight_bg += count as u64;
        if weight_bg == 0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0 {
            break;
        }

        sum_bg += (t as u64 * count as u64) as f64;
        let mean_bg = sum_bg / weight_bg as f64;
        let mean_fg = (sum - sum_bg) / weight_fg as f64;
        let diff = mean_bg - mean_fg;
        let variance = weight_bg as f64 * weight_fg as f64 * diff * diff;

        if variance > max_variance {
            max_variance = variance;
            threshold = t as u8;
        }
    }

    threshold
}

/// Binarize by luminance using Otsu's threshold.
///
/// Pixels with luminance strictly above the threshold become white (255), the
/// rest black. Alpha is untouched. Returns the threshold used.
pub fn binarize(image: &mut PixelBuffer) -> u8 {
    let gray = luminance_plane(&image.as_view());
    let threshold = otsu_threshold(&Histogram::from_plane(&gray));

    let stride = image.stride();
    image
        .bytes_mut()
        .par_rows_mut_auto(stride)
        .for_each(|(start_row, chunk)| {
            for (local_y, row) in chunk.chunks_mut(stride).enumerate() {
                let lum = gray.row(start_row + local_y);
                for (px, &v) in row.chunks_exact_mut(CHANNELS).zip(lum) {
                    let value = if v > threshold { u8::MAX } else { 0 };
                    px[..3].fill(value);
                }
            }
        });

    threshold
}
