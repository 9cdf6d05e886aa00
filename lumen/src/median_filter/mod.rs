//! k×k median filter with clamp-to-edge boundaries.
//!
//! Each row keeps one 256-bin histogram per color channel and slides it
//! along the row: moving right by one pixel removes the leftmost column of the
//! window and adds a new column on the right. The median is found by walking
//! the histogram until the running count passes rank `⌊k²/2⌋`.


use common::parallel::ParRowsMutAuto;
use rayon::prelude::*;

use crate::buffer::{clamp_coord, PixelBuffer, ALPHA, CHANNELS};
use crate::error::{Error, Result};

const COLOR_CHANNELS: usize = 3;

type Histogram = [u32; 256];

/// Replace every color sample with the median of its k×k neighborhood.
///
/// `kernel_size` must be odd and at least 1, and `kernel_size²` must fit the
/// `u32` histogram counters. Alpha is copied from the source
/// pixel. The output is built in a separate buffer, so reads always see the
/// unfiltered input.
pub fn median_filter(image: &mut PixelBuffer, kernel_size: usize) -> Result<()> {
    let samples = window_len(kernel_size)?;
    if kernel_size == 1 {
        return Ok(());
    }

    let width = image.width();
    let height = image.height();
    let stride = image.stride();
    let radius = (kernel_size / 2) as isize;
    let rank = samples / 2;

    let src = image.bytes();
    let mut output = vec![0u8; src.len()];

    output
        .par_rows_mut_auto(stride)
        .for_each(|(start_row, chunk)| {
            let mut window_rows = Vec::with_capacity(kernel_size);
            for (local_y, out_row) in chunk.chunks_mut(stride).enumerate() {
                let y = (start_row + local_y) as isize;
                window_rows.clear();
                window_rows.extend((-radius..=radius).map(|dy| clamp_coord(y + dy, height)));
                filter_row(src, out_row, width, radius, rank, &window_rows);
            }
        });

    image.bytes_mut().copy_from_slice(&output);
    Ok(())
}

/// Number of samples in a k×k window, checked against the `u32` counters.
pub(crate) fn window_len(kernel_size: usize) -> Result<u32> {
    if kernel_size == 0 || kernel_size % 2 == 0 {
        return Err(Error::InvalidKernelSize(kernel_size));
    }
    kernel_size
        .checked_mul(kernel_size)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(Error::InvalidKernelSize(kernel_size))
}

/// Filter one output row. `window_rows` holds the clamped source row index
/// of every window row, top to bottom.
fn filter_row(
    src: &[u8],
    out_row: &mut [u8],
    width: usize,
    radius: isize,
    rank: u32,
    window_rows: &[usize],
) {
    let stride = width * CHANNELS;
    let mut histograms: [Histogram; COLOR_CHANNELS] = [[0; 256]; COLOR_CHANNELS];

    let add_column = |histograms: &mut [Histogram; COLOR_CHANNELS], sx: usize, delta: i32| {
        for &sy in window_rows {
            let base = sy * stride + sx * CHANNELS;
            for (c, hist) in histograms.iter_mut().enumerate() {
                let bin = &mut hist[src[base + c] as usize];
                *bin = bin.wrapping_add_signed(delta);
            }
        }
    };

    // Prime the window for x = 0.
    for dx in -radius..=radius {
        add_column(&mut histograms, clamp_coord(dx, width), 1);
    }

    for x in 0..width {
        let base = x * CHANNELS;
        for (c, hist) in histograms.iter().enumerate() {
            out_row[base + c] = select_rank(hist, rank);
        }
        let src_alpha = window_rows[radius as usize] * stride + base + ALPHA;
        out_row[base + ALPHA] = src[src_alpha];

        if x + 1 < width {
            let leaving = clamp_coord(x as isize - radius, width);
            let entering = clamp_coord(x as isize + radius + 1, width);
            add_column(&mut histograms, leaving, -1);
            add_column(&mut histograms, entering, 1);
        }
    }
}

/// Smallest value whose cumulative count exceeds `rank`.
#[inline]
fn select_rank(hist: &Histogram, rank: u32) -> u8 {
    let mut running = 0u32;
    for (value, &count) in hist.iter().enumerate() {
        running += count;
        if running > rank {
            return value as u8;
        }
    }
    u8::MAX
}
