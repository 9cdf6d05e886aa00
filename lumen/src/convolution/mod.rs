//! Linear neighborhood filters: Gaussian blur, Sobel and Laplacian.
//!
//! Gaussian blur is separable: a horizontal pass into a scratch buffer, then a
//! vertical pass back into the image. That is O(n×k) instead of O(n×k²) for a
//! direct 2D convolution. Both passes clamp out-of-range taps to the nearest
//! edge pixel and quantize to 8 bits, so the intermediate buffer has the same
//! layout as the image.
//!
//! Sobel and Laplacian operate on the luminance plane and broadcast their
//! response to the B, G, R channels.


use common::parallel::ParRowsMutAuto;
use common::Buffer2;
use rayon::prelude::*;

use crate::buffer::{clamp_coord, PixelBuffer, ALPHA, CHANNELS};
use crate::error::{Error, Result};
use crate::luminance::{luminance_plane, write_gray};

/// Color channels blurred by [`gaussian_blur`]. Alpha is copied.
const COLOR_CHANNELS: usize = 3;

/// Largest Gaussian kernel radius [`gaussian_kernel_1d`] will build.
pub const MAX_GAUSSIAN_RADIUS: usize = 1 << 16;

/// Horizontal Sobel kernel.
const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
/// Vertical Sobel kernel.
const SOBEL_Y: [[i32; 3]; 3] = [[1, 2, 1], [0, 0, 0], [-1, -2, -1]];

/// Kernel radius `ceil(3 * sigma)` for a valid sigma.
pub(crate) fn gaussian_radius(sigma: f32) -> Result<usize> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(Error::InvalidSigma(sigma));
    }
    let radius = (3.0 * sigma as f64).ceil();
    if radius > MAX_GAUSSIAN_RADIUS as f64 {
        return Err(Error::InvalidSigma(sigma));
    }
    Ok(radius as usize)
}

/// Compute 1D Gaussian kernel.
///
/// The kernel is normalized so that it sums to 1.0.
/// Kernel radius is `ceil(3 * sigma)` to capture 99.7% of the Gaussian.
/// `sigma == 0` yields the identity kernel `[1.0]`. A sigma whose radius
/// exceeds [`MAX_GAUSSIAN_RADIUS`] is rejected.
///
/// # Returns
/// Vector containing the kernel values, length is 2 * radius + 1
pub fn gaussian_kernel_1d(sigma: f32) -> Result<Vec<f64>> {
    let radius = gaussian_radius(sigma)?;
    if radius == 0 {
        return Ok(vec![1.0]);
    }

    let sigma = sigma as f64;
    let mut kernel: Vec<f64> = (0..2 * radius + 1)
        .map(|i| {
            let x = (i as f64 - radius as f64) / sigma;
            (-0.5 * x * x).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }

    Ok(kernel)
}

#[inline]
fn quantize(v: f64) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

/// Blur the color channels with a separable Gaussian of standard deviation
/// `sigma`. Alpha passes through unchanged.
pub fn gaussian_blur(image: &mut PixelBuffer, sigma: f32) -> Result<()> {
    let kernel = gaussian_kernel_1d(sigma)?;
    if kernel.len() == 1 {
        return Ok(());
    }

    let width = image.width();
    let height = image.height();
    let stride = image.stride();
    let radius = (kernel.len() / 2) as isize;

    // Step 1: horizontal pass into scratch
    let mut temp = vec![0u8; image.bytes().len()];
    {
        let src = image.bytes();
        temp.par_rows_mut_auto(stride)
            .for_each(|(start_row, chunk)| {
                for (local_y, out_row) in chunk.chunks_mut(stride).enumerate() {
                    let in_row = &src[(start_row + local_y) * stride..][..stride];
                    convolve_row(in_row, out_row, width, &kernel, radius);
                }
            });
    }

    // Step 2: vertical pass back into the image
    image
        .bytes_mut()
        .par_rows_mut_auto(stride)
        .for_each(|(start_row, chunk)| {
            for (local_y, out_row) in chunk.chunks_mut(stride).enumerate() {
                let y = (start_row + local_y) as isize;
                for x in 0..width {
                    let mut acc = [0.0f64; COLOR_CHANNELS];
                    for (k, &weight) in kernel.iter().enumerate() {
                        let sy = clamp_coord(y + k as isize - radius, height);
                        let idx = sy * stride + x * CHANNELS;
                        for (c, a) in acc.iter_mut().enumerate() {
                            *a += temp[idx + c] as f64 * weight;
                        }
                    }
                    let out = &mut out_row[x * CHANNELS..(x + 1) * CHANNELS];
                    for (c, &a) in acc.iter().enumerate() {
                        out[c] = quantize(a);
                    }
                }
            }
        });

    Ok(())
}

/// Convolve one BGRA row with a 1D kernel, clamping at the row ends.
#[inline]
fn convolve_row(input: &[u8], output: &mut [u8], width: usize, kernel: &[f64], radius: isize) {
    for x in 0..width {
        let mut acc = [0.0f64; COLOR_CHANNELS];
        for (k, &weight) in kernel.iter().enumerate() {
            let sx = clamp_coord(x as isize + k as isize - radius, width);
            let idx = sx * CHANNELS;
            for (c, a) in acc.iter_mut().enumerate() {
                *a += input[idx + c] as f64 * weight;
            }
        }
        let base = x * CHANNELS;
        for (c, &a) in acc.iter().enumerate() {
            output[base + c] = quantize(a);
        }
        output[base + ALPHA] = input[base + ALPHA];
    }
}

/// Gradient magnitude of the luminance plane.
///
/// Every pixel, including the border, sees a full 3×3 neighborhood with
/// out-of-range taps clamped to the edge. The magnitude `sqrt(Gx² + Gy²)` is
/// clamped to 255 and truncated.
pub fn sobel(image: &mut PixelBuffer) {
    let gray = luminance_plane(&image.as_view());
    let magnitude = sobel_magnitude(&gray);
    write_gray(image, &magnitude);
}

pub(crate) fn sobel_magnitude(gray: &Buffer2<u8>) -> Buffer2<u8> {
    let width = gray.width();
    let height = gray.height();
    let mut output = Buffer2::new_default(width, height);

    output
        .pixels_mut()
        .par_rows_mut_auto(width)
        .for_each(|(start_row, chunk)| {
            for (local_y, out_row) in chunk.chunks_mut(width).enumerate() {
                let y = (start_row + local_y) as isize;
                for (x, out) in out_row.iter_mut().enumerate() {
                    let mut gx = 0i32;
                    let mut gy = 0i32;
                    for ky in 0..3 {
                        let sy = clamp_coord(y + ky as isize - 1, height);
                        for kx in 0..3 {
                            let sx = clamp_coord(x as isize + kx as isize - 1, width);
                            let v = gray[(sx, sy)] as i32;
                            gx += v * SOBEL_X[ky][kx];
                            gy += v * SOBEL_Y[ky][kx];
                        }
                    }
                    let mag = ((gx * gx + gy * gy) as f64).sqrt();
                    *out = quantize(mag);
                }
            }
        });

    output
}

/// 8-neighbor Laplacian edge response.
///
/// Interior pixels get `|Σ neighbors − 8·center|` rescaled so the strongest
/// response maps to 255. Border pixels are left as they were. A flat image
/// has no response anywhere and is written as 0 on the interior.
pub fn laplacian(image: &mut PixelBuffer) {
    let width = image.width();
    let height = image.height();
    if width < 3 || height < 3 {
        return;
    }

    let gray = luminance_plane(&image.as_view());
    let response = laplacian_response(&gray);

    let max = response.par_iter().copied().max().unwrap_or(0).max(1);

    let stride = image.stride();
    image
        .bytes_mut()
        .par_rows_mut_auto(stride)
        .for_each(|(start_row, chunk)| {
            for (local_y, row) in chunk.chunks_mut(stride).enumerate() {
                let y = start_row + local_y;
                if y == 0 || y == height - 1 {
                    continue;
                }
                for x in 1..width - 1 {
                    let v = (response[(x, y)] * 255 / max) as u8;
                    row[x * CHANNELS..x * CHANNELS + COLOR_CHANNELS].fill(v);
                }
            }
        });
}

/// Absolute 8-neighbor Laplacian on interior pixels; border entries are 0.
pub(crate) fn laplacian_response(gray: &Buffer2<u8>) -> Buffer2<u32> {
    let width = gray.width();
    let height = gray.height();
    let mut response = Buffer2::new_default(width, height);
    if width < 3 || height < 3 {
        return response;
    }

    response
        .pixels_mut()
        .par_rows_mut_auto(width)
        .for_each(|(start_row, chunk)| {
            for (local_y, out_row) in chunk.chunks_mut(width).enumerate() {
                let y = start_row + local_y;
                if y == 0 || y == height - 1 {
                    continue;
                }
                let above = gray.row(y - 1);
                let current = gray.row(y);
                let below = gray.row(y + 1);
                for x in 1..width - 1 {
                    let neighbors: i32 = [
                        above[x - 1],
                        above[x],
                        above[x + 1],
                        current[x - 1],
                        current[x + 1],
                        below[x - 1],
                        below[x],
                        below[x + 1],
                    ]
                    .iter()
                    .map(|&v| v as i32)
                    .sum();
                    out_row[x] = (neighbors - 8 * current[x] as i32).unsigned_abs();
                }
            }
        });

    response
}
