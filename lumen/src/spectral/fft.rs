//! Radix-2 Cooley-Tukey FFT and the 2D helpers built on it.

use std::f64::consts::PI;

use common::Buffer2;
use num_complex::Complex64;
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Twiddles `e^{-2πik/len}`.
    Forward,
    /// Twiddles `e^{+2πik/len}`, output scaled by `1/n`.
    Inverse,
}

impl Direction {
    #[inline]
    fn sign(self) -> f64 {
        match self {
            Direction::Forward => -1.0,
            Direction::Inverse => 1.0,
        }
    }
}

/// Smallest power of two `>= n`, with `next_power_of_two(0) == 1`.
#[inline]
pub fn next_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// In-place 1D FFT. `data.len()` must be a power of two.
pub fn fft_in_place(data: &mut [Complex64], direction: Direction) {
    let n = data.len();
    assert!(n.is_power_of_two(), "FFT length {n} is not a power of two");
    if n == 1 {
        return;
    }

    // Bit-reversal permutation
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            data.swap(i, j);
        }
    }

    // Butterfly stages; each stage reads only the previous stage's output.
    let sign = direction.sign();
    let mut twiddles = Vec::with_capacity(n / 2);
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = sign * 2.0 * PI / len as f64;
        twiddles.clear();
        twiddles.extend((0..half).map(|k| Complex64::from_polar(1.0, step * k as f64)));

        for block in data.chunks_exact_mut(len) {
            let (lo, hi) = block.split_at_mut(half);
            for ((u, v), &w) in lo.iter_mut().zip(hi.iter_mut()).zip(&twiddles) {
                let t = *v * w;
                *v = *u - t;
                *u += t;
            }
        }
        len <<= 1;
    }

    if direction == Direction::Inverse {
        let scale = 1.0 / n as f64;
        for v in data.iter_mut() {
            *v *= scale;
        }
    }
}

/// Separable 2D FFT: every row, then every column.
///
/// Columns are transformed as rows of the transpose so both passes work on
/// contiguous memory.
pub fn fft_2d(spectrum: &mut Buffer2<Complex64>, direction: Direction) {
    fft_rows(spectrum, direction);
    let mut transposed = spectrum.transposed();
    fft_rows(&mut transposed, direction);
    *spectrum = transposed.transposed();
}

fn fft_rows(spectrum: &mut Buffer2<Complex64>, direction: Direction) {
    let width = spectrum.width();
    spectrum
        .pixels_mut()
        .par_chunks_mut(width)
        .for_each(|row| fft_in_place(row, direction));
}

/// Moves the zero-frequency term to `(width / 2, height / 2)` by swapping
/// diagonal quadrants.
pub fn fft_shift(spectrum: &Buffer2<Complex64>) -> Buffer2<Complex64> {
    let width = spectrum.width();
    let height = spectrum.height();
    let cx = width / 2;
    let cy = height / 2;
    Buffer2::from_fn(width, height, |x, y| {
        spectrum[((x + width - cx) % width, (y + height - cy) % height)]
    })
}

/// `ln(1 + |X|)` scaled so the largest value maps to 255, truncated.
/// An all-zero spectrum maps to all zeros.
pub fn log_magnitude(spectrum: &Buffer2<Complex64>) -> Buffer2<u8> {
    let magnitudes: Vec<f64> = spectrum.par_iter().map(|c| c.norm().ln_1p()).collect();
    let max = magnitudes.iter().copied().fold(0.0f64, f64::max);
    if max <= 0.0 {
        return Buffer2::new_default(spectrum.width(), spectrum.height());
    }

    let pixels = magnitudes
        .into_iter()
        .map(|v| ((v / max) * 255.0).clamp(0.0, 255.0) as u8)
        .collect();
    Buffer2::new(spectrum.width(), spectrum.height(), pixels)
}
