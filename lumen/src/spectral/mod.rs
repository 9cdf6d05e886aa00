//! Frequency-domain analysis and reconstruction.
//!
//! [`SpectralEngine::forward`] transforms the luminance of an image, keeps the
//! unshifted spectrum, and overwrites the image with a centered log-magnitude
//! view. [`SpectralEngine::inverse`] consumes the kept spectrum and writes the
//! reconstructed luminance back. Each image axis is zero-padded independently
//! to the next power of two before transforming.
//!
//! The cached spectrum lives in the engine instance. One instance must not be
//! driven from several threads at once; use one engine per concurrent caller.

pub mod fft;

#[cfg(test)]
mod tests;

use common::Buffer2;
use num_complex::Complex64;
use tracing::{info, warn};

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};
use crate::luminance::{luminance_plane, write_gray_opaque};

pub use fft::{fft_2d, fft_in_place, fft_shift, log_magnitude, next_power_of_two, Direction};

/// Spectrum retained between a forward and an inverse transform.
#[derive(Debug, Clone)]
pub struct CachedSpectrum {
    /// Unshifted forward transform, input of the inverse.
    backup: Buffer2<Complex64>,
    /// Quadrant-swapped copy used for the visualization.
    current: Buffer2<Complex64>,
    /// Unpadded size of the source image.
    width: usize,
    height: usize,
}

impl CachedSpectrum {
    pub fn spectrum(&self) -> &Buffer2<Complex64> {
        &self.backup
    }

    pub fn shifted(&self) -> &Buffer2<Complex64> {
        &self.current
    }

    pub fn source_dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

#[derive(Debug, Clone, Default)]
pub enum SpectralState {
    #[default]
    Empty,
    ForwardCached(Box<CachedSpectrum>),
}

#[derive(Debug, Default)]
pub struct SpectralEngine {
    state: SpectralState,
}

impl SpectralEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SpectralState {
        &self.state
    }

    pub fn has_cached_transform(&self) -> bool {
        matches!(self.state, SpectralState::ForwardCached(_))
    }

    /// Shifted spectrum of the last forward transform, if one is cached.
    pub fn shifted_spectrum(&self) -> Option<&Buffer2<Complex64>> {
        match &self.state {
            SpectralState::Empty => None,
            SpectralState::ForwardCached(cached) => Some(cached.shifted()),
        }
    }

    /// Discard any cached transform.
    pub fn reset(&mut self) {
        if self.has_cached_transform() {
            info!("Discarding cached spectrum");
        }
        self.state = SpectralState::Empty;
    }

    /// Forward 2D FFT of the image luminance.
    ///
    /// The image is overwritten with `ln(1 + |X|)` of the centered spectrum,
    /// normalized to 0..=255 and cropped to the centered `width × height`
    /// window, fully opaque. A previously cached spectrum is replaced.
    pub fn forward(&mut self, image: &mut PixelBuffer) -> Result<()> {
        let width = image.width();
        let height = image.height();
        let pad_width = next_power_of_two(width);
        let pad_height = next_power_of_two(height);

        let gray = luminance_plane(&image.as_view());
        let mut spectrum = Buffer2::from_fn(pad_width, pad_height, |x, y| {
            if x < width && y < height {
                Complex64::new(gray[(x, y)] as f64, 0.0)
            } else {
                Complex64::new(0.0, 0.0)
            }
        });
        fft_2d(&mut spectrum, Direction::Forward);

        let shifted = fft_shift(&spectrum);
        let magnitude = log_magnitude(&shifted);
        let start_x = (pad_width - width) / 2;
        let start_y = (pad_height - height) / 2;
        let view = Buffer2::from_fn(width, height, |x, y| magnitude[(x + start_x, y + start_y)]);
        write_gray_opaque(image, &view);

        if self.has_cached_transform() {
            info!("Replacing cached spectrum");
        }
        self.state = SpectralState::ForwardCached(Box::new(CachedSpectrum {
            backup: spectrum,
            current: shifted,
            width,
            height,
        }));
        info!(width, height, pad_width, pad_height, "Cached forward transform");

        Ok(())
    }

    /// Inverse 2D FFT of the cached spectrum.
    ///
    /// Writes the real part of the top-left `width × height` region, rounded
    /// and clamped, as opaque grayscale, then clears the cache. Fails without
    /// touching the image or the cache when nothing is cached or when the
    /// image size differs from the one that was transformed.
    pub fn inverse(&mut self, image: &mut PixelBuffer) -> Result<()> {
        match &self.state {
            SpectralState::Empty => {
                warn!("Inverse transform requested with no cached spectrum");
                return Err(Error::NoCachedTransform);
            }
            SpectralState::ForwardCached(cached) => {
                if (cached.width, cached.height) != (image.width(), image.height()) {
                    warn!(
                        expected_width = cached.width,
                        expected_height = cached.height,
                        actual_width = image.width(),
                        actual_height = image.height(),
                        "Inverse transform target does not match cached spectrum"
                    );
                    return Err(Error::SpectrumDimensionMismatch {
                        expected_width: cached.width,
                        expected_height: cached.height,
                        actual_width: image.width(),
                        actual_height: image.height(),
                    });
                }
            }
        }

        let SpectralState::ForwardCached(cached) = std::mem::take(&mut self.state) else {
            return Err(Error::NoCachedTransform);
        };
        let CachedSpectrum {
            backup: mut spatial,
            width,
            height,
            ..
        } = *cached;

        fft_2d(&mut spatial, Direction::Inverse);
        let plane = Buffer2::from_fn(width, height, |x, y| {
            spatial[(x, y)].re.round().clamp(0.0, 255.0) as u8
        });
        write_gray_opaque(image, &plane);
        info!(width, height, "Reconstructed image from cached spectrum");

        Ok(())
    }
}
