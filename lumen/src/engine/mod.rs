//! Buffer-level entry points.
//!
//! [`ImageProcessingEngine`] takes raw BGRA byte slices with their
//! dimensions, validates them, runs the requested kernel on the engine's
//! worker pool and records how long it took. It also owns the spectral
//! state, so a forward and an inverse transform must go through the same
//! engine.


use std::time::Instant;

use tracing::{debug, warn};

use crate::buffer::{PixelBuffer, PixelView};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::operation_log::{Operation, OperationLog, OperationRecord, OperationSummary};
use crate::spectral::SpectralEngine;
use crate::template_match::TemplateMatch;
use crate::{convolution, luminance, median_filter, morphology, template_match, threshold};

#[derive(Debug)]
pub struct ImageProcessingEngine {
    config: EngineConfig,
    /// Dedicated pool when `threads` is configured; otherwise the global one.
    pool: Option<rayon::ThreadPool>,
    spectral: SpectralEngine,
    log: OperationLog,
}

impl Default for ImageProcessingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageProcessingEngine {
    /// Engine with default configuration on the global rayon pool.
    pub fn new() -> Self {
        let config = EngineConfig::default();
        Self {
            log: OperationLog::new(config.max_log_entries),
            config,
            pool: None,
            spectral: SpectralEngine::new(),
        }
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let pool = match config.threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("lumen-worker-{i}"))
                    .build()?,
            ),
            None => None,
        };
        debug!(threads = ?config.threads, "Created image processing engine");

        Ok(Self {
            log: OperationLog::new(config.max_log_entries),
            config,
            pool,
            spectral: SpectralEngine::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn operation_log(&self) -> &OperationLog {
        &self.log
    }

    pub fn clear_operation_log(&mut self) {
        self.log.clear();
    }

    pub fn summary(&self) -> OperationSummary {
        self.log.summary()
    }

    pub fn spectral(&self) -> &SpectralEngine {
        &self.spectral
    }

    // ========================================================================
    // Per-pixel and neighborhood filters
    // ========================================================================

    pub fn apply_grayscale(&mut self, data: &mut [u8], width: usize, height: usize) -> Result<()> {
        self.apply(Operation::Grayscale, data, width, height, |image| {
            luminance::apply_grayscale(image);
            Ok(())
        })
    }

    pub fn gaussian_blur(
        &mut self,
        data: &mut [u8],
        width: usize,
        height: usize,
        sigma: f32,
    ) -> Result<()> {
        self.apply(Operation::GaussianBlur, data, width, height, |image| {
            convolution::gaussian_blur(image, sigma)
        })
    }

    /// Gaussian blur with the configured default sigma.
    pub fn gaussian_blur_default(
        &mut self,
        data: &mut [u8],
        width: usize,
        height: usize,
    ) -> Result<()> {
        let sigma = self.config.defaults.gaussian_sigma;
        self.gaussian_blur(data, width, height, sigma)
    }

    pub fn sobel(&mut self, data: &mut [u8], width: usize, height: usize) -> Result<()> {
        self.apply(Operation::Sobel, data, width, height, |image| {
            convolution::sobel(image);
            Ok(())
        })
    }

    pub fn laplacian(&mut self, data: &mut [u8], width: usize, height: usize) -> Result<()> {
        self.apply(Operation::Laplacian, data, width, height, |image| {
            convolution::laplacian(image);
            Ok(())
        })
    }

    pub fn median_filter(
        &mut self,
        data: &mut [u8],
        width: usize,
        height: usize,
        kernel_size: usize,
    ) -> Result<()> {
        self.apply(Operation::Median, data, width, height, |image| {
            median_filter::median_filter(image, kernel_size)
        })
    }

    /// Median filter with the configured default kernel size.
    pub fn median_filter_default(
        &mut self,
        data: &mut [u8],
        width: usize,
        height: usize,
    ) -> Result<()> {
        let kernel_size = self.config.defaults.median_kernel_size;
        self.median_filter(data, width, height, kernel_size)
    }

    /// Otsu binarization. Returns the selected threshold.
    pub fn binarize(&mut self, data: &mut [u8], width: usize, height: usize) -> Result<u8> {
        self.apply(Operation::Binarize, data, width, height, |image| {
            Ok(threshold::binarize(image))
        })
    }

    pub fn dilate(&mut self, data: &mut [u8], width: usize, height: usize) -> Result<()> {
        self.apply(Operation::Dilate, data, width, height, |image| {
            morphology::dilate(image);
            Ok(())
        })
    }

    pub fn erode(&mut self, data: &mut [u8], width: usize, height: usize) -> Result<()> {
        self.apply(Operation::Erode, data, width, height, |image| {
            morphology::erode(image);
            Ok(())
        })
    }

    // ========================================================================
    // Template search
    // ========================================================================

    /// Best SAD placement of `template` in `target`, or `None` if it does
    /// not fit. Neither buffer is modified.
    pub fn find_template(
        &mut self,
        target: &[u8],
        width: usize,
        height: usize,
        template: &[u8],
        template_width: usize,
        template_height: usize,
    ) -> Result<Option<TemplateMatch>> {
        self.run(Operation::TemplateMatch, width, height, |_| {
            let target = PixelView::new(target, width, height)?;
            let template = PixelView::new(template, template_width, template_height)?;
            Ok(template_match::find_template(&target, &template))
        })
    }

    // ========================================================================
    // Spectral analysis
    // ========================================================================

    pub fn forward_transform(
        &mut self,
        data: &mut [u8],
        width: usize,
        height: usize,
    ) -> Result<()> {
        self.run(Operation::ForwardTransform, width, height, |spectral| {
            let mut image = PixelBuffer::new(data, width, height)?;
            spectral.forward(&mut image)
        })
    }

    pub fn inverse_transform(
        &mut self,
        data: &mut [u8],
        width: usize,
        height: usize,
    ) -> Result<()> {
        self.run(Operation::InverseTransform, width, height, |spectral| {
            let mut image = PixelBuffer::new(data, width, height)?;
            spectral.inverse(&mut image)
        })
    }

    pub fn has_cached_transform(&self) -> bool {
        self.spectral.has_cached_transform()
    }

    pub fn reset_spectral_state(&mut self) {
        self.spectral.reset();
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn apply<T, F>(
        &mut self,
        operation: Operation,
        data: &mut [u8],
        width: usize,
        height: usize,
        f: F,
    ) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut PixelBuffer) -> Result<T> + Send,
    {
        self.run(operation, width, height, |_| {
            let mut image = PixelBuffer::new(data, width, height)?;
            f(&mut image)
        })
    }

    /// Runs `f` on the worker pool, logs the outcome and records successful
    /// operations.
    fn run<T, F>(&mut self, operation: Operation, width: usize, height: usize, f: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut SpectralEngine) -> Result<T> + Send,
    {
        let start = Instant::now();
        let spectral = &mut self.spectral;
        let result = match &self.pool {
            Some(pool) => pool.install(|| f(spectral)),
            None => f(spectral),
        };
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => {
                debug!(
                    %operation,
                    width,
                    height,
                    elapsed_us = elapsed.as_micros() as u64,
                    "Operation complete"
                );
                if self.config.record_operations {
                    self.log.push(OperationRecord { operation, elapsed });
                }
            }
            Err(err) => {
                warn!(%operation, width, height, error = %err, "Operation failed");
            }
        }

        result
    }
}
