//! Lumen - pixel-buffer image processing kernel.
//!
//! Operations run in place on caller-owned BGRA byte buffers:
//! - Grayscale and luminance reduction
//! - Gaussian blur, Sobel and Laplacian
//! - k×k median filter
//! - 3×3 dilation and erosion
//! - Otsu binarization
//! - SAD template search
//! - 2D FFT with log-magnitude visualization and inverse reconstruction
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lumen::ImageProcessingEngine;
//!
//! let mut engine = ImageProcessingEngine::new();
//! engine.gaussian_blur(&mut pixels, width, height, 1.5)?;
//! let threshold = engine.binarize(&mut pixels, width, height)?;
//!
//! engine.forward_transform(&mut pixels, width, height)?;
//! engine.inverse_transform(&mut pixels, width, height)?;
//! println!("{}", engine.summary());
//! ```
//!
//! The free functions in each module operate on a validated [`PixelBuffer`]
//! directly and can be used without an engine.

pub mod buffer;
pub mod config;
pub mod convolution;
pub mod engine;
pub mod error;
pub mod luminance;
pub mod median_filter;
pub mod morphology;
pub mod operation_log;
pub mod spectral;
pub mod template_match;
pub mod threshold;

// ============================================================================
// Buffers and errors
// ============================================================================

pub use buffer::{clamp_coord, PixelBuffer, PixelView, ALPHA, BLUE, CHANNELS, GREEN, RED};
pub use error::{Error, Result};

// ============================================================================
// Engine
// ============================================================================

pub use config::{EngineConfig, FilterDefaults};
pub use engine::ImageProcessingEngine;
pub use operation_log::{Operation, OperationLog, OperationRecord, OperationSummary};

// ============================================================================
// Kernels
// ============================================================================

pub use convolution::{gaussian_blur, gaussian_kernel_1d, laplacian, sobel};
pub use luminance::{apply_grayscale, luminance, luminance_plane};
pub use median_filter::median_filter;
pub use morphology::{dilate, erode};
pub use spectral::{CachedSpectrum, SpectralEngine, SpectralState};
pub use template_match::{find_template, TemplateMatch};
pub use threshold::{binarize, otsu_threshold, Histogram};
