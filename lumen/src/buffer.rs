//! Borrowed views over caller-owned BGRA pixel buffers.
//!
//! Layout is interleaved, row-major, one byte per channel:
//! `((y * width + x) * CHANNELS) + channel`.

use crate::error::{Error, Result};

/// Channels per pixel.
pub const CHANNELS: usize = 4;
pub const BLUE: usize = 0;
pub const GREEN: usize = 1;
pub const RED: usize = 2;
pub const ALPHA: usize = 3;

fn checked_len(len: usize, width: usize, height: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(Error::InvalidDimensions { width, height })?;
    if len < expected {
        return Err(Error::BufferTooSmall {
            expected,
            actual: len,
        });
    }
    Ok(expected)
}

/// Clamp-to-edge boundary policy: maps an out-of-range coordinate to the
/// nearest valid index in `0..len`.
#[inline]
pub fn clamp_coord(v: isize, len: usize) -> usize {
    debug_assert!(len > 0);
    v.clamp(0, len as isize - 1) as usize
}

/// Mutable view over a BGRA image for the duration of one operation.
#[derive(Debug)]
pub struct PixelBuffer<'a> {
    data: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> PixelBuffer<'a> {
    /// Validates `width`/`height` against `data`. Bytes past
    /// `width * height * CHANNELS` are never touched.
    pub fn new(data: &'a mut [u8], width: usize, height: usize) -> Result<Self> {
        let len = checked_len(data.len(), width, height)?;
        Ok(Self {
            data: &mut data[..len],
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width * CHANNELS
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, channel: usize) -> usize {
        (y * self.width + x) * CHANNELS + channel
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; CHANNELS] {
        let i = self.index(x, y, 0);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &*self.data
    }

    #[inline]
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut *self.data
    }

    pub fn as_view(&self) -> PixelView<'_> {
        PixelView {
            data: &*self.data,
            width: self.width,
            height: self.height,
        }
    }
}

/// Read-only view over a BGRA image.
#[derive(Debug, Clone, Copy)]
pub struct PixelView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> PixelView<'a> {
    pub fn new(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        let len = checked_len(data.len(), width, height)?;
        Ok(Self {
            data: &data[..len],
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.width * CHANNELS
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, channel: usize) -> usize {
        (y * self.width + x) * CHANNELS + channel
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; CHANNELS] {
        let i = self.index(x, y, 0);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let stride = self.stride();
        &self.data[y * stride..(y + 1) * stride]
    }
}
