//! Reduction of BGRA pixels to 8-bit intensity.

use common::parallel::ParRowsMutAuto;
use common::Buffer2;
use rayon::prelude::*;

use crate::buffer::{PixelBuffer, PixelView, ALPHA, BLUE, CHANNELS, GREEN, RED};

/// Perceptual weights in thousandths, in B, G, R order.
const WEIGHT_B: u32 = 114;
const WEIGHT_G: u32 = 587;
const WEIGHT_R: u32 = 299;
const WEIGHT_SCALE: u32 = 1000;

/// `0.114·B + 0.587·G + 0.299·R`, truncated.
///
/// Evaluated in fixed point so a neutral pixel maps exactly to its own value.
#[inline]
pub fn luminance(b: u8, g: u8, r: u8) -> u8 {
    let weighted = WEIGHT_B * b as u32 + WEIGHT_G * g as u32 + WEIGHT_R * r as u32;
    (weighted / WEIGHT_SCALE) as u8
}

/// Luminance of every pixel as a `width × height` plane.
pub fn luminance_plane(image: &PixelView) -> Buffer2<u8> {
    let width = image.width();
    let mut plane = Buffer2::new_default(width, image.height());

    plane
        .pixels_mut()
        .par_rows_mut_auto(width)
        .for_each(|(start_row, chunk)| {
            for (local_y, out_row) in chunk.chunks_mut(width).enumerate() {
                let src = image.row(start_row + local_y);
                for (out, px) in out_row.iter_mut().zip(src.chunks_exact(CHANNELS)) {
                    *out = luminance(px[BLUE], px[GREEN], px[RED]);
                }
            }
        });

    plane
}

fn broadcast_gray(image: &mut PixelBuffer, plane: &Buffer2<u8>, alpha: Option<u8>) {
    assert_eq!(plane.width(), image.width(), "width mismatch");
    assert_eq!(plane.height(), image.height(), "height mismatch");

    let stride = image.stride();
    image
        .bytes_mut()
        .par_rows_mut_auto(stride)
        .for_each(|(start_row, chunk)| {
            for (local_y, row) in chunk.chunks_mut(stride).enumerate() {
                let gray = plane.row(start_row + local_y);
                for (px, &v) in row.chunks_exact_mut(CHANNELS).zip(gray) {
                    px[BLUE] = v;
                    px[GREEN] = v;
                    px[RED] = v;
                    if let Some(a) = alpha {
                        px[ALPHA] = a;
                    }
                }
            }
        });
}

/// Writes `plane` into the color channels, leaving alpha untouched.
pub fn write_gray(image: &mut PixelBuffer, plane: &Buffer2<u8>) {
    broadcast_gray(image, plane, None);
}

/// Writes `plane` into the color channels and marks every pixel opaque.
pub fn write_gray_opaque(image: &mut PixelBuffer, plane: &Buffer2<u8>) {
    broadcast_gray(image, plane, Some(u8::MAX));
}

/// Replaces each pixel's color channels with their integer average.
pub fn apply_grayscale(image: &mut PixelBuffer) {
    let stride = image.stride();
    image
        .bytes_mut()
        .par_rows_mut_auto(stride)
        .for_each(|(_, chunk)| {
            for px in chunk.chunks_exact_mut(CHANNELS) {
                let sum = px[BLUE] as u32 + px[GREEN] as u32 + px[RED] as u32;
                let avg = (sum / 3) as u8;
                px[BLUE] = avg;
                px[GREEN] = avg;
                px[RED] = avg;
            }
        });
}
