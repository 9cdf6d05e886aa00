//! 3×3 grayscale dilation and erosion.
//!
//! Both read the Blue channel as the reference value, so they expect neutral
//! imagery (grayscale or already binarized). The result is broadcast to B, G
//! and R. Border pixels and alpha are left untouched.

#[cfg(test)]
mod tests;

use common::parallel::ParRowsMutAuto;
use common::Buffer2;
use rayon::prelude::*;

use crate::buffer::{PixelBuffer, BLUE, CHANNELS};

/// Maximum over the 3×3 neighborhood.
pub fn dilate(image: &mut PixelBuffer) {
    apply_3x3(image, u8::max);
}

/// Minimum over the 3×3 neighborhood.
pub fn erode(image: &mut PixelBuffer) {
    apply_3x3(image, u8::min);
}

fn apply_3x3(image: &mut PixelBuffer, reduce: fn(u8, u8) -> u8) {
    let width = image.width();
    let height = image.height();
    if width < 3 || height < 3 {
        return;
    }

    let reference = reference_plane(image);
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
                let above = reference.row(y - 1);
                let current = reference.row(y);
                let below = reference.row(y + 1);
                for x in 1..width - 1 {
                    let v = [above, current, below]
                        .iter()
                        .flat_map(|r| &r[x - 1..=x + 1])
                        .copied()
                        .reduce(reduce)
                        .unwrap_or(current[x]);
                    row[x * CHANNELS..x * CHANNELS + 3].fill(v);
                }
            }
        });
}

/// Snapshot of the reference channel, taken before any pixel is rewritten.
fn reference_plane(image: &PixelBuffer) -> Buffer2<u8> {
    let view = image.as_view();
    Buffer2::from_fn(image.width(), image.height(), |x, y| {
        view.bytes()[view.index(x, y, BLUE)]
    })
}
