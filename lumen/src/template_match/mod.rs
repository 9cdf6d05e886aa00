//! Exhaustive sum-of-absolute-differences template search.
//!
//! Every placement of the template inside the target is scored on luminance.
//! Candidate rows are searched in parallel; each row reports its first
//! minimum, and rows are merged on `(sad, y, x)` so the winner is always the
//! earliest placement in row-major order, independent of scheduling.


use common::Buffer2;
use rayon::prelude::*;

use crate::buffer::PixelView;
use crate::luminance::luminance_plane;

/// Best placement of a template: top-left corner and its SAD score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateMatch {
    pub x: usize,
    pub y: usize,
    pub sad: u64,
}

impl TemplateMatch {
    #[inline]
    fn key(&self) -> (u64, usize, usize) {
        (self.sad, self.y, self.x)
    }
}

/// Find the placement of `template` in `target` with the lowest SAD.
///
/// Returns `None` when the template is wider or taller than the target.
pub fn find_template(target: &PixelView, template: &PixelView) -> Option<TemplateMatch> {
    if template.width() > target.width() || template.height() > target.height() {
        return None;
    }

    let target_gray = luminance_plane(target);
    let template_gray = luminance_plane(template);
    let max_x = target.width() - template.width();
    let max_y = target.height() - template.height();

    (0..=max_y)
        .into_par_iter()
        .map(|y| best_in_row(&target_gray, &template_gray, y, max_x))
        .min_by_key(TemplateMatch::key)
}

/// First minimum among placements `(0..=max_x, y)`.
fn best_in_row(
    target: &Buffer2<u8>,
    template: &Buffer2<u8>,
    y: usize,
    max_x: usize,
) -> TemplateMatch {
    let mut best = TemplateMatch {
        x: 0,
        y,
        sad: u64::MAX,
    };
    for x in 0..=max_x {
        if let Some(sad) = sad_at(target, template, x, y, best.sad) {
            best = TemplateMatch { x, y, sad };
        }
    }
    best
}

/// SAD at `(x, y)`, or `None` once the partial sum reaches `bound`.
#[inline]
fn sad_at(
    target: &Buffer2<u8>,
    template: &Buffer2<u8>,
    x: usize,
    y: usize,
    bound: u64,
) -> Option<u64> {
    let tw = template.width();
    let mut sad = 0u64;
    for ty in 0..template.height() {
        let target_row = &target.row(y + ty)[x..x + tw];
        sad += target_row
            .iter()
            .zip(template.row(ty))
            .map(|(&a, &b)| a.abs_diff(b) as u64)
            .sum::<u64>();
        if sad >= bound {
            return None;
        }
    }
    Some(sad)
}
