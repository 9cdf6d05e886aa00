//! Tests for the FFT primitives and the spectral state machine.

use rustfft::FftPlanner;

use super::*;
use crate::buffer::{PixelView, ALPHA, BLUE, CHANNELS, GREEN, RED};

fn signal(n: usize) -> Vec<Complex64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            Complex64::new((t * 0.7).sin() * 10.0 + t, (t * 1.3).cos() * 3.0)
        })
        .collect()
}

fn assert_close(actual: &[Complex64], expected: &[Complex64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).norm() < tolerance,
            "element {i}: got {a}, expected {e}"
        );
    }
}

fn gray_image(width: usize, height: usize, f: impl Fn(usize, usize) -> u8) -> Vec<u8> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .flat_map(|(x, y)| {
            let v = f(x, y);
            [v, v, v, 128]
        })
        .collect()
}

fn blue(data: &[u8]) -> Vec<u8> {
    data.chunks_exact(CHANNELS).map(|px| px[BLUE]).collect()
}

// ============================================================================
// FFT primitive tests
// ============================================================================

#[test]
fn test_next_power_of_two() {
    assert_eq!(next_power_of_two(0), 1);
    assert_eq!(next_power_of_two(1), 1);
    assert_eq!(next_power_of_two(5), 8);
    assert_eq!(next_power_of_two(64), 64);
    assert_eq!(next_power_of_two(65), 128);
}

#[test]
fn test_forward_matches_rustfft() {
    let mut planner = FftPlanner::<f64>::new();
    for n in [1, 2, 4, 8, 64, 256] {
        let mut expected = signal(n);
        planner.plan_fft_forward(n).process(&mut expected);

        let mut actual = signal(n);
        fft_in_place(&mut actual, Direction::Forward);
        assert_close(&actual, &expected, 1e-9 * n as f64);
    }
}

#[test]
fn test_inverse_matches_scaled_rustfft() {
    let mut planner = FftPlanner::<f64>::new();
    for n in [2, 16, 128] {
        let mut expected = signal(n);
        planner.plan_fft_inverse(n).process(&mut expected);
        for v in &mut expected {
            *v /= n as f64;
        }

        let mut actual = signal(n);
        fft_in_place(&mut actual, Direction::Inverse);
        assert_close(&actual, &expected, 1e-9 * n as f64);
    }
}

#[test]
fn test_forward_then_inverse_is_identity() {
    let original = signal(32);
    let mut data = original.clone();
    fft_in_place(&mut data, Direction::Forward);
    fft_in_place(&mut data, Direction::Inverse);
    assert_close(&data, &original, 1e-9);
}

#[test]
#[should_panic(expected = "not a power of two")]
fn test_rejects_non_power_of_two_length() {
    let mut data = signal(6);
    fft_in_place(&mut data, Direction::Forward);
}

#[test]
fn test_fft_2d_matches_rustfft_rows_then_columns() {
    let width = 8;
    let height = 4;
    let input = signal(width * height);

    let mut planner = FftPlanner::<f64>::new();
    let row_fft = planner.plan_fft_forward(width);
    let col_fft = planner.plan_fft_forward(height);
    let mut expected = input.clone();
    for row in expected.chunks_mut(width) {
        row_fft.process(row);
    }
    for x in 0..width {
        let mut column: Vec<Complex64> = (0..height).map(|y| expected[y * width + x]).collect();
        col_fft.process(&mut column);
        for (y, v) in column.into_iter().enumerate() {
            expected[y * width + x] = v;
        }
    }

    let mut actual = Buffer2::new(width, height, input);
    fft_2d(&mut actual, Direction::Forward);
    assert_close(actual.pixels(), &expected, 1e-8);
}

#[test]
fn test_fft_shift_swaps_quadrants() {
    // 4x2: quadrants are 2x1 blocks.
    let input = Buffer2::from_fn(4, 2, |x, y| Complex64::new((y * 4 + x) as f64, 0.0));
    let shifted = fft_shift(&input);
    let re: Vec<f64> = shifted.iter().map(|c| c.re).collect();
    assert_eq!(re, vec![6.0, 7.0, 4.0, 5.0, 2.0, 3.0, 0.0, 1.0]);

    // DC term lands at (width / 2, height / 2).
    let mut dc = Buffer2::new_filled(8, 4, Complex64::new(0.0, 0.0));
    dc[(0, 0)] = Complex64::new(1.0, 0.0);
    assert_eq!(fft_shift(&dc)[(4, 2)], Complex64::new(1.0, 0.0));
}

#[test]
fn test_log_magnitude_normalization() {
    let mut spectrum = Buffer2::new_filled(2, 2, Complex64::new(0.0, 0.0));
    spectrum[(1, 1)] = Complex64::new(0.0, 100.0);
    spectrum[(0, 1)] = Complex64::new((101f64.sqrt()) - 1.0, 0.0);
    let magnitude = log_magnitude(&spectrum);
    assert_eq!(magnitude[(1, 1)], 255);
    assert_eq!(magnitude[(0, 0)], 0);
    // ln(sqrt(101)) / ln(101) = 0.5
    assert!((126..=127).contains(&magnitude[(0, 1)]));
}

#[test]
fn test_log_magnitude_all_zero() {
    let spectrum = Buffer2::new_filled(4, 4, Complex64::new(0.0, 0.0));
    assert!(log_magnitude(&spectrum).iter().all(|&v| v == 0));
}

// ============================================================================
// Spectral engine tests
// ============================================================================

#[test]
fn test_round_trip_gradient_8x8() {
    let width = 8;
    let height = 8;
    let original = gray_image(width, height, |x, y| (x * 20 + y * 10) as u8);
    let mut data = original.clone();
    let mut engine = SpectralEngine::new();

    let mut image = PixelBuffer::new(&mut data, width, height).unwrap();
    engine.forward(&mut image).unwrap();
    assert!(engine.has_cached_transform());
    engine.inverse(&mut image).unwrap();
    assert!(!engine.has_cached_transform());

    for (i, (out, orig)) in data
        .chunks_exact(CHANNELS)
        .zip(original.chunks_exact(CHANNELS))
        .enumerate()
    {
        assert!(
            out[BLUE].abs_diff(orig[BLUE]) <= 1,
            "pixel {i}: got {}, expected {}",
            out[BLUE],
            orig[BLUE]
        );
        assert_eq!(out[ALPHA], 255, "reconstruction is opaque");
    }
}

#[test]
fn test_round_trip_padded_color_image() {
    // 5x3 pads to 8x4; the reconstruction is the luminance of the source.
    let width = 5;
    let height = 3;
    let mut data: Vec<u8> = (0..width * height)
        .flat_map(|i| [(i * 17) as u8, (i * 5 + 40) as u8, (255 - i * 9) as u8, 0])
        .collect();
    let expected = luminance_plane(&PixelView::new(&data, width, height).unwrap());

    let mut engine = SpectralEngine::new();
    let mut image = PixelBuffer::new(&mut data, width, height).unwrap();
    engine.forward(&mut image).unwrap();
    assert_eq!(
        engine.shifted_spectrum().map(|s| (s.width(), s.height())),
        Some((8, 4))
    );
    engine.inverse(&mut image).unwrap();

    for (i, px) in data.chunks_exact(CHANNELS).enumerate() {
        let e = expected.pixels()[i];
        assert!(px[BLUE].abs_diff(e) <= 1, "pixel {i}: got {}, expected {e}", px[BLUE]);
        assert_eq!(px[GREEN], px[BLUE]);
        assert_eq!(px[RED], px[BLUE]);
    }
}

#[test]
fn test_forward_visualization_centers_dc() {
    // Uniform 4x4: only the DC term is nonzero.
    let mut data = gray_image(4, 4, |_, _| 100);
    let mut engine = SpectralEngine::new();
    let mut image = PixelBuffer::new(&mut data, 4, 4).unwrap();
    engine.forward(&mut image).unwrap();

    let result = blue(&data);
    for (i, &v) in result.iter().enumerate() {
        let expected = if i == 2 * 4 + 2 { 255 } else { 0 };
        assert_eq!(v, expected, "pixel {i}");
    }
    assert!(data.chunks_exact(CHANNELS).all(|px| px[ALPHA] == 255));
}

#[test]
fn test_forward_on_black_image_is_black() {
    let mut data = gray_image(3, 5, |_, _| 0);
    let mut engine = SpectralEngine::new();
    let mut image = PixelBuffer::new(&mut data, 3, 5).unwrap();
    engine.forward(&mut image).unwrap();
    assert!(blue(&data).iter().all(|&v| v == 0));
    assert!(engine.has_cached_transform());
}

#[test]
fn test_inverse_without_forward_fails() {
    let original = gray_image(4, 4, |x, _| x as u8);
    let mut data = original.clone();
    let mut engine = SpectralEngine::new();
    let mut image = PixelBuffer::new(&mut data, 4, 4).unwrap();

    assert!(matches!(
        engine.inverse(&mut image),
        Err(Error::NoCachedTransform)
    ));
    assert_eq!(data, original, "failed inverse must not write");
}

#[test]
fn test_double_inverse_fails() {
    let mut data = gray_image(4, 4, |x, y| (x + y) as u8);
    let mut engine = SpectralEngine::new();
    let mut image = PixelBuffer::new(&mut data, 4, 4).unwrap();
    engine.forward(&mut image).unwrap();
    engine.inverse(&mut image).unwrap();
    assert!(matches!(
        engine.inverse(&mut image),
        Err(Error::NoCachedTransform)
    ));
}

#[test]
fn test_reset_discards_cache() {
    let mut data = gray_image(4, 4, |x, y| (x * y) as u8);
    let mut engine = SpectralEngine::new();
    let mut image = PixelBuffer::new(&mut data, 4, 4).unwrap();
    engine.forward(&mut image).unwrap();
    engine.reset();

    assert!(!engine.has_cached_transform());
    assert!(engine.shifted_spectrum().is_none());
    assert!(matches!(engine.state(), SpectralState::Empty));
    assert!(engine.inverse(&mut image).is_err());
}

#[test]
fn test_dimension_mismatch_keeps_cache() {
    let mut first = gray_image(4, 4, |x, _| (x * 10) as u8);
    let mut engine = SpectralEngine::new();
    engine
        .forward(&mut PixelBuffer::new(&mut first, 4, 4).unwrap())
        .unwrap();

    let mut other = gray_image(8, 2, |_, _| 7);
    let result = engine.inverse(&mut PixelBuffer::new(&mut other, 8, 2).unwrap());
    assert!(matches!(
        result,
        Err(Error::SpectrumDimensionMismatch {
            expected_width: 4,
            expected_height: 4,
            actual_width: 8,
            actual_height: 2,
        })
    ));
    assert!(engine.has_cached_transform(), "cache must survive a mismatch");
    assert!(blue(&other).iter().all(|&v| v == 7));

    // The original-sized buffer still reconstructs.
    engine
        .inverse(&mut PixelBuffer::new(&mut first, 4, 4).unwrap())
        .unwrap();
    assert_eq!(blue(&first), blue(&gray_image(4, 4, |x, _| (x * 10) as u8)));
}

#[test]
fn test_second_forward_replaces_cache() {
    let mut small = gray_image(2, 2, |_, _| 9);
    let mut large = gray_image(6, 3, |x, _| (x * 40) as u8);
    let mut engine = SpectralEngine::new();
    engine
        .forward(&mut PixelBuffer::new(&mut small, 2, 2).unwrap())
        .unwrap();
    engine
        .forward(&mut PixelBuffer::new(&mut large, 6, 3).unwrap())
        .unwrap();

    match engine.state() {
        SpectralState::ForwardCached(cached) => {
            assert_eq!(cached.source_dimensions(), (6, 3));
            assert_eq!(cached.spectrum().width(), 8);
            assert_eq!(cached.spectrum().height(), 4);
        }
        SpectralState::Empty => panic!("expected a cached spectrum"),
    }
}
