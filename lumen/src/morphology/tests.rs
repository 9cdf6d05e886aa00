use super::*;
use crate::buffer::{ALPHA, GREEN, RED};

fn gray_image(values: &[u8]) -> Vec<u8> {
    values.iter().flat_map(|&v| [v, v, v, 200]).collect()
}

fn blue(data: &[u8]) -> Vec<u8> {
    data.chunks_exact(CHANNELS).map(|px| px[BLUE]).collect()
}

fn pattern(width: usize, height: usize) -> Vec<u8> {
    (0..width * height).map(|i| ((i * 97) % 256) as u8).collect()
}

#[test]
fn test_dilate_spreads_single_pixel() {
    #[rustfmt::skip]
    let values = [
        0, 0, 0, 0, 0,
        0, 0, 0, 0, 0,
        0, 0, 255, 0, 0,
        0, 0, 0, 0, 0,
        0, 0, 0, 0, 0,
    ];
    let mut data = gray_image(&values);
    let mut image = PixelBuffer::new(&mut data, 5, 5).unwrap();
    dilate(&mut image);

    #[rustfmt::skip]
    let expected = vec![
        0, 0, 0, 0, 0,
        0, 255, 255, 255, 0,
        0, 255, 255, 255, 0,
        0, 255, 255, 255, 0,
        0, 0, 0, 0, 0,
    ];
    assert_eq!(blue(&data), expected);
}

#[test]
fn test_erode_removes_isolated_pixel() {
    let mut values = [255u8; 25];
    values[12] = 0;
    let mut data = gray_image(&values);
    let mut image = PixelBuffer::new(&mut data, 5, 5).unwrap();
    erode(&mut image);

    let result = blue(&data);
    for y in 1..4 {
        for x in 1..4 {
            assert_eq!(result[y * 5 + x], 0, "interior ({x}, {y}) should be eroded");
        }
    }
    assert_eq!(result[0], 255, "border must keep its value");
}

#[test]
fn test_dilate_never_decreases_erode_never_increases() {
    let width = 9;
    let height = 7;
    let values = pattern(width, height);

    let mut dilated = gray_image(&values);
    dilate(&mut PixelBuffer::new(&mut dilated, width, height).unwrap());
    let mut eroded = gray_image(&values);
    erode(&mut PixelBuffer::new(&mut eroded, width, height).unwrap());

    for (i, &v) in values.iter().enumerate() {
        assert!(blue(&dilated)[i] >= v, "dilation decreased pixel {i}");
        assert!(blue(&eroded)[i] <= v, "erosion increased pixel {i}");
    }
}

#[test]
fn test_border_and_alpha_untouched() {
    let width = 6;
    let height = 5;
    let values = pattern(width, height);
    let original = gray_image(&values);
    let mut data = original.clone();
    dilate(&mut PixelBuffer::new(&mut data, width, height).unwrap());

    for y in 0..height {
        for x in 0..width {
            let i = (y * width + x) * CHANNELS;
            assert_eq!(data[i + ALPHA], 200);
            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                assert_eq!(&data[i..i + 4], &original[i..i + 4], "border ({x}, {y})");
            } else {
                assert_eq!(data[i + GREEN], data[i + BLUE]);
                assert_eq!(data[i + RED], data[i + BLUE]);
            }
        }
    }
}

#[test]
fn test_reads_snapshot_not_partial_output() {
    // A 1-pixel-wide bright column must grow by exactly one on each side,
    // not smear across the whole row.
    let width = 7;
    let height = 3;
    let mut values = vec![0u8; width * height];
    for y in 0..height {
        values[y * width + 1] = 255;
    }
    let mut data = gray_image(&values);
    dilate(&mut PixelBuffer::new(&mut data, width, height).unwrap());

    let middle = &blue(&data)[width..2 * width];
    assert_eq!(middle, &[0, 255, 255, 0, 0, 0, 0]);
}

#[test]
fn test_small_images_unchanged() {
    for (width, height) in [(2, 5), (5, 2), (1, 1)] {
        let values = pattern(width, height);
        let original = gray_image(&values);
        let mut data = original.clone();
        dilate(&mut PixelBuffer::new(&mut data, width, height).unwrap());
        erode(&mut PixelBuffer::new(&mut data, width, height).unwrap());
        assert_eq!(data, original, "{width}x{height} should be left alone");
    }
}
