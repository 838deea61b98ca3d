use image::{Rgb, RgbImage};
use std::path::Path;

/// Write an 8x8 grid of grey blocks whose shades are drawn from `seed`.
///
/// Different seeds give visually unrelated images; the same seed always
/// gives the same pixels regardless of the output format.
/// `tests/cli.rs` carries a copy as `write_image`; keep the two in sync.
pub fn write_blocks(path: &Path, seed: u32) {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    let mut cells = [0u8; 64];
    for cell in cells.iter_mut() {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        *cell = (state >> 24) as u8;
    }

    let img = RgbImage::from_fn(128, 128, |x, y| {
        let v = cells[((y / 16) * 8 + x / 16) as usize];
        Rgb([v, v, v])
    });
    img.save(path).unwrap();
}
