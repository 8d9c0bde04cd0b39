//! PNG output for markers and boards.

use anyhow::{Context, Result};
use aruco::image::ImageU8;
use std::path::Path;

/// Write an 8-bit grayscale image as a PNG file.
pub fn write_image_png(img: &ImageU8, path: &Path) -> Result<()> {
    let pixels = packed_rows(img);
    write_grayscale_png(path, &pixels, img.width, img.height)
}

/// Pixel rows without stride padding.
fn packed_rows(img: &ImageU8) -> Vec<u8> {
    if img.stride == img.width {
        return img.buf[..(img.width * img.height) as usize].to_vec();
    }
    let mut pixels = Vec::with_capacity((img.width * img.height) as usize);
    for y in 0..img.height {
        let start = (y * img.stride) as usize;
        pixels.extend_from_slice(&img.buf[start..start + img.width as usize]);
    }
    pixels
}

fn write_grayscale_png(path: &Path, pixels: &[u8], width: u32, height: u32) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let w = std::io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .with_context(|| format!("writing PNG header for {}", path.display()))?;
    writer
        .write_image_data(pixels)
        .with_context(|| format!("writing PNG data for {}", path.display()))?;

    Ok(())
}
