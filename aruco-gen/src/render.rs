use aruco::codec::Codec;
use aruco::error::MarkerError;
use aruco::grid::BitGrid;
use aruco::image::ImageU8;

use crate::types::Pixel;

/// A rendered marker as a grid of cells, border included.
#[derive(Debug, Clone)]
pub struct RenderedMarker {
    pub id: i32,
    /// Cells per side (data grid plus border on both sides).
    pub grid_size: usize,
    pub border_cells: usize,
    /// Cell colors in row-major order.
    pub pixels: Vec<Pixel>,
}

impl RenderedMarker {
    /// Get the cell at position (x, y).
    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        self.pixels[y * self.grid_size + x]
    }

    /// The data cells as a bit grid (1 = white).
    pub fn marker_mat(&self) -> BitGrid {
        let n = self.grid_size - 2 * self.border_cells;
        let mut grid = BitGrid::new(n);
        for y in 0..n {
            for x in 0..n {
                let p = self.pixel(x + self.border_cells, y + self.border_cells);
                grid.set(x, y, p == Pixel::White);
            }
        }
        grid
    }

    /// Render into a `size_px` square image.
    ///
    /// Cells are `size_px / grid_size` pixels wide; when the size is not a
    /// multiple of the cell count the leftover right and bottom strip stays
    /// black.
    pub fn to_image(&self, size_px: u32) -> ImageU8 {
        let cell = size_px / self.grid_size as u32;
        let mut img = ImageU8::new(size_px, size_px);
        self.paint(&mut img, 0, cell);
        img
    }

    /// Render at `scale` pixels per cell inside a white quiet zone of `quiet` cells.
    pub fn to_scaled_image(&self, scale: u32, quiet: u32) -> ImageU8 {
        let side = (self.grid_size as u32 + 2 * quiet) * scale;
        let mut img = ImageU8::filled(side, side, 255);
        let offset = quiet * scale;
        img.fill_rect(
            offset,
            offset,
            self.grid_size as u32 * scale,
            self.grid_size as u32 * scale,
            0,
        );
        self.paint(&mut img, offset, scale);
        img
    }

    fn paint(&self, img: &mut ImageU8, offset: u32, cell: u32) {
        for y in 0..self.grid_size {
            for x in 0..self.grid_size {
                if self.pixel(x, y) == Pixel::White {
                    img.fill_rect(
                        offset + x as u32 * cell,
                        offset + y as u32 * cell,
                        cell,
                        cell,
                        Pixel::White.gray(),
                    );
                }
            }
        }
    }
}

/// Render marker `id` with a background border of `border_cells`.
pub fn render(
    codec: &dyn Codec,
    id: i32,
    border_cells: usize,
) -> Result<RenderedMarker, MarkerError> {
    let grid = codec.encode(id)?;
    let n = grid.size();
    let size = n + 2 * border_cells;
    let mut pixels = vec![Pixel::Black; size * size];
    for y in 0..n {
        for x in 0..n {
            if grid.get(x, y) == 1 {
                pixels[(y + border_cells) * size + x + border_cells] = Pixel::White;
            }
        }
    }
    Ok(RenderedMarker {
        id,
        grid_size: size,
        border_cells,
        pixels,
    })
}
