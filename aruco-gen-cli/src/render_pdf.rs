//! PDF output for individual markers.

use anyhow::{Context, Result};
use aruco_gen::render::RenderedMarker;
use aruco_gen::types::Pixel;
use printpdf::*;
use std::path::Path;

/// Marker cell size in mm
const CELL_SIZE_MM: f32 = 5.0;

/// Id label font size in points
const LABEL_PT: f32 = 10.0;

/// Visible id label, as printed under the marker.
pub fn label_text(id: i32) -> String {
    format!("#{id}")
}

/// Write a single marker as a PDF page with a white quiet zone of `quiet` cells.
///
/// With `label`, the marker id is printed in the bottom-left page margin.
pub fn write_marker_pdf(
    marker: &RenderedMarker,
    quiet: usize,
    label: bool,
    path: &Path,
) -> Result<()> {
    let total_cells = marker.grid_size + 2 * quiet;
    let page_size_mm = total_cells as f32 * CELL_SIZE_MM + 20.0; // 10mm margin each side

    let (doc, page1, layer1) =
        PdfDocument::new("ArUco marker", Mm(page_size_mm), Mm(page_size_mm), "Marker");
    let layer = doc.get_page(page1).get_layer(layer1);

    let margin_mm = (page_size_mm - total_cells as f32 * CELL_SIZE_MM) / 2.0;
    draw_marker(&layer, marker, quiet, margin_mm, margin_mm, CELL_SIZE_MM);

    if label {
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .context("loading built-in Helvetica")?;
        layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        layer.use_text(
            label_text(marker.id),
            LABEL_PT,
            Mm(margin_mm),
            Mm(margin_mm / 2.0),
            &font,
        );
    }

    doc.save(&mut std::io::BufWriter::new(
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
    ))
    .with_context(|| format!("writing PDF to {}", path.display()))?;

    Ok(())
}

/// Draw a marker on a PDF layer with its lower-left corner at (x_mm, y_mm).
fn draw_marker(
    layer: &PdfLayerReference,
    marker: &RenderedMarker,
    quiet: usize,
    x_mm: f32,
    y_mm: f32,
    cell_mm: f32,
) {
    let size = marker.grid_size;
    let white = Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None));
    let black = Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None));

    let total = size + 2 * quiet;
    layer.set_fill_color(white.clone());
    layer.set_outline_color(white);
    layer.add_rect(Rect::new(
        Mm(x_mm),
        Mm(y_mm),
        Mm(x_mm + total as f32 * cell_mm),
        Mm(y_mm + total as f32 * cell_mm),
    ));

    // white cells are left as quiet-zone paper
    layer.set_fill_color(black.clone());
    layer.set_outline_color(black);
    for cy in 0..size {
        for cx in 0..size {
            if marker.pixel(cx, cy) == Pixel::White {
                continue;
            }
            // PDF y is bottom-up: row 0 is at the top
            let px = x_mm + (cx + quiet) as f32 * cell_mm;
            let py = y_mm + (size - 1 - cy + quiet) as f32 * cell_mm;
            layer.add_rect(Rect::new(Mm(px), Mm(py), Mm(px + cell_mm), Mm(py + cell_mm)));
        }
    }
}
