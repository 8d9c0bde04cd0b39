#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::codec::{Codec, HammingCodec};
use crate::config::MarkerConfig;
use crate::error::{ConfigError, MarkerError};
use crate::grid::BitGrid;
use crate::image::ImageU8;
use crate::threshold;

/// A marker identified in a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub id: i32,
    /// Clockwise quarter turns that bring the patch to canonical orientation.
    pub rotations: u32,
}

/// Reads marker ids from square binary patches.
///
/// The patch is split into `grid_size + 2 * border_cells` cells per side.
/// Every border cell must be mostly background, and each inner cell gives one
/// bit by majority vote.
pub struct PatchAnalyzer {
    codec: Box<dyn Codec>,
    border_cells: usize,
}

impl PatchAnalyzer {
    /// Analyzer for `codec` grids inside `border_cells` of background.
    pub fn new(codec: Box<dyn Codec>, border_cells: usize) -> Result<Self, ConfigError> {
        if border_cells == 0 {
            return Err(ConfigError::NoBorder);
        }
        Ok(Self {
            codec,
            border_cells,
        })
    }

    /// Build a `HammingCodec` analyzer from a family description.
    pub fn from_config(config: &MarkerConfig) -> Result<Self, ConfigError> {
        let codec = HammingCodec::new(config)?;
        Self::new(Box::new(codec), config.border_cells)
    }

    /// Analyzer for ArUco 10-bit markers (7x7 cells).
    pub fn aruco() -> Self {
        Self {
            codec: Box::new(HammingCodec::aruco()),
            border_cells: 1,
        }
    }

    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    pub fn border_cells(&self) -> usize {
        self.border_cells
    }

    /// Cells per side of a patch.
    pub fn cells(&self) -> usize {
        self.codec.grid_size() + 2 * self.border_cells
    }

    /// Check the border and sample the data cells of a binary patch.
    ///
    /// A patch with fewer pixels per side than cells is not a marker.
    /// Panics if the patch is not square.
    pub fn sample(&self, patch: &ImageU8) -> Result<BitGrid, MarkerError> {
        assert!(patch.is_square(), "patch must be square");
        let cells = self.cells();
        let b = self.border_cells;
        let cell_px = patch.width / cells as u32;
        if cell_px == 0 {
            tracing::trace!(width = patch.width, cells, "patch smaller than its cell grid");
            return Err(MarkerError::NotAMarker);
        }
        let is_set = |cx: usize, cy: usize| {
            let n = patch.count_nonzero(
                cx as u32 * cell_px,
                cy as u32 * cell_px,
                cell_px,
                cell_px,
            );
            2 * n > cell_px * cell_px
        };

        for cy in 0..cells {
            let on_ring = cy < b || cy >= cells - b;
            for cx in 0..cells {
                let border = on_ring || cx < b || cx >= cells - b;
                if border && is_set(cx, cy) {
                    tracing::trace!(cx, cy, "border cell is foreground");
                    return Err(MarkerError::NotAMarker);
                }
            }
        }

        let n = self.codec.grid_size();
        let mut grid = BitGrid::new(n);
        for y in 0..n {
            for x in 0..n {
                grid.set(x, y, is_set(x + b, y + b));
            }
        }
        Ok(grid)
    }

    /// Identify the marker in a binary patch.
    pub fn analyze(&self, patch: &ImageU8) -> Result<Detection, MarkerError> {
        let grid = self.sample(patch)?;
        let resolved = self.codec.rotate_check(&grid)?;
        let id = self.codec.decode(&resolved.grid);
        tracing::debug!(id, rotations = resolved.rotations, "marker decoded");
        Ok(Detection {
            id,
            rotations: resolved.rotations,
        })
    }

    /// Otsu-binarize a grayscale patch, then analyze it.
    pub fn detect(&self, gray: &ImageU8) -> Result<Detection, MarkerError> {
        self.analyze(&threshold::binarize_otsu(gray))
    }

    /// Analyze independent patches, preserving their order.
    pub fn analyze_all(&self, patches: &[ImageU8]) -> Vec<Result<Detection, MarkerError>> {
        #[cfg(feature = "parallel")]
        let results: Vec<_> = patches.par_iter().map(|p| self.analyze(p)).collect();

        #[cfg(not(feature = "parallel"))]
        let results: Vec<_> = patches.iter().map(|p| self.analyze(p)).collect();

        results
    }
}

impl Default for PatchAnalyzer {
    fn default() -> Self {
        PatchAnalyzer::aruco()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Paint a grid into a patch with a one-cell border, `cell_px` pixels per cell.
    fn patch_from_grid(grid: &BitGrid, cell_px: u32) -> ImageU8 {
        let cells = grid.size() as u32 + 2;
        let mut img = ImageU8::new(cells * cell_px, cells * cell_px);
        for y in 0..grid.size() {
            for x in 0..grid.size() {
                if grid.get(x, y) == 1 {
                    img.fill_rect(
                        (x as u32 + 1) * cell_px,
                        (y as u32 + 1) * cell_px,
                        cell_px,
                        cell_px,
                        255,
                    );
                }
            }
        }
        img
    }

    fn id110_patch() -> ImageU8 {
        let grid = HammingCodec::aruco().encode(110).unwrap();
        patch_from_grid(&grid, 10)
    }

    #[test]
    fn analyze_canonical_patch() {
        let analyzer = PatchAnalyzer::aruco();
        assert_eq!(analyzer.cells(), 7);
        let det = analyzer.analyze(&id110_patch()).unwrap();
        assert_eq!(det, Detection { id: 110, rotations: 0 });
    }

    #[test]
    fn analyze_rotated_patches() {
        let analyzer = PatchAnalyzer::aruco();
        let mut patch = id110_patch();
        for turns in 0..4u32 {
            let det = analyzer.analyze(&patch).unwrap();
            assert_eq!(det.id, 110);
            assert_eq!(det.rotations, (4 - turns) % 4);
            patch = patch.rotate90();
        }
    }

    #[test]
    fn sample_reads_inner_cells() {
        let analyzer = PatchAnalyzer::aruco();
        let grid = analyzer.sample(&id110_patch()).unwrap();
        assert_eq!(grid, HammingCodec::aruco().encode(110).unwrap());
    }

    #[test]
    fn foreground_border_is_not_a_marker() {
        let analyzer = PatchAnalyzer::aruco();
        let mut patch = ImageU8::filled(70, 70, 255);
        // valid marker content inside a white ring
        patch.blit(&id110_patch().crop(10, 10, 50, 50), 10, 10);
        assert_eq!(analyzer.analyze(&patch), Err(MarkerError::NotAMarker));
    }

    #[test]
    fn single_border_cell_rejects_patch() {
        let analyzer = PatchAnalyzer::aruco();
        for (cx, cy) in [(0, 0), (6, 3), (3, 6), (0, 5), (6, 6)] {
            let mut patch = id110_patch();
            patch.fill_rect(cx * 10, cy * 10, 10, 10, 255);
            assert_eq!(
                analyzer.analyze(&patch),
                Err(MarkerError::NotAMarker),
                "cell ({cx}, {cy})"
            );
        }
    }

    #[test]
    fn border_cell_at_half_is_background() {
        // exactly half the pixels set is not a majority
        let analyzer = PatchAnalyzer::aruco();
        let mut patch = id110_patch();
        patch.fill_rect(0, 0, 10, 5, 255);
        assert_eq!(analyzer.analyze(&patch).unwrap().id, 110);
    }

    #[test]
    fn inner_cells_use_majority_vote() {
        let analyzer = PatchAnalyzer::aruco();
        let mut patch = id110_patch();
        // cell (1, 1) is a 1 bit; clear 40 of its 100 pixels
        patch.fill_rect(10, 10, 10, 4, 0);
        assert_eq!(analyzer.analyze(&patch).unwrap().id, 110);
        // cell (2, 1) is a 0 bit; set 40 of its pixels
        let mut patch = id110_patch();
        patch.fill_rect(20, 10, 10, 4, 255);
        assert_eq!(analyzer.analyze(&patch).unwrap().id, 110);
    }

    #[test]
    fn blank_patch_has_no_orientation() {
        let analyzer = PatchAnalyzer::aruco();
        let patch = ImageU8::new(35, 35);
        assert_eq!(
            analyzer.analyze(&patch),
            Err(MarkerError::NoValidOrientation)
        );
    }

    #[test]
    fn corrupted_bit_has_no_orientation() {
        let analyzer = PatchAnalyzer::aruco();
        let mut patch = id110_patch();
        // data cell (2, 2) is 0 in id 110
        patch.fill_rect(30, 30, 10, 10, 255);
        assert_eq!(
            analyzer.analyze(&patch),
            Err(MarkerError::NoValidOrientation)
        );
    }

    #[test]
    fn patch_size_not_multiple_of_cells() {
        // 73 px: cells are 10 px, the 3 px remainder is ignored
        let analyzer = PatchAnalyzer::aruco();
        let mut patch = ImageU8::new(73, 73);
        patch.blit(&id110_patch(), 0, 0);
        patch.fill_rect(70, 0, 3, 73, 255);
        assert_eq!(analyzer.analyze(&patch).unwrap().id, 110);
    }

    #[test]
    fn patch_smaller_than_cell_grid_is_not_a_marker() {
        let analyzer = PatchAnalyzer::aruco();
        for side in 0..7 {
            for fill in [0, 255] {
                assert_eq!(
                    analyzer.analyze(&ImageU8::filled(side, side, fill)),
                    Err(MarkerError::NotAMarker),
                    "{side}x{side} filled with {fill}"
                );
            }
        }
        // one pixel per cell is enough to read a marker
        let grid = HammingCodec::aruco().encode(9).unwrap();
        assert_eq!(analyzer.analyze(&patch_from_grid(&grid, 1)).unwrap().id, 9);
    }

    #[test]
    fn zero_border_is_rejected() {
        let err = PatchAnalyzer::new(Box::new(HammingCodec::aruco()), 0).err();
        assert_eq!(err, Some(ConfigError::NoBorder));
        let analyzer = PatchAnalyzer::new(Box::new(HammingCodec::aruco()), 1).unwrap();
        assert_eq!(analyzer.cells(), 7);

        let mut config = MarkerConfig::default();
        config.border_cells = 0;
        assert_eq!(
            PatchAnalyzer::from_config(&config).err(),
            Some(ConfigError::NoBorder)
        );
    }

    #[test]
    #[should_panic]
    fn non_square_patch_panics() {
        let analyzer = PatchAnalyzer::aruco();
        let _ = analyzer.analyze(&ImageU8::new(70, 60));
    }

    #[test]
    fn detect_grayscale_patch() {
        let analyzer = PatchAnalyzer::aruco();
        let bin = id110_patch();
        let mut gray = ImageU8::new(bin.width, bin.height);
        for y in 0..bin.height {
            for x in 0..bin.width {
                let v = if bin.get(x, y) != 0 { 190 } else { 35 };
                gray.set(x, y, v + ((x + y) % 5) as u8);
            }
        }
        let det = analyzer.detect(&gray.rotate90()).unwrap();
        assert_eq!(det, Detection { id: 110, rotations: 3 });
    }

    #[test]
    fn analyze_all_preserves_order() {
        let analyzer = PatchAnalyzer::aruco();
        let codec = HammingCodec::aruco();
        let mut patches: Vec<ImageU8> = [3, 500, 1000]
            .iter()
            .map(|&id| patch_from_grid(&codec.encode(id).unwrap(), 6))
            .collect();
        patches.push(ImageU8::filled(42, 42, 255));
        let results = analyzer.analyze_all(&patches);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].unwrap().id, 3);
        assert_eq!(results[1].unwrap().id, 500);
        assert_eq!(results[2].unwrap().id, 1000);
        assert_eq!(results[3], Err(MarkerError::NotAMarker));
    }

    #[test]
    fn wider_border_family() {
        let mut config = MarkerConfig::default();
        config.border_cells = 2;
        let analyzer = PatchAnalyzer::from_config(&config).unwrap();
        assert_eq!(analyzer.cells(), 9);

        let grid = analyzer.codec().encode(77).unwrap();
        let mut patch = ImageU8::new(90, 90);
        patch.blit(&patch_from_grid(&grid, 10), 10, 10);
        assert_eq!(analyzer.analyze(&patch).unwrap().id, 77);

        // the inner border ring must be background as well
        patch.fill_rect(10, 40, 10, 10, 255);
        assert_eq!(analyzer.analyze(&patch), Err(MarkerError::NotAMarker));
    }
}
