//! Printable boards of markers and their corner coordinates.
//!
//! Three arrangements are supported: a plain grid with spacing, a
//! chessboard where markers fill alternating squares, and a frame that
//! places markers only on the outer ring of the grid. Marker ids are drawn
//! at random from the codec's id range using a caller-supplied generator.

use rand::seq::SliceRandom;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use aruco::codec::Codec;
use aruco::error::MarkerError;
use aruco::image::ImageU8;

use crate::render;

/// A marker placed on a board.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MarkerInfo {
    pub id: i32,
    /// Corners in board pixels, clockwise from the top-left, with z = 0.
    pub corners: [[f32; 3]; 4],
}

/// The markers of a board and where they are.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfiguration {
    pub markers: Vec<MarkerInfo>,
}

impl BoardConfiguration {
    pub fn ids(&self) -> Vec<i32> {
        self.markers.iter().map(|m| m.id).collect()
    }

    pub fn marker(&self, id: i32) -> Option<&MarkerInfo> {
        self.markers.iter().find(|m| m.id == id)
    }
}

/// A rendered board with its configuration.
#[derive(Debug, Clone)]
pub struct Board {
    pub image: ImageU8,
    pub config: BoardConfiguration,
}

/// Board dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSpec {
    /// Squares per row.
    pub grid_width: u32,
    /// Squares per column.
    pub grid_height: u32,
    /// Marker side in pixels.
    pub marker_size: u32,
    /// Gap between neighbouring markers in pixels. Unused by chessboards.
    pub marker_distance: u32,
    /// Ids that must not appear on the board.
    pub excluded: Vec<i32>,
}

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("cannot pick {requested} markers with {excluded} excluded out of {available} ids")]
    TooManyMarkers {
        requested: usize,
        excluded: usize,
        available: u32,
    },
    #[error("board grid must be at least 1x1")]
    EmptyGrid,
    #[error("marker size {size}px is smaller than its {cells} cells")]
    MarkerTooSmall { size: u32, cells: usize },
    #[error(transparent)]
    Marker(#[from] MarkerError),
}

/// Pick `n` distinct ids from `0..id_count`, skipping `excluded`, in random order.
pub fn random_marker_ids<R: Rng + ?Sized>(
    n: usize,
    excluded: &[i32],
    id_count: u32,
    rng: &mut R,
) -> Result<Vec<i32>, BoardError> {
    if n + excluded.len() > id_count as usize {
        return Err(BoardError::TooManyMarkers {
            requested: n,
            excluded: excluded.len(),
            available: id_count,
        });
    }

    let mut ids: Vec<i32> = (0..id_count as i32)
        .filter(|id| !excluded.contains(id))
        .collect();
    ids.shuffle(rng);
    ids.truncate(n);
    Ok(ids)
}

/// Lays out boards for one marker family.
pub struct BoardGenerator<'a> {
    codec: &'a dyn Codec,
    border_cells: usize,
}

impl<'a> BoardGenerator<'a> {
    pub fn new(codec: &'a dyn Codec, border_cells: usize) -> Self {
        Self {
            codec,
            border_cells,
        }
    }

    /// All squares hold a marker; markers are `marker_distance` apart.
    ///
    /// Corners are relative to the board center.
    pub fn grid<R: Rng + ?Sized>(&self, spec: &BoardSpec, rng: &mut R) -> Result<Board, BoardError> {
        let step = spec.marker_size + spec.marker_distance;
        let cells: Vec<(u32, u32)> = (0..spec.grid_height)
            .flat_map(|y| (0..spec.grid_width).map(move |x| (x * step, y * step)))
            .collect();
        let (w, h) = spaced_extent(spec);
        self.compose(spec, &cells, w, h, true, rng)
    }

    /// Squares of marker size, markers on the squares where `x + y` is even.
    pub fn chessboard<R: Rng + ?Sized>(
        &self,
        spec: &BoardSpec,
        centered: bool,
        rng: &mut R,
    ) -> Result<Board, BoardError> {
        let ms = spec.marker_size;
        let cells: Vec<(u32, u32)> = (0..spec.grid_height)
            .flat_map(|y| {
                (0..spec.grid_width)
                    .filter(move |x| (x + y) % 2 == 0)
                    .map(move |x| (x * ms, y * ms))
            })
            .collect();
        let (w, h) = (spec.grid_width * ms, spec.grid_height * ms);
        self.compose(spec, &cells, w, h, centered, rng)
    }

    /// Markers on the outer ring of the grid only.
    pub fn frame<R: Rng + ?Sized>(
        &self,
        spec: &BoardSpec,
        centered: bool,
        rng: &mut R,
    ) -> Result<Board, BoardError> {
        let step = spec.marker_size + spec.marker_distance;
        let (gw, gh) = (spec.grid_width, spec.grid_height);
        let cells: Vec<(u32, u32)> = (0..gh)
            .flat_map(|y| {
                (0..gw)
                    .filter(move |&x| y == 0 || y + 1 == gh || x == 0 || x + 1 == gw)
                    .map(move |x| (x * step, y * step))
            })
            .collect();
        let (w, h) = spaced_extent(spec);
        self.compose(spec, &cells, w, h, centered, rng)
    }

    /// Draw one random marker at each top-left offset of `cells`.
    fn compose<R: Rng + ?Sized>(
        &self,
        spec: &BoardSpec,
        cells: &[(u32, u32)],
        width: u32,
        height: u32,
        centered: bool,
        rng: &mut R,
    ) -> Result<Board, BoardError> {
        if spec.grid_width == 0 || spec.grid_height == 0 {
            return Err(BoardError::EmptyGrid);
        }
        let marker_cells = self.codec.grid_size() + 2 * self.border_cells;
        if (spec.marker_size as usize) < marker_cells {
            return Err(BoardError::MarkerTooSmall {
                size: spec.marker_size,
                cells: marker_cells,
            });
        }

        let ids = random_marker_ids(cells.len(), &spec.excluded, self.codec.id_count(), rng)?;

        let (cx, cy) = if centered {
            ((width / 2) as f32, (height / 2) as f32)
        } else {
            (0.0, 0.0)
        };
        let ms = spec.marker_size;

        let mut image = ImageU8::filled(width, height, 255);
        let mut markers = Vec::with_capacity(cells.len());
        for (&(x, y), &id) in cells.iter().zip(&ids) {
            let marker = render::render(self.codec, id, self.border_cells)?;
            image.blit(&marker.to_image(ms), x, y);

            let corner = |px: u32, py: u32| [px as f32 - cx, py as f32 - cy, 0.0];
            markers.push(MarkerInfo {
                id,
                corners: [
                    corner(x, y),
                    corner(x + ms, y),
                    corner(x + ms, y + ms),
                    corner(x, y + ms),
                ],
            });
        }

        tracing::debug!(
            markers = markers.len(),
            width,
            height,
            "board composed"
        );

        Ok(Board {
            image,
            config: BoardConfiguration { markers },
        })
    }
}

/// Pixel extent of `g` markers with `g - 1` gaps in each direction.
fn spaced_extent(spec: &BoardSpec) -> (u32, u32) {
    let extent = |g: u32| g * spec.marker_size + g.saturating_sub(1) * spec.marker_distance;
    (extent(spec.grid_width), extent(spec.grid_height))
}
