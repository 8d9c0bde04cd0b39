use smallvec::SmallVec;

use crate::codebook::Codebook;
use crate::config::MarkerConfig;
use crate::error::{ConfigError, MarkerError};
use crate::grid::BitGrid;

/// A grid brought to canonical orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub grid: BitGrid,
    /// Clockwise quarter turns applied to the observed grid, in 0..4.
    pub rotations: u32,
}

/// A marker coding strategy.
///
/// Implementations map ids to canonical grids and back, and score how far a
/// grid is from the set of valid grids. Analysis code holds a `Box<dyn Codec>`
/// so the strategy is chosen when the analyzer is built.
pub trait Codec: Send + Sync {
    fn name(&self) -> &str;

    /// Data cells per side of the grids this codec produces.
    fn grid_size(&self) -> usize;

    /// Number of encodable ids; valid ids are `0..id_count`.
    fn id_count(&self) -> u32;

    /// Encode an id into a canonical grid.
    fn encode(&self, id: i32) -> Result<BitGrid, MarkerError>;

    /// Decode a canonically oriented grid.
    fn decode(&self, grid: &BitGrid) -> i32;

    /// Distance of one orientation of `grid` from the valid grids. Zero means valid.
    fn code_distance(&self, grid: &BitGrid) -> u32;

    /// Find the rotation of `grid` that matches the code exactly.
    ///
    /// Orientations are tried in order 0..4 and the first one with the
    /// lowest distance wins. Anything above zero is rejected.
    fn rotate_check(&self, grid: &BitGrid) -> Result<Resolved, MarkerError> {
        let mut current = grid.clone();
        let mut best_distance = self.code_distance(&current);
        let mut best = Resolved {
            grid: current.clone(),
            rotations: 0,
        };

        for i in 1..4 {
            current = current.rotate90();
            let d = self.code_distance(&current);
            if d < best_distance {
                best_distance = d;
                best = Resolved {
                    grid: current.clone(),
                    rotations: i,
                };
            }
        }

        if best_distance == 0 {
            Ok(best)
        } else {
            tracing::trace!(best_distance, "no orientation matches the code");
            Err(MarkerError::NoValidOrientation)
        }
    }
}

/// The row-codeword code used by ArUco markers.
///
/// Each grid row carries `bits_per_row` id bits (most significant row first)
/// by selecting one codeword from the table.
#[derive(Debug, Clone)]
pub struct HammingCodec {
    name: String,
    grid_size: usize,
    codebook: Codebook,
}

impl HammingCodec {
    /// Build a codec from a family description.
    pub fn new(config: &MarkerConfig) -> Result<HammingCodec, ConfigError> {
        if config.grid_size == 0 {
            return Err(ConfigError::GridSize(config.grid_size));
        }
        if config.border_cells == 0 {
            return Err(ConfigError::NoBorder);
        }
        let codebook = Codebook::new(
            &config.codebook.words,
            config.grid_size,
            config.codebook.decode_columns.as_deref(),
        )?;
        let id_bits = codebook.bits_per_row() * config.grid_size;
        if id_bits > 30 {
            return Err(ConfigError::TooManyBits(id_bits));
        }
        Ok(HammingCodec {
            name: config.name.clone(),
            grid_size: config.grid_size,
            codebook,
        })
    }

    /// The ArUco 10-bit codec: ids 0..1024 on a 5x5 grid.
    pub fn aruco() -> HammingCodec {
        HammingCodec {
            name: "aruco".to_string(),
            grid_size: 5,
            codebook: Codebook::aruco(),
        }
    }

    pub fn codebook(&self) -> &Codebook {
        &self.codebook
    }
}

impl Default for HammingCodec {
    fn default() -> Self {
        HammingCodec::aruco()
    }
}

impl Codec for HammingCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn grid_size(&self) -> usize {
        self.grid_size
    }

    fn id_count(&self) -> u32 {
        1u32 << (self.codebook.bits_per_row() * self.grid_size)
    }

    fn encode(&self, id: i32) -> Result<BitGrid, MarkerError> {
        if id < 0 || id as u32 >= self.id_count() {
            return Err(MarkerError::InvalidId(id));
        }
        let bits = self.codebook.bits_per_row();
        let mask = (1u64 << bits) - 1;
        let n = self.grid_size;
        let words: SmallVec<[u64; 8]> = (0..n)
            .map(|y| {
                let field = (id as u64 >> (bits * (n - 1 - y))) & mask;
                self.codebook.word(field as usize)
            })
            .collect();
        Ok(BitGrid::from_words(&words, n))
    }

    fn decode(&self, grid: &BitGrid) -> i32 {
        assert_eq!(grid.size(), self.grid_size);
        let bits = self.codebook.bits_per_row();
        grid.rows()
            .fold(0u64, |acc, row| (acc << bits) | self.codebook.read_row(row)) as i32
    }

    fn code_distance(&self, grid: &BitGrid) -> u32 {
        self.codebook.code_distance(grid)
    }
}
