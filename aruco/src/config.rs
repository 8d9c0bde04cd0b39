#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::codebook::{ARUCO_DECODE_COLUMNS, ARUCO_WORDS};
#[cfg(feature = "serde")]
use crate::error::ConfigError;

/// Description of a marker family: grid dimensions and row codewords.
///
/// The defaults describe the ArUco 10-bit family: a 5x5 data grid inside a
/// one-cell background border, 7x7 cells overall.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MarkerConfig {
    pub name: String,
    /// Data cells per side; also the width of each codeword.
    pub grid_size: usize,
    /// Width of the background ring around the data grid, in cells.
    pub border_cells: usize,
    pub codebook: CodebookConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CodebookConfig {
    pub words: Vec<u64>,
    /// Columns read by the decoder. Derived from `words` when omitted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub decode_columns: Option<Vec<usize>>,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            name: "aruco".to_string(),
            grid_size: 5,
            border_cells: 1,
            codebook: CodebookConfig {
                words: ARUCO_WORDS.to_vec(),
                decode_columns: Some(ARUCO_DECODE_COLUMNS.to_vec()),
            },
        }
    }
}

impl MarkerConfig {
    /// Cells per side of a rendered marker, border included.
    pub fn total_cells(&self) -> usize {
        self.grid_size + 2 * self.border_cells
    }

    /// Parse a TOML family description.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(toml_str: &str) -> Result<MarkerConfig, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize to TOML.
    #[cfg(feature = "serde")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
