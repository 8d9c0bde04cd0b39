use smallvec::SmallVec;

use crate::error::ConfigError;
use crate::grid::BitGrid;
use crate::hamming;

/// The row codewords of the ArUco 10-bit family, column 0 in the MSB.
///
/// Bit 0 of each word is the inverted parity bit, so an all-background row
/// (`00000`) is never a codeword.
pub const ARUCO_WORDS: [u64; 4] = [0x10, 0x17, 0x09, 0x0e];

/// Columns that distinguish the ArUco codewords.
pub const ARUCO_DECODE_COLUMNS: [usize; 2] = [1, 3];

/// A validated table of row codewords.
///
/// Each grid row must equal one of the words. Encoding picks a word per row
/// by index; decoding reads `decode_columns` of each row, which yields the
/// index of the word directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebook {
    words: SmallVec<[u64; 4]>,
    word_bits: usize,
    bits_per_row: usize,
    decode_columns: SmallVec<[usize; 4]>,
}

impl Codebook {
    /// Validate a word table of `word_bits`-wide words.
    ///
    /// When `decode_columns` is `None` the columns are derived from the table.
    pub fn new(
        words: &[u64],
        word_bits: usize,
        decode_columns: Option<&[usize]>,
    ) -> Result<Codebook, ConfigError> {
        if words.len() < 2 || !words.len().is_power_of_two() {
            return Err(ConfigError::WordCount(words.len()));
        }
        if word_bits == 0 || word_bits > 63 {
            return Err(ConfigError::GridSize(word_bits));
        }
        for (i, &w) in words.iter().enumerate() {
            if w >> word_bits != 0 {
                return Err(ConfigError::WordTooWide {
                    word: w,
                    bits: word_bits,
                });
            }
            if w == 0 {
                return Err(ConfigError::ZeroWord);
            }
            if words[..i].contains(&w) {
                return Err(ConfigError::DuplicateWord(w));
            }
        }

        let bits_per_row = words.len().trailing_zeros() as usize;
        let decode_columns = match decode_columns {
            Some(cols) => {
                let valid = cols.len() == bits_per_row
                    && cols.iter().all(|&c| c < word_bits)
                    && identifies(words, word_bits, cols);
                if !valid {
                    return Err(ConfigError::AmbiguousColumns(cols.to_vec()));
                }
                SmallVec::from_slice(cols)
            }
            None => derive_columns(words, word_bits, bits_per_row)
                .ok_or_else(|| ConfigError::AmbiguousColumns(Vec::new()))?,
        };

        Ok(Codebook {
            words: SmallVec::from_slice(words),
            word_bits,
            bits_per_row,
            decode_columns,
        })
    }

    /// The ArUco 10-bit table: 4 words of 5 bits read at columns 1 and 3.
    pub fn aruco() -> Codebook {
        Codebook::new(&ARUCO_WORDS, 5, Some(&ARUCO_DECODE_COLUMNS))
            .expect("built-in ArUco codebook should be valid")
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    pub fn word(&self, index: usize) -> u64 {
        self.words[index]
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word_bits(&self) -> usize {
        self.word_bits
    }

    /// Number of id bits carried by each grid row.
    pub fn bits_per_row(&self) -> usize {
        self.bits_per_row
    }

    pub fn decode_columns(&self) -> &[usize] {
        &self.decode_columns
    }

    /// Smallest distance between two codewords.
    pub fn min_distance(&self) -> u32 {
        hamming::min_pairwise_distance(&self.words).unwrap_or(0)
    }

    /// Distance from a packed row to its nearest codeword.
    pub fn row_distance(&self, row_word: u64) -> u32 {
        hamming::nearest_distance(row_word, &self.words)
    }

    /// Sum over rows of the distance to the nearest codeword.
    ///
    /// Zero means every row is exactly some codeword. This scores one
    /// orientation only.
    pub fn code_distance(&self, grid: &BitGrid) -> u32 {
        assert_eq!(grid.size(), self.word_bits);
        (0..grid.size())
            .map(|y| self.row_distance(grid.row_word(y)))
            .sum()
    }

    /// The word index carried by a row, read from the decode columns.
    pub fn read_row(&self, row: &[u8]) -> u64 {
        self.decode_columns
            .iter()
            .fold(0u64, |acc, &c| (acc << 1) | row[c] as u64)
    }
}

impl Default for Codebook {
    fn default() -> Self {
        Codebook::aruco()
    }
}

/// Whether reading `columns` of word `k` yields `k` for every word.
fn identifies(words: &[u64], word_bits: usize, columns: &[usize]) -> bool {
    words
        .iter()
        .enumerate()
        .all(|(k, &w)| hamming::project(w, word_bits, columns) == k as u64)
}

/// First strictly increasing column tuple (lexicographic order) that identifies the table.
fn derive_columns(words: &[u64], word_bits: usize, k: usize) -> Option<SmallVec<[usize; 4]>> {
    if k == 0 || k > word_bits {
        return None;
    }
    let mut cols: SmallVec<[usize; 4]> = (0..k).collect();
    loop {
        if identifies(words, word_bits, &cols) {
            return Some(cols);
        }
        // Advance to the next combination
        let mut i = k;
        while i > 0 && cols[i - 1] == word_bits - k + i - 1 {
            i -= 1;
        }
        if i == 0 {
            return None;
        }
        cols[i - 1] += 1;
        for j in i..k {
            cols[j] = cols[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aruco_table() {
        let cb = Codebook::aruco();
        assert_eq!(cb.len(), 4);
        assert_eq!(cb.word_bits(), 5);
        assert_eq!(cb.bits_per_row(), 2);
        assert_eq!(cb.decode_columns(), &[1, 3]);
        assert_eq!(cb.words(), &[0x10, 0x17, 0x09, 0x0e]);
        assert_eq!(cb.min_distance(), 3);
    }

    #[test]
    fn read_row_returns_word_index() {
        let cb = Codebook::aruco();
        for (k, &w) in ARUCO_WORDS.iter().enumerate() {
            let g = BitGrid::from_words(&[w; 5], 5);
            assert_eq!(cb.read_row(g.row(0)), k as u64);
        }
    }

    #[test]
    fn code_distance_zero_for_codeword_rows() {
        let cb = Codebook::aruco();
        let g = BitGrid::from_words(&[0x10, 0x17, 0x09, 0x0e, 0x09], 5);
        assert_eq!(cb.code_distance(&g), 0);
    }

    #[test]
    fn code_distance_sums_row_minima() {
        let cb = Codebook::aruco();
        // 00000 is 1 from 10000, 11111 is 1 from 10111
        let g = BitGrid::from_words(&[0x00, 0x1f, 0x10, 0x10, 0x10], 5);
        assert_eq!(cb.code_distance(&g), 2);
    }

    #[test]
    fn code_distance_all_zero_grid() {
        let cb = Codebook::aruco();
        assert_eq!(cb.code_distance(&BitGrid::new(5)), 5);
    }

    #[test]
    fn derived_columns_for_aruco_table() {
        // Columns (1, 2) also identify the table and come first lexicographically.
        let cb = Codebook::new(&ARUCO_WORDS, 5, None).unwrap();
        assert_eq!(cb.decode_columns(), &[1, 2]);
    }

    #[test]
    fn explicit_columns_are_checked() {
        let err = Codebook::new(&ARUCO_WORDS, 5, Some(&[0, 1])).unwrap_err();
        assert_eq!(err, ConfigError::AmbiguousColumns(vec![0, 1]));
        let err = Codebook::new(&ARUCO_WORDS, 5, Some(&[1])).unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousColumns(_)));
        let err = Codebook::new(&ARUCO_WORDS, 5, Some(&[1, 7])).unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousColumns(_)));
    }

    #[test]
    fn no_identifying_columns() {
        // index 0 must read as 00 but 0b11 has no zero bits
        let err = Codebook::new(&[0b11, 0b10], 2, None).unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousColumns(_)));
    }

    #[test]
    fn two_word_table() {
        let cb = Codebook::new(&[0b100, 0b011], 3, None).unwrap();
        assert_eq!(cb.bits_per_row(), 1);
        assert_eq!(cb.decode_columns(), &[1]);
    }

    #[test]
    fn rejects_bad_tables() {
        assert_eq!(
            Codebook::new(&[0x10, 0x17, 0x09], 5, None).unwrap_err(),
            ConfigError::WordCount(3)
        );
        assert_eq!(
            Codebook::new(&[0x10], 5, None).unwrap_err(),
            ConfigError::WordCount(1)
        );
        assert_eq!(
            Codebook::new(&[0x10, 0x17, 0x09, 0x20], 5, None).unwrap_err(),
            ConfigError::WordTooWide { word: 0x20, bits: 5 }
        );
        assert_eq!(
            Codebook::new(&[0x10, 0x17, 0x09, 0x00], 5, None).unwrap_err(),
            ConfigError::ZeroWord
        );
        assert_eq!(
            Codebook::new(&[0x10, 0x17, 0x09, 0x10], 5, None).unwrap_err(),
            ConfigError::DuplicateWord(0x10)
        );
    }
}
