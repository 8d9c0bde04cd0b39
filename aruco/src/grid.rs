use std::fmt;

/// A square matrix of binary cells in row-major order.
///
/// Cells hold 0 or 1. `x` indexes columns and `y` indexes rows, with
/// (0, 0) at the top-left.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitGrid {
    size: usize,
    cells: Vec<u8>,
}

impl BitGrid {
    /// Create an all-zero grid.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0u8; size * size],
        }
    }

    /// Build a grid from rows of 0/1 values.
    ///
    /// Panics if the rows do not form a square or contain values other than 0 and 1.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for row in rows {
            let row = row.as_ref();
            assert_eq!(row.len(), size, "grid rows must be {size} cells wide");
            assert!(row.iter().all(|&b| b <= 1), "grid cells must be 0 or 1");
            cells.extend_from_slice(row);
        }
        Self { size, cells }
    }

    /// Build a grid from one `size`-bit word per row, column 0 in the MSB.
    pub fn from_words(words: &[u64], size: usize) -> Self {
        assert_eq!(words.len(), size);
        let mut grid = Self::new(size);
        for (y, &w) in words.iter().enumerate() {
            for x in 0..size {
                grid.set(x, y, (w >> (size - 1 - x)) & 1 == 1);
            }
        }
        grid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the cell at column `x`, row `y`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[y * self.size + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, bit: bool) {
        self.cells[y * self.size + x] = bit as u8;
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.cells[y * self.size..(y + 1) * self.size]
    }

    /// Iterate over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks_exact(self.size.max(1))
    }

    /// Row `y` packed into a word, column 0 in the MSB.
    pub fn row_word(&self, y: usize) -> u64 {
        self.row(y)
            .iter()
            .fold(0u64, |acc, &b| (acc << 1) | b as u64)
    }

    pub fn count_ones(&self) -> usize {
        self.cells.iter().filter(|&&b| b == 1).count()
    }

    /// Rotate 90 degrees clockwise: `out[i][j] = in[n-1-j][i]`.
    pub fn rotate90(&self) -> BitGrid {
        let n = self.size;
        let mut cells = vec![0u8; n * n];
        for i in 0..n {
            for j in 0..n {
                cells[i * n + j] = self.cells[(n - 1 - j) * n + i];
            }
        }
        BitGrid { size: n, cells }
    }

    /// Apply `quarter_turns` clockwise rotations.
    pub fn rotated(&self, quarter_turns: u32) -> BitGrid {
        let mut out = self.clone();
        for _ in 0..quarter_turns % 4 {
            out = out.rotate90();
        }
        out
    }
}

impl fmt::Display for BitGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for &b in row {
                write!(f, "{b}")?;
            }
        }
        Ok(())
    }
}
