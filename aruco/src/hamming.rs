/// Compute the Hamming distance between two code words.
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Distance from `word` to the closest entry of `table`.
///
/// Returns `u32::MAX` for an empty table.
pub fn nearest_distance(word: u64, table: &[u64]) -> u32 {
    table
        .iter()
        .map(|&w| hamming_distance(word, w))
        .min()
        .unwrap_or(u32::MAX)
}

/// Smallest pairwise distance between distinct entries of `table`.
pub fn min_pairwise_distance(table: &[u64]) -> Option<u32> {
    let mut best: Option<u32> = None;
    for (i, &a) in table.iter().enumerate() {
        for &b in &table[i + 1..] {
            let d = hamming_distance(a, b);
            best = Some(best.map_or(d, |m| m.min(d)));
        }
    }
    best
}

/// Read the bits of an `nbits`-wide word at the given columns.
///
/// Column 0 is the most significant bit. The selected bits are packed
/// MSB-first in the order the columns are listed.
pub fn project(word: u64, nbits: usize, columns: &[usize]) -> u64 {
    columns.iter().fold(0u64, |acc, &c| {
        (acc << 1) | ((word >> (nbits - 1 - c)) & 1)
    })
}
