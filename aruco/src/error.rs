use thiserror::Error;

/// Failures reported by the marker codec and the patch analyzer.
///
/// All three are terminal: a caller running a detection loop should treat
/// any of them as "no marker here" rather than retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MarkerError {
    #[error("marker id {0} is outside the encodable range")]
    InvalidId(i32),

    #[error("patch border is not background")]
    NotAMarker,

    #[error("no rotation of the sampled grid matches the codeword table")]
    NoValidOrientation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("codebook needs a power-of-two number of words (at least 2), got {0}")]
    WordCount(usize),

    #[error("codeword {word:#x} does not fit in {bits} bits")]
    WordTooWide { word: u64, bits: usize },

    #[error("codeword {0:#x} appears more than once")]
    DuplicateWord(u64),

    #[error("the all-zero word cannot be a codeword")]
    ZeroWord,

    #[error("unsupported grid size {0}")]
    GridSize(usize),

    #[error("{0} id bits do not fit in an i32")]
    TooManyBits(usize),

    #[error("border must be at least one cell wide")]
    NoBorder,

    #[error("decode columns {0:?} do not identify the codewords")]
    AmbiguousColumns(Vec<usize>),

    #[error("config error: {0}")]
    Parse(String),
}
