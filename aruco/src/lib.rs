pub mod error;
pub mod hamming;
pub mod grid;
pub mod codebook;
pub mod config;
pub mod codec;
pub mod image;
pub mod threshold;
pub mod analyzer;
