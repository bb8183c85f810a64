use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a set needs at least one line (got E = {0})")]
    NoLines(usize),
    #[error(
        "{set_bits} set bits + {block_bits} block bits do not fit into a 64-bit address"
    )]
    AddressBits { set_bits: u32, block_bits: u32 },
    #[error("2^{0} sets cannot be allocated on this platform")]
    TooManySets(u32),
    #[error("2^{set_bits} sets x {lines_per_set} lines do not fit into memory")]
    TooManyLines { set_bits: u32, lines_per_set: usize },
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace file `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
