use thiserror::Error;

/// Errors produced while building a Program Stream.
#[derive(Debug, Error)]
pub enum MuxError {
    #[error("I/O error writing program stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("stream index {0} is out of range")]
    InvalidStreamIndex(usize),

    #[error("ticker sample rate must be non-zero")]
    InvalidTickerRate,

    #[error("flush_packet called for stream {0} before its start PTS was stamped")]
    UnstampedPts(usize),
}

/// Errors produced while scanning and parsing a Program Stream.
#[derive(Debug, Error)]
pub enum DemuxError {
    #[error("I/O error reading program stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("no start code found within {0} bytes")]
    StartCodeNotFound(usize),

    #[error("PES packet is scrambled (scrambling_control flags 0x{0:02x}); decoding scrambled content is not supported")]
    Scrambled(u8),
}
