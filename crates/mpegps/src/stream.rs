use crate::constants::MAX_PAYLOAD_SIZE;
use crate::error::MuxError;
use crate::ticker::PtsTicker;

/// Audio codecs this muxer knows how to stamp a stream id for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodec {
    /// MPEG-1/2 audio layer I/II/III, coded directly as `0xC0..=0xDF`.
    Mp2,
    /// Dolby AC-3, coded inside `private_stream_1` with a sub-id.
    Ac3,
}

/// Video codecs this muxer knows how to stamp a stream id for. MPEG-2
/// video shares the same PES stream id space as MPEG-1 video; only the
/// pack-header cadence and PES header length differ by profile, not the
/// codec tag itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    Mpeg1,
}

/// What kind of elementary stream a [`crate::mux::MuxSession`] slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementaryKind {
    Audio(AudioCodec),
    Video(VideoCodec),
}

/// Caller-supplied description of one elementary stream to multiplex.
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    pub kind: ElementaryKind,
    /// Nominal bit rate in bits/second, used for `mux_rate` and
    /// pack-header cadence derivation.
    pub bit_rate: u32,
    /// Audio sample rate in Hz. Ignored for video streams.
    pub sample_rate: u32,
    /// Audio samples per coded frame (e.g. 1152 for MPEG layer II).
    /// Ignored for video streams.
    pub frame_size: u32,
    /// Video frame rate scaled by [`crate::constants::FRAME_RATE_BASE`]
    /// (e.g. 25 fps is `25 * FRAME_RATE_BASE`). Ignored for audio streams.
    pub frame_rate: u32,
}

/// Per-stream multiplexing state: the fixed-size elementary-stream
/// accumulator, its PES stream id, and its drift-free PTS ticker.
pub(crate) struct StreamBuffer {
    pub(crate) id: u8,
    pub(crate) kind: ElementaryKind,
    pub(crate) max_buffer_size: u32,
    pub(crate) bit_rate: u32,

    pub(crate) buffer: Box<[u8; MAX_PAYLOAD_SIZE]>,
    pub(crate) buffer_ptr: usize,

    pub(crate) pts: u64,
    pub(crate) start_pts: Option<u64>,
    pub(crate) pts_ticker: PtsTicker,

    pub(crate) packet_number: u64,
}

impl StreamBuffer {
    pub(crate) fn new(
        id: u8,
        kind: ElementaryKind,
        max_buffer_size: u32,
        bit_rate: u32,
        config: &StreamConfig,
    ) -> Result<Self, MuxError> {
        let pts_ticker = match kind {
            ElementaryKind::Audio(_) => PtsTicker::new(
                config.sample_rate as u64,
                90_000u64 * config.frame_size as u64,
            )?,
            ElementaryKind::Video(_) => PtsTicker::new(
                config.frame_rate as u64,
                90_000u64 * crate::constants::FRAME_RATE_BASE as u64,
            )?,
        };

        Ok(Self {
            id,
            kind,
            max_buffer_size,
            bit_rate,
            buffer: Box::new([0u8; MAX_PAYLOAD_SIZE]),
            buffer_ptr: 0,
            pts: 0,
            start_pts: None,
            pts_ticker,
            packet_number: 0,
        })
    }
}
