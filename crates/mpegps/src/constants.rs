//! Wire constants shared by the muxer and demuxer.
//!
//! Values and names follow ISO/IEC 11172-1 / 13818-1 and the historical
//! libav `mpeg.c` encoder/decoder this crate's packetization state machine
//! is modeled on.

/// Start of a pack header.
pub const PACK_START_CODE: u32 = 0x0000_01BA;
/// Start of a system header.
pub const SYSTEM_HEADER_START_CODE: u32 = 0x0000_01BB;
/// Terminal marker appended by [`crate::mux::MuxSession::end`] when the
/// last stream flushed still had data pending.
pub const ISO_11172_END_CODE: u32 = 0x0000_01B9;
/// MPEG-1/2 video sequence end code. Not emitted by this muxer (elementary
/// streams are opaque payload to it) but named here for completeness, as
/// `mpeg.c` itself names it even though its encoder never writes it.
pub const SEQUENCE_END_CODE: u32 = 0x0000_01B7;

/// Mask isolating the 3-byte start-code prefix from a 4-byte window.
pub const PACKET_START_CODE_MASK: u32 = 0xFFFF_FF00;
/// The `00 00 01` prefix shared by all start codes, left-aligned in a
/// 4-byte window.
pub const PACKET_START_CODE_PREFIX: u32 = 0x0000_0100;

/// `program_stream_map` start code.
pub const PROGRAM_STREAM_MAP: u32 = 0x1BC;
/// `private_stream_1` start code: envelope for AC-3 (and other non-MPEG)
/// audio, with a one-byte sub-stream id immediately following the PES
/// header.
pub const PRIVATE_STREAM_1: u32 = 0x1BD;
/// `padding_stream` start code.
pub const PADDING_STREAM: u32 = 0x1BE;
/// `private_stream_2` start code.
pub const PRIVATE_STREAM_2: u32 = 0x1BF;

/// Inclusive range of demuxed start codes that carry MPEG video PES
/// packets (`0x1E0..=0x1EF`).
pub const VIDEO_STARTCODE_RANGE: std::ops::RangeInclusive<u32> = 0x1E0..=0x1EF;
/// Inclusive range of demuxed start codes that carry MPEG audio PES
/// packets (`0x1C0..=0x1DF`).
pub const AUDIO_STARTCODE_RANGE: std::ops::RangeInclusive<u32> = 0x1C0..=0x1DF;
/// Inclusive range of `private_stream_1` sub-ids that the demuxer will
/// infer as AC-3 audio when no stream has registered that id yet. Note
/// this is narrower than the range of sub-ids that get the 3-byte AC-3
/// sub-header skipped (`0x80..=0xBF`); `mpeg.c` itself only infers a new
/// AC-3 stream for `0x80..=0x9F` and silently skips anything outside it
/// with no matching stream. Preserved here rather than "fixed".
pub const AC3_INFER_RANGE: std::ops::RangeInclusive<u32> = 0x80..=0x9F;
/// Range of `private_stream_1` sub-ids that carry the 3-byte AC-3
/// sub-header (`substream id, 0x01, 0x00, 0x02`).
pub const AC3_SUBHEADER_RANGE: std::ops::RangeInclusive<u8> = 0x80..=0xBF;

/// First MPEG audio PES stream id assigned by the muxer.
pub const AUDIO_ID_BASE: u8 = 0xC0;
/// First AC-3 `private_stream_1` sub-id assigned by the muxer.
pub const AC3_ID_BASE: u8 = 0x80;
/// First MPEG video PES stream id assigned by the muxer.
pub const VIDEO_ID_BASE: u8 = 0xE0;
/// PES stream ids below this are treated as private/AC-3 streams and
/// coded as `private_stream_1` (0x1BD) rather than directly.
pub const PRIVATE_STREAM_ID_THRESHOLD: u8 = 0xC0;

/// Maximum bytes of pending elementary-stream data buffered per stream.
/// Matches the MPEG STD buffer accounting; a hard design choice, not
/// promoted to dynamic growth.
pub const MAX_PAYLOAD_SIZE: usize = 4096;
/// Declared decoder buffer bound (system header units) for audio streams.
pub const AUDIO_MAX_BUFFER_SIZE: u32 = 4 * 1024;
/// Declared decoder buffer bound (system header units) for video streams.
pub const VIDEO_MAX_BUFFER_SIZE: u32 = 46 * 1024;

/// PES packet size for the VCD profile.
pub const VCD_PACKET_SIZE: u32 = 2324;
/// PES packet size for the MPEG-1 System and MPEG-2 VOB profiles.
pub const DEFAULT_PACKET_SIZE: u32 = 2048;

/// Integer denominator used to express a fractional video frame rate,
/// matching the historical libav `FRAME_RATE_BASE` convention: a codec's
/// `frame_rate` field is the true rate multiplied by this base.
pub const FRAME_RATE_BASE: u32 = 1_000_000;

/// Byte budget the start-code scanner will read through before giving up.
pub const MAX_SYNC_SIZE: usize = 100_000;
