//! MPEG-1/2 Program Stream (PS) muxer and demuxer.
//!
//! Covers the MPEG-1 System variant, the Video-CD (VCD) profile, and the
//! MPEG-2 VOB profile: per-stream elementary-stream accumulation, pack
//! and system header emission, PES packetization with exact header
//! lengths and stuffing, 33-bit PTS/DTS encoding, a drift-free
//! sample-to-PTS ticker, and the reverse demux start-code scanner and
//! PES header parser.
//!
//! Out of scope: MPEG-TS framing, DVD navigation packs, seeking indices,
//! encrypted PES, re-encoding elementary streams, and format/container
//! registration glue, all of which belong to an embedding format context
//! rather than this crate's packetization core.

pub mod constants;
pub mod demux;
pub mod error;
pub mod mux;
pub mod stream;
pub mod ticker;

mod bits;
mod header;

pub use demux::{probe, Demuxer, Packet, ProbeScore, StreamDescriptor, StreamTable};
pub use error::{DemuxError, MuxError};
pub use mux::{MuxConfig, MuxSession, Profile};
pub use stream::{AudioCodec, ElementaryKind, StreamConfig, VideoCodec};
pub use ticker::PtsTicker;
