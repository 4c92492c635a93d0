//! Reverse direction of [`crate::mux`]: recovers elementary-stream
//! packets with their presentation/decode timestamps from an arbitrary
//! Program Stream byte source.

mod pes;
mod scanner;
mod stream_table;

pub use scanner::StartCodeScanner;
pub use stream_table::{StreamDescriptor, StreamTable};

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use tracing::trace;

use crate::constants::{
    AUDIO_STARTCODE_RANGE, MAX_SYNC_SIZE, PACKET_START_CODE_MASK, PACKET_START_CODE_PREFIX,
    PACK_START_CODE, PADDING_STREAM, PRIVATE_STREAM_1, PRIVATE_STREAM_2, PROGRAM_STREAM_MAP,
    SYSTEM_HEADER_START_CODE, VIDEO_STARTCODE_RANGE,
};
use crate::error::DemuxError;
use pes::{skip, ParsedPes, PesParser};

/// One elementary-stream packet recovered from a Program Stream, with
/// its decoded presentation and decode timestamps.
#[derive(Debug, Clone)]
pub struct Packet {
    pub stream_index: usize,
    pub pts: u64,
    pub dts: u64,
    pub data: Vec<u8>,
}

/// Result of [`probe`]: whether the first start code in a buffer looks
/// like Program Stream framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeScore {
    /// One below the format-detection maximum, leaving room for a
    /// higher-confidence sibling format (MPEG-TS) to win a tie, matching
    /// `mpegps_probe`'s `AVPROBE_SCORE_MAX - 1`.
    SecondChance,
    /// Not recognized as Program Stream framing.
    No,
}

/// Inspect the first `00 00 01 xx` start code in `buf` and score it as
/// Program Stream framing or not, the way `mpegps_probe` does: any known
/// PS start code (pack, system header, the audio/video PES ranges, the
/// private/padding streams, or the stream map) scores
/// [`ProbeScore::SecondChance`]; anything else — including a buffer with
/// no start code at all — scores [`ProbeScore::No`].
pub fn probe(buf: &[u8]) -> ProbeScore {
    let mut code: u32 = 0xFF;
    for &b in buf {
        code = (code << 8) | b as u32;
        if (code & PACKET_START_CODE_MASK) == PACKET_START_CODE_PREFIX {
            return if code == PACK_START_CODE
                || code == SYSTEM_HEADER_START_CODE
                || VIDEO_STARTCODE_RANGE.contains(&code)
                || AUDIO_STARTCODE_RANGE.contains(&code)
                || code == PRIVATE_STREAM_2
                || code == PROGRAM_STREAM_MAP
                || code == PRIVATE_STREAM_1
                || code == PADDING_STREAM
            {
                ProbeScore::SecondChance
            } else {
                ProbeScore::No
            };
        }
    }
    ProbeScore::No
}

/// Recovers elementary-stream packets from an arbitrary Program Stream
/// byte source. Generic over `std::io::Read` rather than a bespoke
/// source trait — see SPEC_FULL.md §7.
pub struct Demuxer<R> {
    reader: R,
    stream_table: StreamTable,
}

impl<R: Read> Demuxer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            stream_table: StreamTable::new(),
        }
    }

    /// Streams discovered so far, in first-sighting order.
    pub fn streams(&self) -> &[StreamDescriptor] {
        self.stream_table.streams()
    }

    /// Read the next elementary-stream packet, transparently skipping
    /// pack/system headers, padding, unrecognized start codes, and
    /// locally-recovered malformed PES headers (spec.md §4.8, §7).
    ///
    /// A fresh [`StartCodeScanner`] is created on every resync through
    /// this loop, matching the original's `redo:` label sitting above
    /// its own `header_state` reset (spec.md §9.4) — a start code can
    /// never straddle two calls to this method because each call fully
    /// drains one logical PES packet before returning.
    pub fn read_packet(&mut self) -> Result<Packet, DemuxError> {
        loop {
            let mut scanner = StartCodeScanner::new();
            let startcode = scanner.find_start_code(&mut self.reader, MAX_SYNC_SIZE)?;

            if startcode == PACK_START_CODE || startcode == SYSTEM_HEADER_START_CODE {
                continue;
            }
            if startcode == PADDING_STREAM || startcode == PRIVATE_STREAM_2 {
                let len = self.reader.read_u16::<BigEndian>()?;
                skip(&mut self.reader, len as u64)?;
                trace!(startcode, len, "skipped padding/private_stream_2");
                continue;
            }

            let is_video = VIDEO_STARTCODE_RANGE.contains(&startcode);
            let is_audio = AUDIO_STARTCODE_RANGE.contains(&startcode);
            if !(is_video || is_audio || startcode == PRIVATE_STREAM_1) {
                trace!(startcode, "skipped unrecognized start code");
                continue;
            }

            let (effective_id, pts, dts, payload_len) =
                match PesParser::parse(&mut self.reader, startcode)? {
                    ParsedPes::Resync => {
                        trace!(startcode, "malformed PES header length, resyncing");
                        continue;
                    }
                    ParsedPes::Packet {
                        effective_id,
                        pts,
                        dts,
                        payload_len,
                    } => (effective_id, pts, dts, payload_len),
                };

            let stream_index = match self.stream_table.index_for(effective_id) {
                Some(idx) => idx,
                None => {
                    skip(&mut self.reader, payload_len as u64)?;
                    trace!(effective_id, "skipped unclassifiable stream id");
                    continue;
                }
            };

            let mut data = vec![0u8; payload_len];
            self.reader.read_exact(&mut data)?;

            return Ok(Packet {
                stream_index,
                pts,
                dts,
                data,
            });
        }
    }
}
