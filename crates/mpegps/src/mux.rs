use std::io::Write;

use tracing::trace;

use crate::constants::{
    AC3_ID_BASE, AUDIO_ID_BASE, AUDIO_MAX_BUFFER_SIZE, DEFAULT_PACKET_SIZE, ISO_11172_END_CODE,
    PRIVATE_STREAM_ID_THRESHOLD, VCD_PACKET_SIZE, VIDEO_ID_BASE, VIDEO_MAX_BUFFER_SIZE,
};
use crate::error::MuxError;
use crate::header::{encode_pack_header, encode_system_header};
use crate::stream::{StreamBuffer, StreamConfig};

/// Which packetization profile a [`MuxSession`] targets. Affects packet
/// size, pack-header cadence, and PES header length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Plain MPEG-1 System Stream: 2048-byte packets, adaptive pack-header
    /// cadence, 5-byte PES headers.
    Mpeg1System,
    /// Video CD: 2324-byte packets, a pack header on every packet, 5-byte
    /// PES headers.
    Vcd,
    /// MPEG-2 Program Stream (VOB-style): 2048-byte packets, a pack header
    /// on every packet, 8-byte PES headers (extra stuffing/flags byte).
    Vob,
}

impl Profile {
    fn packet_size(self) -> u32 {
        match self {
            Profile::Vcd => VCD_PACKET_SIZE,
            Profile::Mpeg1System | Profile::Vob => DEFAULT_PACKET_SIZE,
        }
    }

    fn is_mpeg2(self) -> bool {
        matches!(self, Profile::Vob)
    }

    fn is_vcd(self) -> bool {
        matches!(self, Profile::Vcd)
    }
}

/// Full description of the streams a [`MuxSession`] will multiplex.
pub struct MuxConfig {
    pub profile: Profile,
    pub streams: Vec<StreamConfig>,
}

/// A Program Stream multiplexing session over a fixed set of elementary
/// streams. Owns per-stream accumulation buffers and PTS tickers, and
/// writes pack headers, system headers, and PES packets to any
/// `std::io::Write` sink via [`MuxSession::write_packet`] and
/// [`MuxSession::end`].
pub struct MuxSession {
    packet_size: u32,
    packet_data_max_size: u32,
    packet_number: u64,
    pack_header_freq: u64,
    system_header_freq: u64,
    pub(crate) mux_rate: u32,
    pub(crate) audio_bound: u8,
    pub(crate) video_bound: u8,
    is_mpeg2: bool,
    pub(crate) streams: Vec<StreamBuffer>,
}

impl MuxSession {
    pub fn new(config: MuxConfig) -> Result<Self, MuxError> {
        let profile = config.profile;
        let packet_size = profile.packet_size();
        let packet_data_max_size = packet_size - 7;

        let mut mpa_id = AUDIO_ID_BASE;
        let mut ac3_id = AC3_ID_BASE;
        let mut mpv_id = VIDEO_ID_BASE;
        let mut audio_bound: u8 = 0;
        let mut video_bound: u8 = 0;
        let mut total_bit_rate: u64 = 2000; // system overhead allowance, per mpeg.c
        let mut streams = Vec::with_capacity(config.streams.len());

        for stream_config in &config.streams {
            total_bit_rate += stream_config.bit_rate as u64;
            let (id, max_buffer_size) = match stream_config.kind {
                crate::stream::ElementaryKind::Audio(crate::stream::AudioCodec::Ac3) => {
                    let id = ac3_id;
                    ac3_id += 1;
                    audio_bound += 1;
                    (id, AUDIO_MAX_BUFFER_SIZE)
                }
                crate::stream::ElementaryKind::Audio(crate::stream::AudioCodec::Mp2) => {
                    let id = mpa_id;
                    mpa_id += 1;
                    audio_bound += 1;
                    (id, AUDIO_MAX_BUFFER_SIZE)
                }
                crate::stream::ElementaryKind::Video(_) => {
                    let id = mpv_id;
                    mpv_id += 1;
                    video_bound += 1;
                    (id, VIDEO_MAX_BUFFER_SIZE)
                }
            };
            streams.push(StreamBuffer::new(
                id,
                stream_config.kind,
                max_buffer_size,
                stream_config.bit_rate,
                stream_config,
            )?);
        }

        let mux_rate = ((total_bit_rate + (8 * 50 - 1)) / (8 * 50)) as u32;

        let pack_header_freq = if profile.is_vcd() || profile.is_mpeg2() {
            1
        } else {
            // roughly one pack header every half second of data
            let v = (2 * total_bit_rate) / (packet_size as u64 * 8);
            v.max(1)
        };
        let system_header_freq = if profile.is_vcd() {
            pack_header_freq * 40
        } else {
            pack_header_freq * 5
        };

        Ok(Self {
            packet_size,
            packet_data_max_size,
            packet_number: 0,
            pack_header_freq,
            system_header_freq,
            mux_rate,
            audio_bound,
            video_bound,
            is_mpeg2: profile.is_mpeg2(),
            streams,
        })
    }

    /// Number of elementary streams configured for this session.
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Append `data` to `stream_index`'s elementary-stream buffer, flushing
    /// full packets to `sink` as the buffer fills. If `force_pts` is
    /// given, it stamps the packet's PTS the next time this stream starts
    /// a fresh packet (i.e. when its buffer is currently empty); otherwise
    /// the stream's running ticker value is used. Exactly one ticker
    /// advance happens per call, regardless of how much data was appended
    /// or how many packets were flushed — callers should invoke this once
    /// per encoded frame, not once per arbitrary byte chunk.
    pub fn write_packet<W: Write>(
        &mut self,
        sink: &mut W,
        stream_index: usize,
        mut data: &[u8],
        force_pts: Option<u64>,
    ) -> Result<(), MuxError> {
        if stream_index >= self.streams.len() {
            return Err(MuxError::InvalidStreamIndex(stream_index));
        }

        while !data.is_empty() {
            {
                let stream = &mut self.streams[stream_index];
                if stream.start_pts.is_none() {
                    if let Some(pts) = force_pts {
                        stream.pts = pts;
                    }
                    stream.start_pts = Some(stream.pts);
                }
            }

            let take = {
                let stream = &self.streams[stream_index];
                (self.packet_data_max_size as usize - stream.buffer_ptr).min(data.len())
            };
            {
                let stream = &mut self.streams[stream_index];
                let dst = stream.buffer_ptr;
                stream.buffer[dst..dst + take].copy_from_slice(&data[..take]);
                stream.buffer_ptr += take;
            }
            data = &data[take..];

            while self.streams[stream_index].buffer_ptr >= self.packet_data_max_size as usize {
                self.flush_packet(sink, stream_index, false)?;
            }
        }

        let inc = self.streams[stream_index].pts_ticker.tick(1);
        self.streams[stream_index].pts += inc;
        Ok(())
    }

    /// Flush every stream's remaining buffered data as a final packet.
    /// The last stream flushed gets the terminal `ISO_11172_END_CODE`
    /// appended; if every stream's buffer was already empty, nothing is
    /// written at all and no stand-alone end code is emitted. This
    /// mirrors `mpeg_mux_end` in the original encoder, whose
    /// `put_be32(pb, ISO_11172_END_CODE)` tail write is commented out.
    pub fn end<W: Write>(&mut self, sink: &mut W) -> Result<(), MuxError> {
        let n = self.streams.len();
        for i in 0..n {
            if self.streams[i].buffer_ptr > 0 {
                let is_last = i == n - 1;
                self.flush_packet(sink, i, is_last)?;
            }
        }
        Ok(())
    }

    fn flush_packet<W: Write>(
        &mut self,
        sink: &mut W,
        stream_index: usize,
        last_pkt: bool,
    ) -> Result<(), MuxError> {
        let mut preface = Vec::new();
        if self.packet_number % self.pack_header_freq == 0 {
            let timestamp = self.streams[stream_index]
                .start_pts
                .ok_or(MuxError::UnstampedPts(stream_index))?;
            preface.extend_from_slice(&encode_pack_header(timestamp, self.mux_rate));
            if self.packet_number % self.system_header_freq == 0 {
                preface.extend_from_slice(&encode_system_header(self));
            }
        }

        let header_len: i64 = if self.is_mpeg2 { 8 } else { 5 };
        let id = self.streams[stream_index].id;
        let is_private = id < PRIVATE_STREAM_ID_THRESHOLD;
        let startcode: u32 = if is_private {
            0x1BD
        } else {
            0x100 + id as u32
        };

        let mut payload_size: i64 = self.packet_size as i64
            - (preface.len() as i64 + 6 + header_len + if last_pkt { 4 } else { 0 });
        if is_private {
            payload_size -= 4; // private_stream_1 sub-header
        }

        let buffer_ptr = self.streams[stream_index].buffer_ptr as i64;
        let stuffing_size = (payload_size - buffer_ptr).max(0);

        let mut out = preface;
        out.extend_from_slice(&startcode.to_be_bytes());
        out.extend_from_slice(&((payload_size + header_len) as u16).to_be_bytes());
        out.extend(std::iter::repeat(0xFFu8).take(stuffing_size as usize));

        if self.is_mpeg2 {
            out.extend_from_slice(&[0x80, 0x80, 0x05]);
        }

        let pts = self.streams[stream_index].pts;
        out.push(((0x2 << 4) | (((pts >> 30) & 0x7) << 1) | 1) as u8);
        out.extend_from_slice(&((((pts >> 15) & 0x7FFF) << 1 | 1) as u16).to_be_bytes());
        out.extend_from_slice(&(((pts & 0x7FFF) << 1 | 1) as u16).to_be_bytes());

        if is_private {
            out.push(id);
            out.extend_from_slice(&[0x01, 0x00, 0x02]);
        }

        if last_pkt {
            out.extend_from_slice(&ISO_11172_END_CODE.to_be_bytes());
        }

        let payload_taken = (payload_size - stuffing_size).max(0) as usize;
        out.extend_from_slice(&self.streams[stream_index].buffer[..payload_taken]);

        sink.write_all(&out)?;
        sink.flush()?;

        let stream = &mut self.streams[stream_index];
        let leftover = (stream.buffer_ptr as i64 - payload_taken as i64).max(0) as usize;
        stream.buffer.copy_within(payload_taken..payload_taken + leftover, 0);
        stream.buffer_ptr = leftover;
        stream.start_pts = None;
        stream.packet_number += 1;

        self.packet_number += 1;
        trace!(stream_index, packet_number = self.packet_number, "flushed PS packet");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{AudioCodec, ElementaryKind};

    fn single_audio_config(profile: Profile) -> MuxConfig {
        MuxConfig {
            profile,
            streams: vec![StreamConfig {
                kind: ElementaryKind::Audio(AudioCodec::Mp2),
                bit_rate: 224_000,
                sample_rate: 44_100,
                frame_size: 1152,
                frame_rate: 0,
            }],
        }
    }

    fn audio_and_video_config(profile: Profile) -> MuxConfig {
        MuxConfig {
            profile,
            streams: vec![
                StreamConfig {
                    kind: ElementaryKind::Audio(AudioCodec::Mp2),
                    bit_rate: 224_000,
                    sample_rate: 44_100,
                    frame_size: 1152,
                    frame_rate: 0,
                },
                StreamConfig {
                    kind: ElementaryKind::Video(crate::stream::VideoCodec::Mpeg1),
                    bit_rate: 1_150_000,
                    sample_rate: 0,
                    frame_size: 0,
                    frame_rate: 25 * crate::constants::FRAME_RATE_BASE,
                },
            ],
        }
    }

    #[test]
    fn mux_rate_matches_total_bitrate_ceil_division() {
        let session = MuxSession::new(single_audio_config(Profile::Mpeg1System)).unwrap();
        // (2000 + 224000 + 399) / 400
        assert_eq!(session.mux_rate, 565);
    }

    #[test]
    fn vcd_profile_uses_2324_byte_packets_and_header_every_packet() {
        let session = MuxSession::new(single_audio_config(Profile::Vcd)).unwrap();
        assert_eq!(session.packet_size, VCD_PACKET_SIZE);
        assert_eq!(session.pack_header_freq, 1);
    }

    #[test]
    fn end_emits_nothing_when_all_streams_already_flushed() {
        let mut session = MuxSession::new(single_audio_config(Profile::Mpeg1System)).unwrap();
        let mut sink = Vec::new();
        session.end(&mut sink).unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn write_packet_then_end_emits_terminal_end_code() {
        let mut session = MuxSession::new(single_audio_config(Profile::Mpeg1System)).unwrap();
        let mut sink = Vec::new();
        session
            .write_packet(&mut sink, 0, &[0xAA; 100], Some(0))
            .unwrap();
        session.end(&mut sink).unwrap();
        assert!(sink.windows(4).any(|w| w == ISO_11172_END_CODE.to_be_bytes()));
    }

    /// S6 (spec.md §8): with two streams both holding pending data at
    /// `end()`, exactly one `ISO_11172_END_CODE` appears in the output,
    /// immediately following the last stream's final PES header (step 10
    /// runs before the payload bytes of step 11 in `flush_packet`) and
    /// immediately preceding that stream's trailing payload bytes.
    #[test]
    fn end_with_two_pending_streams_emits_exactly_one_terminal_end_code() {
        let mut session =
            MuxSession::new(audio_and_video_config(Profile::Mpeg1System)).unwrap();
        let mut sink = Vec::new();
        let video_payload = [0x22u8; 40];
        session
            .write_packet(&mut sink, 0, &[0x11; 40], Some(0))
            .unwrap();
        session
            .write_packet(&mut sink, 1, &video_payload, Some(0))
            .unwrap();
        session.end(&mut sink).unwrap();

        let end_code = ISO_11172_END_CODE.to_be_bytes();
        let occurrences = sink.windows(4).filter(|w| *w == end_code).count();
        assert_eq!(occurrences, 1);

        // the video stream's 40-byte payload is unstuffed (its packet is
        // far larger than 40 bytes), so it lands as the literal trailing
        // bytes of the sink, with the end code directly ahead of it.
        assert_eq!(&sink[sink.len() - video_payload.len()..], &video_payload);
        let end_code_pos = sink.len() - video_payload.len() - 4;
        assert_eq!(&sink[end_code_pos..end_code_pos + 4], &end_code);
    }

    #[test]
    fn write_packet_rejects_out_of_range_stream_index() {
        let mut session = MuxSession::new(single_audio_config(Profile::Mpeg1System)).unwrap();
        let mut sink = Vec::new();
        let err = session.write_packet(&mut sink, 5, &[0], None).unwrap_err();
        assert!(matches!(err, MuxError::InvalidStreamIndex(5)));
    }

    #[test]
    fn full_packets_are_flushed_at_exact_packet_size() {
        let mut session = MuxSession::new(single_audio_config(Profile::Mpeg1System)).unwrap();
        let mut sink = Vec::new();
        // enough bytes to force at least one full packet flush
        let chunk = vec![0x7Fu8; 4096];
        session.write_packet(&mut sink, 0, &chunk, Some(0)).unwrap();
        assert!(!sink.is_empty());
        assert_eq!(sink.len() % session.packet_size as usize, 0);
    }
}
