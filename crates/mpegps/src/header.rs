use crate::bits::BitWriter;
use crate::constants::{
    PACK_START_CODE, PRIVATE_STREAM_ID_THRESHOLD, SYSTEM_HEADER_START_CODE, VIDEO_ID_BASE,
};
use crate::mux::MuxSession;

/// Size in bytes of a pack header. Fields sum to 96 bits (12 bytes) in
/// `mpeg.c`'s `put_pack_header` for every profile this crate supports;
/// the MPEG-2 `pack_stuffing_length` extension is not emitted, matching
/// the original encoder, which never special-cases `is_mpeg2` there.
pub(crate) const PACK_HEADER_SIZE: usize = 12;

/// Build a pack header stamping `pts` as `system_clock_reference` and
/// `mux_rate` as the program mux rate (in units of 50 bytes/second).
pub(crate) fn encode_pack_header(pts: u64, mux_rate: u32) -> [u8; PACK_HEADER_SIZE] {
    let mut bw = BitWriter::new();
    bw.put_bits(32, PACK_START_CODE as u64);
    bw.put_bits(4, 0x2);
    bw.put_bits(3, (pts >> 30) & 0x7);
    bw.put_bits(1, 1);
    bw.put_bits(15, (pts >> 15) & 0x7FFF);
    bw.put_bits(1, 1);
    bw.put_bits(15, pts & 0x7FFF);
    bw.put_bits(1, 1);
    bw.put_bits(1, 1);
    bw.put_bits(22, mux_rate as u64);
    bw.put_bits(1, 1);

    let bytes = bw.finish();
    let mut out = [0u8; PACK_HEADER_SIZE];
    out.copy_from_slice(&bytes);
    out
}

/// Build a system header describing every stream in `session`: rate
/// bound, audio/video bounds, and one `stream_id`/`STD_buffer_bound_scale`/
/// `STD_buffer_size_bound` entry per stream, coalescing every AC-3
/// sub-stream behind a single `private_stream_1` (0xBD) entry the way
/// `mpeg.c`'s `put_system_header` does via its `private_stream_coded` flag.
pub(crate) fn encode_system_header(session: &MuxSession) -> Vec<u8> {
    let mut bw = BitWriter::new();
    bw.put_bits(32, SYSTEM_HEADER_START_CODE as u64);
    bw.put_bits(16, 0); // header_length, patched below
    bw.put_bits(1, 1);
    bw.put_bits(22, session.mux_rate as u64);
    bw.put_bits(1, 1);
    bw.put_bits(6, session.audio_bound as u64);
    bw.put_bits(1, 1); // fixed_flag (vbr not distinguished by this crate)
    bw.put_bits(1, 1); // CSPS_flag
    bw.put_bits(1, 0); // system_audio_lock_flag
    bw.put_bits(1, 0); // system_video_lock_flag
    bw.put_bits(1, 1); // marker_bit
    bw.put_bits(5, session.video_bound as u64);
    bw.put_bits(8, 0xFF); // reserved / packet_rate_restriction_flag byte

    let mut private_stream_coded = false;
    for stream in &session.streams {
        let mut id = stream.id as u64;
        if stream.id < PRIVATE_STREAM_ID_THRESHOLD {
            if private_stream_coded {
                continue;
            }
            private_stream_coded = true;
            id = 0xBD;
        }
        bw.put_bits(8, id);
        bw.put_bits(2, 0b11);
        if id < VIDEO_ID_BASE as u64 {
            bw.put_bits(1, 0);
            bw.put_bits(13, (stream.max_buffer_size / 128) as u64);
        } else {
            bw.put_bits(1, 1);
            bw.put_bits(13, (stream.max_buffer_size / 1024) as u64);
        }
    }

    let mut out = bw.finish();
    let header_length = (out.len() - 6) as u16;
    out[4..6].copy_from_slice(&header_length.to_be_bytes());
    out
}
