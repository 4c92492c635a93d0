use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::constants::{AC3_SUBHEADER_RANGE, PRIVATE_STREAM_1};
use crate::error::DemuxError;

/// Outcome of parsing one PES header (spec.md §4.8 steps 4-11): either a
/// fully decoded packet ready for its payload to be read, or a request
/// to resync at the next start code. `Resync` is the one locally
/// recoverable malformation this parser distinguishes from a hard I/O
/// error: a declared MPEG-2 `header_len` that exceeds the remaining
/// packet length (spec.md §7 `MalformedPesHeader`).
pub(crate) enum ParsedPes {
    Packet {
        effective_id: u32,
        pts: u64,
        dts: u64,
        payload_len: usize,
    },
    Resync,
}

/// Interprets the PES header immediately following a `startcode` the
/// caller has already matched against the video/audio PES ranges or
/// [`PRIVATE_STREAM_1`] and consumed off the wire via the start-code
/// scanner.
pub(crate) struct PesParser;

impl PesParser {
    pub(crate) fn parse<R: Read>(reader: &mut R, startcode: u32) -> Result<ParsedPes, DemuxError> {
        let mut len: i64 = reader.read_u16::<BigEndian>()? as i64;

        let mut c;
        loop {
            c = reader.read_u8()?;
            len -= 1;
            if c != 0xFF {
                break;
            }
        }

        if (c & 0xC0) == 0x40 {
            // buffer scale & size, not otherwise used by this demuxer
            reader.read_u8()?;
            c = reader.read_u8()?;
            len -= 2;
        }

        let mut pts = 0u64;
        let mut dts = 0u64;

        if (c & 0xF0) == 0x20 {
            pts = read_pts_from(reader, c)?;
            dts = pts;
            len -= 4;
        } else if (c & 0xF0) == 0x30 {
            pts = read_pts_from(reader, c)?;
            dts = read_pts(reader)?;
            len -= 9;
        } else if (c & 0xC0) == 0x80 {
            if (c & 0x30) != 0 {
                return Err(DemuxError::Scrambled(c));
            }
            let flags = reader.read_u8()?;
            let mut header_len = reader.read_u8()? as i64;
            len -= 2;
            if header_len > len {
                return Ok(ParsedPes::Resync);
            }
            if (flags & 0xC0) == 0x80 {
                pts = read_pts(reader)?;
                dts = pts;
                header_len -= 5;
                len -= 5;
            } else if (flags & 0xC0) == 0xC0 {
                pts = read_pts(reader)?;
                dts = read_pts(reader)?;
                header_len -= 10;
                len -= 10;
            }
            len -= header_len;
            skip(reader, header_len.max(0) as u64)?;
        }

        let mut effective_id = startcode;
        if startcode == PRIVATE_STREAM_1 {
            let sub_id = reader.read_u8()? as u32;
            len -= 1;
            effective_id = sub_id;
            if AC3_SUBHEADER_RANGE.contains(&(sub_id as u8)) {
                skip(reader, 3)?;
                len -= 3;
            }
        }

        Ok(ParsedPes::Packet {
            effective_id,
            pts,
            dts,
            payload_len: len.max(0) as usize,
        })
    }
}

/// Decode a 33-bit PTS/DTS whose leading byte `c` has already been read
/// off the stream (mirrors `get_pts(pb, c)` with `c >= 0` in `mpeg.c`).
pub(crate) fn read_pts_from<R: Read>(reader: &mut R, c: u8) -> Result<u64, DemuxError> {
    let mut pts = (((c as u64) >> 1) & 0x07) << 30;
    let v = reader.read_u16::<BigEndian>()?;
    pts |= ((v as u64) >> 1) << 15;
    let v = reader.read_u16::<BigEndian>()?;
    pts |= (v as u64) >> 1;
    Ok(pts)
}

/// Decode a 33-bit PTS/DTS, reading its own leading byte (mirrors
/// `get_pts(pb, -1)`).
pub(crate) fn read_pts<R: Read>(reader: &mut R) -> Result<u64, DemuxError> {
    let c = reader.read_u8()?;
    read_pts_from(reader, c)
}

/// Discard `n` bytes from `reader` (mirrors `url_fskip`).
pub(crate) fn skip<R: Read>(reader: &mut R, n: u64) -> Result<(), DemuxError> {
    let mut taken = reader.take(n);
    std::io::copy(&mut taken, &mut std::io::sink())?;
    Ok(())
}
