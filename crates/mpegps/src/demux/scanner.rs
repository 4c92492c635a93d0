use std::io::Read;

use crate::error::DemuxError;

const START_CODE_PREFIX: u32 = 0x0000_01;
const WINDOW_MASK: u32 = 0x00FF_FFFF;

/// Byte-at-a-time scanner for the `00 00 01 xx` start-code prefix shared
/// by every Program Stream unit, built around a rolling 3-byte shift
/// register the way `mpeg.c`'s `find_start_code`/`mpegps_read_packet`
/// maintain `header_state`.
pub struct StartCodeScanner {
    state: u32,
}

impl StartCodeScanner {
    /// A freshly reset scanner, matching the `header_state = 0xff`
    /// re-initialization `mpegps_read_packet` performs at the start of
    /// every call.
    pub fn new() -> Self {
        Self { state: 0xFF }
    }

    /// Read from `reader` until a start code is found, returning the full
    /// 4-byte value (`0x000001xx`) once `xx` is known. Gives up with
    /// [`DemuxError::StartCodeNotFound`] after `budget` bytes without a
    /// match.
    pub fn find_start_code<R: Read>(
        &mut self,
        reader: &mut R,
        budget: usize,
    ) -> Result<u32, DemuxError> {
        let mut byte = [0u8; 1];
        for _ in 0..budget {
            match reader.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    if self.state == START_CODE_PREFIX {
                        self.state = ((self.state << 8) | byte[0] as u32) & WINDOW_MASK;
                        return Ok(START_CODE_PREFIX << 8 | byte[0] as u32);
                    }
                    self.state = ((self.state << 8) | byte[0] as u32) & WINDOW_MASK;
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DemuxError::Io(e)),
            }
        }
        Err(DemuxError::StartCodeNotFound(budget))
    }
}

impl Default for StartCodeScanner {
    fn default() -> Self {
        Self::new()
    }
}
