use crate::error::MuxError;

/// Drift-free accumulator converting a count of samples (audio frames or
/// video pictures) into 90kHz PTS ticks.
///
/// Each call to [`PtsTicker::tick`] advances by `n * num / den`, carrying
/// the remainder in `err` so that repeated calls never lose or gain a
/// fractional tick to floating-point rounding, no matter how long the
/// stream runs.
#[derive(Debug, Clone, Copy)]
pub struct PtsTicker {
    num: u64,
    den: u64,
    err: u64,
}

impl PtsTicker {
    /// `unit` is the numerator (PTS ticks produced per `sample_rate` worth
    /// of samples), `sample_rate` is the denominator. For audio, callers
    /// pass `unit = 90_000 * frame_size` and `sample_rate` in Hz; for
    /// video, `unit = 90_000 * FRAME_RATE_BASE` and `sample_rate` the
    /// codec's `FRAME_RATE_BASE`-scaled frame rate.
    pub fn new(sample_rate: u64, unit: u64) -> Result<Self, MuxError> {
        if sample_rate == 0 {
            return Err(MuxError::InvalidTickerRate);
        }
        Ok(Self {
            num: unit,
            den: sample_rate,
            err: 0,
        })
    }

    /// Advance by `n` samples, returning the number of 90kHz ticks elapsed.
    pub fn tick(&mut self, n: u64) -> u64 {
        let total = (n as u128) * (self.num as u128) + self.err as u128;
        let den = self.den as u128;
        let inc = total / den;
        self.err = (total % den) as u64;
        inc as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_sample_rate() {
        assert!(matches!(
            PtsTicker::new(0, 90_000),
            Err(MuxError::InvalidTickerRate)
        ));
    }

    #[test]
    fn accumulates_without_drift_over_long_runs() {
        // 44100 Hz audio, 1152-sample frames: ticks should sum to exactly
        // what a rational computation over the whole run gives, with no
        // float error creeping in over many frames.
        let frame_size = 1152u64;
        let sample_rate = 44_100u64;
        let mut ticker = PtsTicker::new(sample_rate, 90_000 * frame_size).unwrap();

        let frames = 100_000u64;
        let mut total_ticks = 0u64;
        for _ in 0..frames {
            total_ticks += ticker.tick(1);
        }

        let expected = (frames * frame_size * 90_000) / sample_rate;
        // off by at most the single final remainder, which is dropped
        // rather than rounded
        assert!(expected - total_ticks <= 1);
    }

    #[test]
    fn exact_ratio_has_no_remainder() {
        // 90000/90000 = 1 tick per sample exactly, err should stay 0.
        let mut ticker = PtsTicker::new(90_000, 90_000).unwrap();
        for _ in 0..1000 {
            assert_eq!(ticker.tick(1), 1);
        }
    }
}
