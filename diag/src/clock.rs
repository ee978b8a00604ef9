//! Clock sources feeding the timer.

/// Clock the timer counter can be driven from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Peripheral bus clock, tens of MHz.
    Peripheral,
    /// High frequency reference clock.
    HighFrequency,
    /// 32 kHz low frequency clock.
    LowFrequency,
    /// Crystal oscillator.
    Crystal,
}

/// Query of clock frequencies.
pub trait Clocks {
    /// Frequency of the given source in Hz.
    fn frequency(&self, source: ClockSource) -> u32;
}

/// Divider bringing `source_hz` as close to `tick_hz` as possible
/// without going under it. Never 0.
#[must_use]
pub fn divider_for(source_hz: u32, tick_hz: u32) -> u32 {
    if tick_hz == 0 {
        return 1;
    }
    (source_hz / tick_hz).max(1)
}
