use crate::clock::ClockSource;
use crate::gpt::{CaptureEdge, Channel, Channels, CounterMode, LowPower, OutputAction};
use crate::pad::PadProfile;

/// Tunables of both diagnostics.
///
/// The default reproduces the classic bring-up procedure: a 1 MHz counter,
/// compare events after 1, 2 and 3 seconds, falling edge capture on
/// channel 2 and a timeout of 5 rollovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    pub clock_source: ClockSource,
    pub tick_hz: u32,
    pub counter_mode: CounterMode,
    pub low_power: LowPower,
    pub compare: CompareConfiguration,
    pub capture: CaptureConfiguration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompareConfiguration {
    /// Absolute counter values at which each channel fires. Compare 1
    /// restarts the counter, so it should hold the largest value.
    pub offsets: [(Channel, u32); 3],
    pub output_action: OutputAction,
    /// Number of observed events after which the test ends.
    pub iterations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureConfiguration {
    pub channel: Channel,
    pub edge: CaptureEdge,
    pub pad: PadProfile,
    /// Number of rollovers after which the test gives up waiting.
    pub rollover_timeout: u32,
    /// Pause between polls of the flags.
    pub pacing_us: u32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            clock_source: ClockSource::Peripheral,
            tick_hz: 1_000_000,
            counter_mode: CounterMode::Restart,
            low_power: LowPower::WAIT | LowPower::STOP,
            compare: CompareConfiguration::default(),
            capture: CaptureConfiguration::default(),
        }
    }
}

impl Default for CompareConfiguration {
    fn default() -> Self {
        Self {
            offsets: [
                (Channel::OutputCompare3, 1_000_000),
                (Channel::OutputCompare2, 2_000_000),
                (Channel::OutputCompare1, 3_000_000),
            ],
            output_action: OutputAction::Disabled,
            iterations: 4 * 3,
        }
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            channel: Channel::InputCapture2,
            edge: CaptureEdge::Falling,
            pad: PadProfile::pulled_up_input(),
            rollover_timeout: 5,
            pacing_us: 1000,
        }
    }
}

impl CompareConfiguration {
    pub(crate) fn channels(&self) -> Channels {
        self.offsets
            .iter()
            .fold(Channels::NONE, |acc, (channel, _)| acc | *channel)
    }
}
