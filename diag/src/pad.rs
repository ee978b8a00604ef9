//! Routing of the capture input to a physical pin.

use crate::gpt::Channel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    None,
    Down100K,
    Up47K,
    Up100K,
    Up22K,
    /// Keep the last driven level instead of pulling.
    Keeper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlewRate {
    Slow,
    Fast,
}

/// Output driver impedance in ohms. `None` disables the driver.
pub type DriveStrength = Option<u16>;

/// Electrical characteristics of a pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PadProfile {
    pub pull: Pull,
    pub hysteresis: bool,
    pub open_drain: bool,
    pub speed: Speed,
    pub slew_rate: SlewRate,
    pub drive_strength: DriveStrength,
}

impl PadProfile {
    /// Input held high until the operator ties it to ground.
    #[must_use]
    pub const fn pulled_up_input() -> Self {
        Self {
            pull: Pull::Up100K,
            hysteresis: true,
            open_drain: false,
            speed: Speed::Medium,
            slew_rate: SlewRate::Slow,
            drive_strength: Some(40),
        }
    }
}

impl Default for PadProfile {
    fn default() -> Self {
        Self::pulled_up_input()
    }
}

/// Pin multiplexing of the timer's capture inputs.
pub trait CapturePad {
    /// Connect the pin dedicated to `channel` to the timer's capture
    /// function and apply `profile` on it.
    fn route_to_capture(&mut self, channel: Channel, profile: &PadProfile);
}
