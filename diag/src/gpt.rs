//! Contract of the General Purpose Timer driver the diagnostics run on.
//!
//! The driver itself lives outside of this crate. Firmware binds it to a
//! real peripheral, tests bind it to a simulation. The split between
//! [`Gpt`] and [`GptEvents`] follows the two contexts the timer is touched
//! from: configuration happens in the foreground, event status is read and
//! cleared from the interrupt handler.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

use crate::clock::ClockSource;
use crate::events::TestMode;

/// A single event source of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    OutputCompare1,
    OutputCompare2,
    OutputCompare3,
    InputCapture1,
    InputCapture2,
    Rollover,
}

impl Channel {
    #[must_use]
    pub const fn mask(self) -> Channels {
        Channels(match self {
            Self::OutputCompare1 => 1 << 0,
            Self::OutputCompare2 => 1 << 1,
            Self::OutputCompare3 => 1 << 2,
            Self::InputCapture1 => 1 << 3,
            Self::InputCapture2 => 1 << 4,
            Self::Rollover => 1 << 5,
        })
    }
}

/// Set of channels, laid out the same way as the GPT status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channels(u8);

impl Channels {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b11_1111);
    pub const OUTPUT_COMPARES: Self = Self(0b111);

    #[must_use]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, channel: Channel) -> bool {
        self.0 & channel.mask().0 != 0
    }

    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

impl From<Channel> for Channels {
    fn from(channel: Channel) -> Self {
        channel.mask()
    }
}

impl BitOr for Channels {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<Channel> for Channels {
    type Output = Self;

    fn bitor(self, rhs: Channel) -> Self {
        self | rhs.mask()
    }
}

impl BitOr for Channel {
    type Output = Channels;

    fn bitor(self, rhs: Self) -> Channels {
        self.mask() | rhs.mask()
    }
}

impl BitOrAssign for Channels {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::LowerHex for Channels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// What happens with the counter once it reaches the value of compare 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CounterMode {
    /// Counter restarts from 0 on compare 1 event.
    Restart,
    /// Counter keeps running until it rolls over.
    FreeRun,
}

/// Low-power modes in which the timer keeps counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LowPower(u8);

impl LowPower {
    pub const NONE: Self = Self(0);
    pub const WAIT: Self = Self(1 << 0);
    pub const STOP: Self = Self(1 << 1);
    pub const DOZE: Self = Self(1 << 2);
    pub const DEBUG: Self = Self(1 << 3);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for LowPower {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Action applied on the output pin of a compare channel once it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputAction {
    /// Interrupt only, the pin is left alone.
    Disabled,
    Toggle,
    Clear,
    Set,
    ActiveLowPulse,
}

/// Input signal transition triggering a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureEdge {
    Disabled,
    Rising,
    Falling,
    Both,
}

/// Arguments of [`Gpt::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GptConfig {
    pub source: ClockSource,
    /// The source clock is divided by this before feeding the counter.
    /// Never 0.
    pub divider: u32,
    pub mode: CounterMode,
    pub low_power: LowPower,
}

/// Foreground side of the timer driver.
///
/// Calls never fail. A driver that cannot honor a request is expected
/// to approximate it and log the difference.
pub trait Gpt {
    /// Reset and configure the peripheral. Counting stays disabled.
    ///
    /// Safe to call repeatedly, each test starts by calling it.
    fn init(&mut self, config: &GptConfig);

    /// Install the shared interrupt routine, serving events for `mode`.
    fn setup_interrupt(&mut self, mode: TestMode, enable: bool);

    /// Arm a compare channel to fire at an absolute counter value.
    fn set_compare_event(&mut self, channel: Channel, action: OutputAction, ticks: u32);

    /// Arm a capture channel.
    fn set_capture_event(&mut self, channel: Channel, edge: CaptureEdge);

    /// Start counting with interrupts of the given channels enabled.
    fn counter_enable(&mut self, interrupts: Channels);

    /// Stop counting and mask all interrupts.
    fn counter_disable(&mut self);

    /// Park the foreground until an interrupt had a chance to run.
    ///
    /// Plain busy waiting is always correct, drivers may sleep instead.
    fn wait_for_interrupt(&mut self) {
        core::hint::spin_loop();
    }
}

/// Interrupt side of the timer driver.
///
/// Every query reads the pending status and clears it. The methods take
/// `&self` as they are issued from interrupt context, concurrently with
/// the foreground holding the [`Gpt`].
pub trait GptEvents {
    /// Return which of `channels` have a pending compare event.
    fn take_compare_events(&self, channels: Channels) -> Channels;

    /// Return the latched counter value if `channel` captured an edge.
    fn take_capture_event(&self, channel: Channel) -> Option<u32>;

    /// Return whether the counter wrapped.
    fn take_rollover_event(&self) -> bool;
}
