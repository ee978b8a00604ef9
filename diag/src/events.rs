//! Hand-over of timer events from interrupt context to the foreground.
//!
//! The interrupt routine is the only writer of the flags, it latches events
//! and never clears them. The foreground is the only one resetting them,
//! which it does between observations. Multiple events arriving between two
//! observations collapse into one.
//!
//! ```text
//!   [ TIM interrupt ] --service--> {Events} <--wait/reset-- [ foreground ]
//!          |                                                       |
//!    {ArmedMode} <---------------setup_interrupt------------------+
//! ```

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::gpt::{Channel, Channels, Gpt, GptEvents};

/// Test whose events the interrupt routine decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TestMode {
    /// Nothing is decoded, pending events are left in the driver.
    #[default]
    Idle,
    OutputCompare,
    /// Capture events of the given channel plus rollovers are decoded.
    InputCapture(Channel),
}

impl TestMode {
    const CHANNELS: [Channel; 6] = [
        Channel::OutputCompare1,
        Channel::OutputCompare2,
        Channel::OutputCompare3,
        Channel::InputCapture1,
        Channel::InputCapture2,
        Channel::Rollover,
    ];

    const fn to_bits(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::OutputCompare => 1,
            Self::InputCapture(channel) => 2 + channel as u8,
        }
    }

    const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::OutputCompare,
            2..=7 => Self::InputCapture(Self::CHANNELS[(bits - 2) as usize]),
            _ => Self::Idle,
        }
    }
}

/// Lock-free slot holding the mode the interrupt routine was installed with.
///
/// Drivers keep it where their interrupt handler can reach it, typically in
/// a `static`.
#[derive(Debug, Default)]
pub struct ArmedMode(AtomicU8);

impl ArmedMode {
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    pub fn arm(&self, mode: TestMode) {
        self.0.store(mode.to_bits(), Ordering::Release);
    }

    pub fn disarm(&self) {
        self.arm(TestMode::Idle);
    }

    #[must_use]
    pub fn get(&self) -> TestMode {
        TestMode::from_bits(self.0.load(Ordering::Acquire))
    }
}

/// Event flags shared between the interrupt routine and the foreground.
#[derive(Debug, Default)]
pub struct Events {
    compare: AtomicU8,
    capture: AtomicBool,
    rollover: AtomicBool,
    counter: AtomicU32,
}

impl Events {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            compare: AtomicU8::new(0),
            capture: AtomicBool::new(false),
            rollover: AtomicBool::new(false),
            counter: AtomicU32::new(0),
        }
    }

    /// The interrupt routine.
    ///
    /// Queries the driver for the events relevant to `mode` and latches
    /// them. Runs in interrupt context, it never blocks.
    pub fn service<E: GptEvents + ?Sized>(&self, mode: TestMode, gpt: &E) {
        match mode {
            TestMode::Idle => (),
            TestMode::OutputCompare => {
                let fired = gpt.take_compare_events(Channels::OUTPUT_COMPARES);
                if !fired.is_empty() {
                    self.compare.fetch_or(fired.bits(), Ordering::Release);
                }
            }
            TestMode::InputCapture(channel) => {
                if let Some(counter) = gpt.take_capture_event(channel) {
                    // Must be visible before the flag is.
                    self.counter.store(counter, Ordering::Relaxed);
                    self.capture.store(true, Ordering::Release);
                }
                if gpt.take_rollover_event() {
                    self.rollover.store(true, Ordering::Release);
                }
            }
        }
    }

    /// Clear every flag. Call before arming the interrupt.
    pub fn reset(&self) {
        self.reset_compare();
        self.reset_capture();
        self.reset_rollover();
        self.counter.store(0, Ordering::Relaxed);
    }

    pub fn reset_compare(&self) {
        self.compare.store(0, Ordering::Release);
    }

    pub fn reset_capture(&self) {
        self.capture.store(false, Ordering::Release);
    }

    pub fn reset_rollover(&self) {
        self.rollover.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn compare(&self) -> Channels {
        Channels::from_bits_truncate(self.compare.load(Ordering::Acquire))
    }

    /// Counter value latched by the last capture, if there was one since
    /// the last reset.
    #[must_use]
    pub fn capture(&self) -> Option<u32> {
        if self.capture.load(Ordering::Acquire) {
            Some(self.counter.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    #[must_use]
    pub fn rollover(&self) -> bool {
        self.rollover.load(Ordering::Acquire)
    }
}

/// Park the foreground until `poll` observes something.
pub(crate) fn wait_until<G, T>(gpt: &mut G, mut poll: impl FnMut() -> Option<T>) -> T
where
    G: Gpt + ?Sized,
{
    loop {
        if let Some(observed) = poll() {
            return observed;
        }
        gpt.wait_for_interrupt();
    }
}
