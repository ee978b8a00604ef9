//! TIM2 playing the role of the general purpose timer.
//!
//! TIM2 is the 32-bit general purpose timer of STM32H7. Its capture/compare
//! channels 1 to 3 serve as compare channels, channels 1 and 2 also serve as
//! capture inputs and the update event signals a rollover. Compare and
//! capture on the same channel are mutually exclusive, which is fine as
//! every test uses only one of them.
//!
//! Restarting on compare 1 is done by loading the auto-reload register with
//! the value of compare 1.

use cortex_m::peripheral::NVIC;
use gpt_diag::gpt::{
    CaptureEdge, Channel, Channels, CounterMode, Gpt, GptConfig, GptEvents, LowPower,
    OutputAction,
};
use gpt_diag::{ArmedMode, TestMode};

use crate::system::hal::pac;
use crate::system::hal::rcc::{rec, ResetEnable};

const SR_UIF: u32 = 1 << 0;
const SR_CC1IF: u32 = 1 << 1;
const SR_CC2IF: u32 = 1 << 2;
const SR_CC3IF: u32 = 1 << 3;

const CR1_CEN: u32 = 1 << 0;
const EGR_UG: u32 = 1 << 0;

pub struct Tim2 {
    tim: pac::TIM2,
    armed: &'static ArmedMode,
    mode: CounterMode,
}

impl Tim2 {
    #[must_use]
    pub fn new(tim: pac::TIM2, prec: rec::Tim2, armed: &'static ArmedMode) -> Self {
        prec.enable().reset();
        Self {
            tim,
            armed,
            mode: CounterMode::FreeRun,
        }
    }

    fn set_auto_reload(&mut self, ticks: u32) {
        self.tim.arr.write(|w| unsafe { w.bits(ticks) });
    }
}

impl Gpt for Tim2 {
    fn init(&mut self, config: &GptConfig) {
        self.tim.cr1.write(|w| unsafe { w.bits(0) });
        self.tim.dier.write(|w| unsafe { w.bits(0) });
        self.tim.ccer.write(|w| unsafe { w.bits(0) });
        self.tim.ccmr1_output().write(|w| unsafe { w.bits(0) });
        self.tim.ccmr2_output().write(|w| unsafe { w.bits(0) });
        self.tim.cnt.write(|w| unsafe { w.bits(0) });

        let prescaler = config.divider.saturating_sub(1);
        if prescaler > u32::from(u16::MAX) {
            defmt::warn!("Divider {} out of range, clamping", config.divider);
        }
        let prescaler = prescaler.min(u32::from(u16::MAX));
        self.tim.psc.write(|w| unsafe { w.bits(prescaler) });

        self.mode = config.mode;
        self.set_auto_reload(u32::MAX);

        // Load the prescaler now instead of on the first rollover.
        self.tim.egr.write(|w| unsafe { w.bits(EGR_UG) });
        self.tim.sr.write(|w| unsafe { w.bits(0) });

        if config.low_power.contains(LowPower::STOP) {
            // TIM2 sits in D2 domain which stops its clocks in Stop mode.
            defmt::debug!("TIM2 does not count in Stop mode");
        }
        defmt::debug!(
            "TIM2 initialized: prescaler={} mode={}",
            prescaler,
            config.mode
        );
    }

    fn setup_interrupt(&mut self, mode: TestMode, enable: bool) {
        if enable {
            self.armed.arm(mode);
            unsafe { NVIC::unmask(pac::Interrupt::TIM2) };
        } else {
            NVIC::mask(pac::Interrupt::TIM2);
            self.armed.disarm();
        }
    }

    fn set_compare_event(&mut self, channel: Channel, action: OutputAction, ticks: u32) {
        let Some(index) = compare_index(channel) else {
            defmt::warn!("{} is not a compare channel", channel);
            return;
        };

        match index {
            0 => self.tim.ccr1.write(|w| unsafe { w.bits(ticks) }),
            1 => self.tim.ccr2.write(|w| unsafe { w.bits(ticks) }),
            _ => self.tim.ccr3.write(|w| unsafe { w.bits(ticks) }),
        }

        let output_mode = match action {
            OutputAction::Disabled => 0b000,
            OutputAction::Set => 0b001,
            OutputAction::Clear => 0b010,
            OutputAction::Toggle => 0b011,
            OutputAction::ActiveLowPulse => 0b100,
        };
        // CCxS = 00 selects output, OCxM follows it.
        let shift = (index % 2) * 8;
        let clear = 0b111_0011 << shift;
        let set = (output_mode << 4) << shift;
        if index < 2 {
            self.tim
                .ccmr1_output()
                .modify(|r, w| unsafe { w.bits((r.bits() & !clear) | set) });
        } else {
            self.tim
                .ccmr2_output()
                .modify(|r, w| unsafe { w.bits((r.bits() & !clear) | set) });
        }

        let enable = u32::from(action != OutputAction::Disabled) << (index * 4);
        self.tim
            .ccer
            .modify(|r, w| unsafe { w.bits((r.bits() & !(1 << (index * 4))) | enable) });

        if channel == Channel::OutputCompare1 && self.mode == CounterMode::Restart {
            self.set_auto_reload(ticks);
        }
    }

    fn set_capture_event(&mut self, channel: Channel, edge: CaptureEdge) {
        let Some(index) = capture_index(channel) else {
            defmt::warn!("{} is not a capture channel", channel);
            return;
        };

        // CCxS = 01 maps the channel onto its own input, no filter, no
        // prescaler.
        let shift = index * 8;
        self.tim
            .ccmr1_input()
            .modify(|r, w| unsafe { w.bits((r.bits() & !(0xff << shift)) | (0b01 << shift)) });

        let (enable, polarity, negative) = match edge {
            CaptureEdge::Disabled => (0, 0, 0),
            CaptureEdge::Rising => (1, 0, 0),
            CaptureEdge::Falling => (1, 1, 0),
            CaptureEdge::Both => (1, 1, 1),
        };
        let shift = index * 4;
        let bits = (enable | (polarity << 1) | (negative << 3)) << shift;
        self.tim
            .ccer
            .modify(|r, w| unsafe { w.bits((r.bits() & !(0b1011 << shift)) | bits) });
    }

    fn counter_enable(&mut self, interrupts: Channels) {
        self.tim.sr.write(|w| unsafe { w.bits(0) });
        self.tim
            .dier
            .write(|w| unsafe { w.bits(status_bits(interrupts)) });
        self.tim
            .cr1
            .modify(|r, w| unsafe { w.bits(r.bits() | CR1_CEN) });
    }

    fn counter_disable(&mut self) {
        self.tim
            .cr1
            .modify(|r, w| unsafe { w.bits(r.bits() & !CR1_CEN) });
        self.tim.dier.write(|w| unsafe { w.bits(0) });
        self.tim.sr.write(|w| unsafe { w.bits(0) });
    }

    // Busy waiting on purpose. WFI could sleep through an event raised
    // between the last poll and the instruction.
}

/// Status side of TIM2, accessed from its interrupt handler.
pub struct Tim2Events {
    _private: (),
}

impl Tim2Events {
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    fn registers(&self) -> &'static pac::tim2::RegisterBlock {
        // Status flags are read and cleared bit by bit, which does not
        // interfere with the foreground configuring the timer.
        unsafe { &*pac::TIM2::ptr() }
    }

    fn take_status(&self, bits: u32) -> u32 {
        let tim = self.registers();
        let pending = tim.sr.read().bits() & bits;
        if pending != 0 {
            // Flags are cleared by writing 0, ones are ignored.
            tim.sr.write(|w| unsafe { w.bits(!pending) });
        }
        pending
    }
}

impl GptEvents for Tim2Events {
    fn take_compare_events(&self, channels: Channels) -> Channels {
        let compares = channels.intersection(Channels::OUTPUT_COMPARES);
        let pending = self.take_status(status_bits(compares));
        [
            Channel::OutputCompare1,
            Channel::OutputCompare2,
            Channel::OutputCompare3,
        ]
        .into_iter()
        .filter(|channel| compares.contains(*channel))
        .filter(|channel| pending & status_bits(channel.mask()) != 0)
        .fold(Channels::NONE, |acc, channel| acc | channel)
    }

    fn take_capture_event(&self, channel: Channel) -> Option<u32> {
        let index = capture_index(channel)?;
        if self.take_status(status_bits(channel.mask())) == 0 {
            return None;
        }
        let tim = self.registers();
        let counter = match index {
            0 => tim.ccr1.read().bits(),
            _ => tim.ccr2.read().bits(),
        };
        Some(counter)
    }

    fn take_rollover_event(&self) -> bool {
        self.take_status(SR_UIF) != 0
    }
}

fn compare_index(channel: Channel) -> Option<u32> {
    match channel {
        Channel::OutputCompare1 => Some(0),
        Channel::OutputCompare2 => Some(1),
        Channel::OutputCompare3 => Some(2),
        _ => None,
    }
}

fn capture_index(channel: Channel) -> Option<u32> {
    match channel {
        Channel::InputCapture1 => Some(0),
        Channel::InputCapture2 => Some(1),
        _ => None,
    }
}

/// Translate channels to TIM2 status and interrupt enable bits.
fn status_bits(channels: Channels) -> u32 {
    [
        (Channel::OutputCompare1, SR_CC1IF),
        (Channel::OutputCompare2, SR_CC2IF),
        (Channel::OutputCompare3, SR_CC3IF),
        (Channel::InputCapture1, SR_CC1IF),
        (Channel::InputCapture2, SR_CC2IF),
        (Channel::Rollover, SR_UIF),
    ]
    .into_iter()
    .filter(|(channel, _)| channels.contains(*channel))
    .fold(0, |acc, (_, bit)| acc | bit)
}
