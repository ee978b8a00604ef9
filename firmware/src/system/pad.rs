//! Capture inputs of TIM2 on port A.
//!
//! Channel 1 sits on PA0 and channel 2 on PA1, both on alternate function 1.
//! On Patch SM, PA1 is exposed as pin A8 of the header. Pull it to ground to
//! trigger a capture.

use gpt_diag::gpt::Channel;
use gpt_diag::pad::{CapturePad, PadProfile, Pull, Speed};

use crate::system::hal::gpio;
use crate::system::hal::pac;

const ALTERNATE_TIM2: u32 = 1;

pub struct Pads {
    _pa0: gpio::gpioa::PA0,
    _pa1: gpio::gpioa::PA1,
}

impl Pads {
    /// Both pins are owned so nothing else can reconfigure them.
    pub fn new(pa0: gpio::gpioa::PA0, pa1: gpio::gpioa::PA1) -> Self {
        Self {
            _pa0: pa0,
            _pa1: pa1,
        }
    }
}

impl CapturePad for Pads {
    fn route_to_capture(&mut self, channel: Channel, profile: &PadProfile) {
        let pin = match channel {
            Channel::InputCapture1 => 0,
            Channel::InputCapture2 => 1,
            _ => {
                defmt::warn!("{} has no capture pin", channel);
                return;
            }
        };

        let pull = match profile.pull {
            Pull::None => 0b00,
            Pull::Up22K | Pull::Up47K | Pull::Up100K => 0b01,
            Pull::Down100K => 0b10,
            Pull::Keeper => {
                defmt::warn!("Keeper is not available, leaving the pin floating");
                0b00
            }
        };
        let speed = match profile.speed {
            Speed::Low => 0b00,
            Speed::Medium => 0b01,
            Speed::High => 0b10,
        };
        // Hysteresis, slew rate and drive strength have no counterpart on
        // this port. Inputs are always Schmitt triggered.
        defmt::debug!("Routing {} to PA{}: {}", channel, pin, profile);

        // Both pins are owned by this struct, other bits are left untouched.
        let gpioa = unsafe { &*pac::GPIOA::ptr() };
        let shift = pin * 2;
        gpioa
            .pupdr
            .modify(|r, w| unsafe { w.bits((r.bits() & !(0b11 << shift)) | (pull << shift)) });
        gpioa
            .ospeedr
            .modify(|r, w| unsafe { w.bits((r.bits() & !(0b11 << shift)) | (speed << shift)) });
        gpioa.otyper.modify(|r, w| unsafe {
            w.bits((r.bits() & !(1 << pin)) | (u32::from(profile.open_drain) << pin))
        });
        let shift = pin * 4;
        gpioa.afrl.modify(|r, w| unsafe {
            w.bits((r.bits() & !(0b1111 << shift)) | (ALTERNATE_TIM2 << shift))
        });
        let shift = pin * 2;
        gpioa
            .moder
            .modify(|r, w| unsafe { w.bits((r.bits() & !(0b11 << shift)) | (0b10 << shift)) });
    }
}
