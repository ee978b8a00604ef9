use gpt_diag::clock::{self, ClockSource};

use crate::system::hal::rcc::CoreClocks;

/// Frequencies frozen during the system initialization.
pub struct Clocks {
    clocks: CoreClocks,
}

impl Clocks {
    pub fn new(clocks: CoreClocks) -> Self {
        Self { clocks }
    }
}

impl clock::Clocks for Clocks {
    fn frequency(&self, source: ClockSource) -> u32 {
        let hz = match source {
            // TIM2 counts on the APB1 timer kernel clock.
            ClockSource::Peripheral => Some(self.clocks.timx_ker_ck()),
            ClockSource::HighFrequency => self.clocks.per_ck(),
            ClockSource::LowFrequency => return 32_768,
            ClockSource::Crystal => self.clocks.hse_ck(),
        };
        hz.map_or(0, |hz: fugit::HertzU32| hz.raw())
    }
}
