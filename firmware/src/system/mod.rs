mod clocks;
mod console;
mod gpt;
mod pad;

pub use daisy::hal;

use gpt_diag::{Configuration, Diagnostics, Peripherals};
use hal::delay::DelayFromCountDownTimer;
use hal::pac::CorePeripherals;
use hal::pac::Peripherals as DevicePeripherals;
use hal::prelude::*;

pub use clocks::Clocks;
pub use console::Console;
pub use gpt::{Tim2, Tim2Events};
pub use pad::Pads;

pub type Delay = DelayFromCountDownTimer<hal::timer::Timer<hal::pac::TIM3>>;

pub type BoardPeripherals = Peripherals<Tim2, Clocks, Pads, Delay, Console>;

/// Diagnostics session running on the board.
pub type Session = Diagnostics<'static, Tim2, Clocks, Pads, Delay, Console>;

pub struct System {
    pub peripherals: BoardPeripherals,
}

impl System {
    /// Initialize system abstraction
    ///
    /// # Panics
    ///
    /// The system can be initialized only once. It panics otherwise.
    #[must_use]
    pub fn init(mut cp: CorePeripherals, dp: DevicePeripherals) -> Self {
        enable_cache(&mut cp);

        let board = daisy::Board::take().unwrap();
        let ccdr = daisy::board_freeze_clocks!(board, dp);

        let gpioa = dp.GPIOA.split(ccdr.peripheral.GPIOA);
        let gpiob = dp.GPIOB.split(ccdr.peripheral.GPIOB);

        let console = {
            let tx = gpiob.pb6.into_alternate::<7>();
            let rx = gpiob.pb7.into_alternate::<7>();
            let serial = dp
                .USART1
                .serial((tx, rx), 115_200.bps(), ccdr.peripheral.USART1, &ccdr.clocks)
                .unwrap();
            let (tx, rx) = serial.split();
            Console::new(tx, rx)
        };

        let delay = DelayFromCountDownTimer::new(dp.TIM3.timer(
            100.Hz(),
            ccdr.peripheral.TIM3,
            &ccdr.clocks,
        ));

        let gpt = Tim2::new(dp.TIM2, ccdr.peripheral.TIM2, &crate::ARMED_MODE);
        let pad = Pads::new(gpioa.pa0, gpioa.pa1);
        let clocks = Clocks::new(ccdr.clocks);

        Self {
            peripherals: Peripherals {
                gpt,
                clocks,
                pad,
                delay,
                console,
            },
        }
    }

    /// Bind the peripherals to the flags serviced by the TIM2 interrupt.
    #[must_use]
    pub fn into_session(self) -> Session {
        session(self.peripherals)
    }
}

#[must_use]
pub fn session(peripherals: BoardPeripherals) -> Session {
    Diagnostics::new(peripherals, &crate::EVENTS, Configuration::default())
}

/// Caches keep the busy polling of event flags off the AXI bus.
fn enable_cache(cp: &mut CorePeripherals) {
    cp.SCB.enable_icache();
    cp.SCB.enable_dcache(&mut cp.CPUID);
}
