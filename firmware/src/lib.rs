#![no_main]
#![no_std]

use defmt_rtt as _; // Global logger.
use panic_probe as _;
use stm32h7xx_hal as _; // Readable panic.

use gpt_diag::{ArmedMode, Events};

pub mod system;
pub mod testlib;

/// Flags latched by the TIM2 interrupt, polled by the diagnostics.
pub static EVENTS: Events = Events::new();

/// Test mode TIM2 interrupt was installed for.
pub static ARMED_MODE: ArmedMode = ArmedMode::new();

/// Body of the TIM2 interrupt handler.
pub fn service_tim2() {
    EVENTS.service(ARMED_MODE.get(), &system::Tim2Events::new());
}

// Same panicking *behavior* as `panic-probe` but doesn't print a panic message
// this prevents the panic message being printed *twice* when `defmt::panic` is invoked.
#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}

/// Terminates the application and makes `probe-run` exit with exit-code = 0.
pub fn exit() -> ! {
    loop {
        cortex_m::asm::bkpt();
    }
}
