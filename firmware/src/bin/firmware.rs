#![no_main]
#![no_std]

use gpt_diag_firmware as _; // global logger + panicking-behavior

#[rtic::app(device = stm32h7xx_hal::pac, peripherals = true)]
mod app {
    use gpt_diag_firmware::system::{Session, System};

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        session: Session,
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local, init::Monotonics) {
        defmt::info!("INIT");

        let session = System::init(cx.core, cx.device).into_session();

        (Shared {}, Local { session }, init::Monotonics())
    }

    #[idle(local = [session])]
    fn idle(cx: idle::Context) -> ! {
        if cx.local.session.run().is_err() {
            defmt::error!("Console failed, leaving diagnostics");
        }
        gpt_diag_firmware::exit()
    }

    #[task(binds = TIM2, priority = 2)]
    fn tim2(_: tim2::Context) {
        gpt_diag_firmware::service_tim2();
    }
}
