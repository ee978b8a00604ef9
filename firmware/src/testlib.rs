use embedded_hal::serial::Read;
use gpt_diag::console::read_char;

use crate::system::{self, BoardPeripherals, Session};

/// Block until the operator answers `y` or `n` on the console.
pub fn confirm<S: Read<u8>>(console: &mut S) -> bool {
    loop {
        match read_char(console) {
            b'y' | b'Y' => return true,
            b'n' | b'N' => return false,
            _ => (),
        }
    }
}

/// Run `f` on a fresh session and take the peripherals back afterwards.
///
/// # Panics
///
/// Panics if the peripherals were lost by a previous panicking call.
pub fn with_session<T>(
    peripherals: &mut Option<BoardPeripherals>,
    f: impl FnOnce(&mut Session) -> T,
) -> T {
    let mut session = system::session(peripherals.take().unwrap());
    let result = f(&mut session);
    *peripherals = Some(session.release());
    result
}
