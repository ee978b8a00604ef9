//! Operator console on top of a serial port.

use embedded_hal::serial::Read;

use crate::log;

/// Block until a character arrives.
///
/// `WouldBlock` is the "no character available" sentinel and is retried.
/// Read errors such as framing or overrun are logged and retried too, the
/// operator simply types again.
pub fn read_char<S: Read<u8>>(serial: &mut S) -> u8 {
    loop {
        match serial.read() {
            Ok(byte) => return byte,
            Err(nb::Error::WouldBlock) => core::hint::spin_loop(),
            Err(nb::Error::Other(_)) => {
                log::warning!("Console read failed, retrying");
            }
        }
    }
}
