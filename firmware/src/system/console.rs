//! Serial console on USART1.
//!
//! On Patch SM the USART1 pins are PB6 (TX) and PB7 (RX), exposed on the
//! header as B5 and B6.

use core::fmt;

use embedded_hal::serial;

use crate::system::hal::pac::USART1;
use crate::system::hal::serial::{Error, Rx, Tx};

pub struct Console {
    tx: Tx<USART1>,
    rx: Rx<USART1>,
}

impl Console {
    pub fn new(tx: Tx<USART1>, rx: Rx<USART1>) -> Self {
        Self { tx, rx }
    }

    fn write_byte(&mut self, byte: u8) -> fmt::Result {
        nb::block!(serial::Write::write(&mut self.tx, byte)).map_err(|_| fmt::Error)
    }
}

impl serial::Read<u8> for Console {
    type Error = Error;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        serial::Read::read(&mut self.rx)
    }
}

impl fmt::Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            // Terminals expect carriage return before each new line.
            if byte == b'\n' {
                self.write_byte(b'\r')?;
            }
            self.write_byte(byte)?;
        }
        Ok(())
    }
}
