//! Interactive menu dispatching the timer diagnostics.

use core::fmt::{self, Write};

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::serial::Read;

use crate::capture::{self, CaptureOutcome};
use crate::clock::Clocks;
use crate::compare::{self, CompareReport};
use crate::configuration::Configuration;
use crate::console::read_char;
use crate::events::Events;
use crate::gpt::Gpt;
use crate::log;
use crate::menu::{print_banner, print_options, Selection};
use crate::pad::CapturePad;

/// Collaborators the diagnostics run on.
pub struct Peripherals<G, C, P, D, S> {
    pub gpt: G,
    pub clocks: C,
    pub pad: P,
    pub delay: D,
    pub console: S,
}

/// Owner of the timer for the whole session. Only one test runs at a time,
/// each leaves the counter disabled before returning.
pub struct Diagnostics<'a, G, C, P, D, S> {
    peripherals: Peripherals<G, C, P, D, S>,
    events: &'a Events,
    configuration: Configuration,
}

impl<'a, G, C, P, D, S> Diagnostics<'a, G, C, P, D, S>
where
    G: Gpt,
    C: Clocks,
    P: CapturePad,
    D: DelayUs<u32>,
    S: Read<u8> + Write,
{
    /// `events` must be the same flags the timer interrupt services.
    pub fn new(
        peripherals: Peripherals<G, C, P, D, S>,
        events: &'a Events,
        configuration: Configuration,
    ) -> Self {
        Self {
            peripherals,
            events,
            configuration,
        }
    }

    /// Serve the menu until the operator exits.
    ///
    /// Keys other than `1`, `2` and `x` just print the menu again.
    ///
    /// # Errors
    ///
    /// Fails only if writing to the console fails.
    pub fn run(&mut self) -> fmt::Result {
        print_banner(&mut self.peripherals.console)?;

        loop {
            print_options(&mut self.peripherals.console)?;

            let key = read_char(&mut self.peripherals.console);
            match Selection::from_key(key) {
                Some(Selection::OutputCompare) => {
                    log::info!("Selected output compare test");
                    self.output_compare()?;
                }
                Some(Selection::InputCapture) => {
                    log::info!("Selected input capture test");
                    self.input_capture()?;
                }
                Some(Selection::Exit) => {
                    writeln!(self.peripherals.console)?;
                    writeln!(self.peripherals.console, "Test exit.")?;
                    log::info!("Exiting diagnostics");
                    return Ok(());
                }
                None => {
                    log::debug!("Ignoring key {=u8}", key);
                }
            }
        }
    }

    /// # Errors
    ///
    /// Fails only if writing to the console fails.
    pub fn output_compare(&mut self) -> Result<CompareReport, fmt::Error> {
        let p = &mut self.peripherals;
        compare::run(
            &mut p.gpt,
            &p.clocks,
            &mut p.console,
            self.events,
            &self.configuration,
        )
    }

    /// # Errors
    ///
    /// Fails only if writing to the console fails.
    pub fn input_capture(&mut self) -> Result<CaptureOutcome, fmt::Error> {
        let p = &mut self.peripherals;
        capture::run(
            &mut p.gpt,
            &p.clocks,
            &mut p.pad,
            &mut p.delay,
            &mut p.console,
            self.events,
            &self.configuration,
        )
    }

    /// Console the menu talks to, available between tests.
    pub fn console(&mut self) -> &mut S {
        &mut self.peripherals.console
    }

    /// Give the collaborators back.
    pub fn release(self) -> Peripherals<G, C, P, D, S> {
        self.peripherals
    }
}
