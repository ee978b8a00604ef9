//! Input capture diagnostic.
//!
//! Routes the capture input to its pin and waits for the operator to pull
//! it low. The counter value latched on the edge, together with the number
//! of rollovers seen in the meantime, tells how long it took since the test
//! started.

use core::fmt::{self, Write};

use embedded_hal::blocking::delay::DelayUs;

use crate::clock::{divider_for, Clocks};
use crate::configuration::Configuration;
use crate::events::{wait_until, Events, TestMode};
use crate::gpt::{Channel, Gpt, GptConfig};
use crate::log;
use crate::pad::CapturePad;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureOutcome {
    Captured {
        counter: u32,
        rollovers: u32,
        seconds: u64,
    },
    /// Configured number of rollovers passed without any edge.
    TimedOut { rollovers: u32 },
}

impl CaptureOutcome {
    #[must_use]
    pub fn is_captured(&self) -> bool {
        matches!(self, Self::Captured { .. })
    }
}

/// Seconds elapsed since the counter started, given the value latched on
/// capture and the number of rollovers before it.
///
/// Integer division all the way, matching what the console prints. Zero
/// frequency yields zero.
#[must_use]
pub fn elapsed_seconds(counter: u32, rollovers: u32, frequency: u32) -> u64 {
    if frequency == 0 {
        return 0;
    }
    let frequency = u64::from(frequency);
    let per_rollover = (1_u64 << 32) / frequency;
    u64::from(counter) / frequency + u64::from(rollovers) * per_rollover
}

/// Run the input capture diagnostic until an edge is captured or the
/// rollover timeout passes.
///
/// # Errors
///
/// Fails only if writing to the console fails. The counter is disabled
/// either way.
pub fn run<G, C, P, D, W>(
    gpt: &mut G,
    clocks: &C,
    pad: &mut P,
    delay: &mut D,
    console: &mut W,
    events: &Events,
    configuration: &Configuration,
) -> Result<CaptureOutcome, fmt::Error>
where
    G: Gpt,
    C: Clocks,
    P: CapturePad,
    D: DelayUs<u32>,
    W: Write,
{
    let capture = &configuration.capture;

    writeln!(
        console,
        "The GPT is programmed to generate an interrupt once a capture event occurred."
    )?;
    writeln!(console, "Please pull the capture input low to generate an event.")?;
    writeln!(
        console,
        "The test exits after a capture event or a timeout of {} rollovers.",
        capture.rollover_timeout
    )?;

    pad.route_to_capture(capture.channel, &capture.pad);

    let source_hz = clocks.frequency(configuration.clock_source);
    let divider = divider_for(source_hz, configuration.tick_hz);
    let tick_hz = source_hz / divider;
    gpt.init(&GptConfig {
        source: configuration.clock_source,
        divider,
        mode: configuration.counter_mode,
        low_power: configuration.low_power,
    });

    events.reset();
    gpt.setup_interrupt(TestMode::InputCapture(capture.channel), true);
    gpt.set_capture_event(capture.channel, capture.edge);
    gpt.counter_enable(capture.channel.mask() | Channel::Rollover);
    log::info!(
        "Input capture armed: channel={} tick={}Hz timeout={}",
        capture.channel,
        tick_hz,
        capture.rollover_timeout
    );

    let result = observe(gpt, delay, console, events, configuration, tick_hz);

    gpt.counter_disable();
    gpt.setup_interrupt(TestMode::Idle, false);
    log::info!("Input capture finished");

    result
}

fn observe<G, D, W>(
    gpt: &mut G,
    delay: &mut D,
    console: &mut W,
    events: &Events,
    configuration: &Configuration,
    tick_hz: u32,
) -> Result<CaptureOutcome, fmt::Error>
where
    G: Gpt,
    D: DelayUs<u32>,
    W: Write,
{
    let capture = &configuration.capture;
    let mut rollovers = 0;

    while rollovers != capture.rollover_timeout {
        delay.delay_us(capture.pacing_us);
        wait_until(gpt, || {
            (events.capture().is_some() || events.rollover()).then_some(())
        });

        if let Some(counter) = events.capture() {
            events.reset_capture();
            let seconds = elapsed_seconds(counter, rollovers, tick_hz);
            log::info!("Captured counter={} after {} rollovers", counter, rollovers);
            writeln!(console, "Time between start and event = {} seconds", seconds)?;
            return Ok(CaptureOutcome::Captured {
                counter,
                rollovers,
                seconds,
            });
        }

        rollovers += 1;
        writeln!(console, "Rollover occurred {} times!", rollovers)?;
        events.reset_rollover();
    }

    log::warning!("No capture within {} rollovers", rollovers);
    writeln!(console, "No capture event after {} rollovers.", rollovers)?;
    Ok(CaptureOutcome::TimedOut { rollovers })
}
