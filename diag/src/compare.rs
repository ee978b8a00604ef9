//! Output compare diagnostic.
//!
//! Arms the three compare channels at increasing offsets. Compare 1 holds
//! the largest offset and restarts the counter, so the channels keep firing
//! in a cycle until the configured number of events was observed. The
//! channels drive no pins, only interrupts.
//!
//! A channel that never fires leaves the test waiting forever. The operator
//! is expected to notice and reset the board.

use core::fmt::{self, Write};

use heapless::Vec;

use crate::clock::{divider_for, Clocks};
use crate::configuration::Configuration;
use crate::events::{wait_until, Events, TestMode};
use crate::gpt::{Channels, Gpt, GptConfig};
use crate::log;

/// Number of observed masks kept in the report.
pub const RECORDED_EVENTS: usize = 32;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompareReport {
    pub iterations: u32,
    /// Channels observed in each iteration, the first `RECORDED_EVENTS` of
    /// them.
    pub observed: Vec<Channels, RECORDED_EVENTS>,
}

impl CompareReport {
    fn record(&mut self, fired: Channels) {
        self.iterations += 1;
        // Only the beginning is kept once full.
        let _ = self.observed.push(fired);
    }
}

/// Run the output compare diagnostic until the configured number of compare
/// events was observed.
///
/// # Errors
///
/// Fails only if writing to the console fails. The counter is disabled
/// either way.
pub fn run<G, C, W>(
    gpt: &mut G,
    clocks: &C,
    console: &mut W,
    events: &Events,
    configuration: &Configuration,
) -> Result<CompareReport, fmt::Error>
where
    G: Gpt,
    C: Clocks,
    W: Write,
{
    let compare = &configuration.compare;

    writeln!(
        console,
        "GPT is programmed to generate an interrupt once a compare event occurred."
    )?;
    writeln!(console, "The test exits after {} seconds.", compare.iterations)?;

    let source_hz = clocks.frequency(configuration.clock_source);
    let divider = divider_for(source_hz, configuration.tick_hz);
    gpt.init(&GptConfig {
        source: configuration.clock_source,
        divider,
        mode: configuration.counter_mode,
        low_power: configuration.low_power,
    });

    events.reset();
    gpt.setup_interrupt(TestMode::OutputCompare, true);
    for (channel, ticks) in compare.offsets {
        gpt.set_compare_event(channel, compare.output_action, ticks);
    }
    gpt.counter_enable(compare.channels());
    log::info!(
        "Output compare armed: source={}Hz divider={} iterations={}",
        source_hz,
        divider,
        compare.iterations
    );

    let result = observe(gpt, console, events, compare.iterations);

    gpt.counter_disable();
    gpt.setup_interrupt(TestMode::Idle, false);
    log::info!("Output compare finished");

    result
}

fn observe<G: Gpt, W: Write>(
    gpt: &mut G,
    console: &mut W,
    events: &Events,
    iterations: u32,
) -> Result<CompareReport, fmt::Error> {
    let mut report = CompareReport::default();

    while report.iterations != iterations {
        events.reset_compare();
        let fired = wait_until(gpt, || {
            let fired = events.compare();
            (!fired.is_empty()).then_some(fired)
        });
        report.record(fired);
        log::debug!("Compare event {}: {}", report.iterations, fired);
        writeln!(
            console,
            "Elapsed time {} seconds. Compare events = 0x{:x}",
            report.iterations, fired
        )?;
    }

    Ok(report)
}
