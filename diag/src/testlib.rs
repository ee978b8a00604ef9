//! Simulated collaborators to exercise the diagnostics on the host.
//!
//! The simulated timer delivers interrupts synchronously: whenever the
//! foreground parks in `wait_for_interrupt`, the next hardware occurrence
//! is raised and the installed routine is serviced right away.

use core::cell::Cell;
use core::fmt;
use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::serial::Read;

use crate::clock::{ClockSource, Clocks};
use crate::events::{Events, TestMode};
use crate::gpt::{
    CaptureEdge, Channel, Channels, CounterMode, Gpt, GptConfig, GptEvents, OutputAction,
};
use crate::pad::{CapturePad, PadProfile};

/// Pending status of the simulated timer.
#[derive(Debug, Default)]
pub struct SimStatus {
    compare: Cell<Channels>,
    capture: Cell<[Option<u32>; 2]>,
    rollover: Cell<bool>,
}

impl SimStatus {
    pub fn raise_compare(&self, channels: Channels) {
        self.compare.set(self.compare.get() | channels);
    }

    pub fn raise_capture(&self, channel: Channel, counter: u32) {
        if let Some(i) = capture_index(channel) {
            let mut capture = self.capture.get();
            capture[i] = Some(counter);
            self.capture.set(capture);
        }
    }

    pub fn raise_rollover(&self) {
        self.rollover.set(true);
    }

    pub fn compare_pending(&self) -> Channels {
        self.compare.get()
    }

    pub fn capture_pending(&self, channel: Channel) -> bool {
        capture_index(channel).map_or(false, |i| self.capture.get()[i].is_some())
    }

    pub fn rollover_pending(&self) -> bool {
        self.rollover.get()
    }
}

impl GptEvents for SimStatus {
    fn take_compare_events(&self, channels: Channels) -> Channels {
        let pending = self.compare.get();
        let fired = pending.intersection(channels);
        self.compare
            .set(Channels::from_bits_truncate(pending.bits() & !fired.bits()));
        fired
    }

    fn take_capture_event(&self, channel: Channel) -> Option<u32> {
        let i = capture_index(channel)?;
        let mut capture = self.capture.get();
        let counter = capture[i].take();
        self.capture.set(capture);
        counter
    }

    fn take_rollover_event(&self) -> bool {
        self.rollover.replace(false)
    }
}

fn capture_index(channel: Channel) -> Option<usize> {
    match channel {
        Channel::InputCapture1 => Some(0),
        Channel::InputCapture2 => Some(1),
        _ => None,
    }
}

/// Something the simulated hardware does between two waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    Compare(Channels),
    Capture(Channel, u32),
    Rollover,
    /// Interrupt without any pending status.
    Spurious,
}

impl Occurrence {
    fn channels(self) -> Channels {
        match self {
            Self::Compare(channels) => channels,
            Self::Capture(channel, _) => channel.mask(),
            Self::Rollover => Channel::Rollover.mask(),
            Self::Spurious => Channels::ALL,
        }
    }
}

/// Calls affecting interrupt delivery, in the order they were made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    SetupInterrupt(TestMode, bool),
    CounterEnable(Channels),
    CounterDisable,
}

/// Simulated timer recording everything the diagnostics asked of it.
pub struct SimGpt<'a> {
    events: &'a Events,
    pub status: SimStatus,
    pub inits: Vec<GptConfig>,
    pub compares: Vec<(Channel, OutputAction, u32)>,
    pub captures: Vec<(Channel, CaptureEdge)>,
    pub modes: Vec<TestMode>,
    pub enabled: Option<Channels>,
    pub enables: Vec<Channels>,
    pub disables: usize,
    pub interrupts: usize,
    pub calls: Vec<Call>,
    mode: TestMode,
    interrupt_enabled: bool,
    script: VecDeque<Occurrence>,
    counting: bool,
    counter: u32,
}

impl<'a> SimGpt<'a> {
    /// Timer delivering the given occurrences, one per wait.
    pub fn scripted(events: &'a Events, script: impl IntoIterator<Item = Occurrence>) -> Self {
        Self {
            events,
            status: SimStatus::default(),
            inits: Vec::new(),
            compares: Vec::new(),
            captures: Vec::new(),
            modes: Vec::new(),
            enabled: None,
            enables: Vec::new(),
            disables: 0,
            interrupts: 0,
            calls: Vec::new(),
            mode: TestMode::Idle,
            interrupt_enabled: false,
            script: script.into_iter().collect(),
            counting: false,
            counter: 0,
        }
    }

    /// Timer advancing its counter from one programmed compare value to
    /// the next, once the script is exhausted.
    pub fn counting(events: &'a Events) -> Self {
        let mut gpt = Self::scripted(events, core::iter::empty());
        gpt.counting = true;
        gpt
    }

    pub fn remaining_script(&self) -> usize {
        self.script.len()
    }

    /// Index of the first recorded `call`.
    ///
    /// # Panics
    ///
    /// Panics if `call` was never made.
    pub fn position_of(&self, call: Call) -> usize {
        self.calls
            .iter()
            .position(|c| *c == call)
            .unwrap_or_else(|| panic!("{call:?} was never called: {:?}", self.calls))
    }

    fn next_from_counter(&mut self) -> Occurrence {
        let next = self
            .compares
            .iter()
            .map(|(_, _, ticks)| *ticks)
            .filter(|ticks| *ticks > self.counter)
            .min();
        let Some(ticks) = next else {
            self.counter = 0;
            return Occurrence::Rollover;
        };

        let fired = self
            .compares
            .iter()
            .filter(|(_, _, t)| *t == ticks)
            .fold(Channels::NONE, |acc, (channel, _, _)| acc | *channel);
        let restart = self
            .inits
            .last()
            .map_or(false, |config| config.mode == CounterMode::Restart);
        self.counter = if restart && fired.contains(Channel::OutputCompare1) {
            0
        } else {
            ticks
        };
        Occurrence::Compare(fired)
    }
}

impl Gpt for SimGpt<'_> {
    fn init(&mut self, config: &GptConfig) {
        self.inits.push(*config);
        self.compares.clear();
        self.captures.clear();
        self.enabled = None;
        self.counter = 0;
    }

    fn setup_interrupt(&mut self, mode: TestMode, enable: bool) {
        self.modes.push(mode);
        self.calls.push(Call::SetupInterrupt(mode, enable));
        self.mode = mode;
        self.interrupt_enabled = enable;
    }

    fn set_compare_event(&mut self, channel: Channel, action: OutputAction, ticks: u32) {
        self.compares.retain(|(c, _, _)| *c != channel);
        self.compares.push((channel, action, ticks));
    }

    fn set_capture_event(&mut self, channel: Channel, edge: CaptureEdge) {
        self.captures.push((channel, edge));
    }

    fn counter_enable(&mut self, interrupts: Channels) {
        self.enabled = Some(interrupts);
        self.enables.push(interrupts);
        self.calls.push(Call::CounterEnable(interrupts));
    }

    fn counter_disable(&mut self) {
        self.enabled = None;
        self.disables += 1;
        self.calls.push(Call::CounterDisable);
    }

    fn wait_for_interrupt(&mut self) {
        let occurrence = match self.script.pop_front() {
            Some(occurrence) => occurrence,
            None if self.counting => self.next_from_counter(),
            None => panic!("simulated timer ran out of events"),
        };
        match occurrence {
            Occurrence::Compare(channels) => self.status.raise_compare(channels),
            Occurrence::Capture(channel, counter) => self.status.raise_capture(channel, counter),
            Occurrence::Rollover => self.status.raise_rollover(),
            Occurrence::Spurious => (),
        }

        let unmasked = self
            .enabled
            .map_or(false, |enabled| !enabled.intersection(occurrence.channels()).is_empty());
        if self.interrupt_enabled && unmasked {
            self.interrupts += 1;
            self.events.service(self.mode, &self.status);
        }
    }
}

/// Clocks running at a fixed frequency, no matter the source.
#[derive(Debug)]
pub struct SimClocks {
    pub hz: u32,
    pub queried: Cell<Option<ClockSource>>,
}

impl SimClocks {
    pub fn new(hz: u32) -> Self {
        Self {
            hz,
            queried: Cell::new(None),
        }
    }
}

impl Clocks for SimClocks {
    fn frequency(&self, source: ClockSource) -> u32 {
        self.queried.set(Some(source));
        self.hz
    }
}

#[derive(Debug, Default)]
pub struct SimPad {
    pub routed: Vec<(Channel, PadProfile)>,
}

impl CapturePad for SimPad {
    fn route_to_capture(&mut self, channel: Channel, profile: &PadProfile) {
        self.routed.push((channel, *profile));
    }
}

#[derive(Debug, Default)]
pub struct SimDelay {
    pub calls: usize,
    pub total_us: u64,
}

impl DelayUs<u32> for SimDelay {
    fn delay_us(&mut self, us: u32) {
        self.calls += 1;
        self.total_us += u64::from(us);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimReadError;

/// Console fed from a script of reads. `None` stands for "nothing typed yet".
#[derive(Debug, Default)]
pub struct SimConsole {
    input: VecDeque<Option<u8>>,
    fail_next: bool,
    lines_until_failure: Option<usize>,
    pub output: String,
}

impl SimConsole {
    pub fn with_input(input: impl IntoIterator<Item = Option<u8>>) -> Self {
        Self {
            input: input.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_keys(keys: &[u8]) -> Self {
        Self::with_input(keys.iter().map(|key| Some(*key)))
    }

    /// Console accepting `lines` lines of output, failing afterwards.
    pub fn failing_after_lines(lines: usize) -> Self {
        Self {
            lines_until_failure: Some(lines),
            ..Self::default()
        }
    }

    pub fn fail_next_read(&mut self) {
        self.fail_next = true;
    }

    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }

    pub fn lines_containing<'s>(&'s self, pattern: &'s str) -> impl Iterator<Item = &'s str> {
        self.output.lines().filter(move |line| line.contains(pattern))
    }
}

impl Read<u8> for SimConsole {
    type Error = SimReadError;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        if self.fail_next {
            self.fail_next = false;
            return Err(nb::Error::Other(SimReadError));
        }
        match self.input.pop_front() {
            Some(Some(byte)) => Ok(byte),
            Some(None) => Err(nb::Error::WouldBlock),
            None => panic!("console ran out of input"),
        }
    }
}

impl fmt::Write for SimConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(lines) = self.lines_until_failure {
            if self.output.matches('\n').count() >= lines {
                return Err(fmt::Error);
            }
        }
        self.output.push_str(s);
        Ok(())
    }
}
