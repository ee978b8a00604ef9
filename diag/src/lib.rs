//! Interactive diagnostics of a General Purpose Timer.
//!
//! An operator picks a test over a serial console. The output compare test
//! counts compare events of three channels, the input capture test measures
//! time until an input pin is pulled low. Both are built on top of a timer
//! driver described by the [`gpt`] traits, so they can run on any board
//! binding those, or on a simulation.
//!
//! The foreground and the timer interrupt communicate only through
//! [`Events`]:
//!
//! ```text
//!    [ Console ] --key--> [ Diagnostics menu ]
//!                                |
//!                  +-------------+-------------+
//!                  |                           |
//!          [ Output compare ]          [ Input capture ] <-- {CapturePad}
//!                  |       A                   A      |
//!      (configure) |       | (poll)     (poll) |      | (configure)
//!                  V       |                   |      V
//!               {Gpt}   {Events} <--------- {Events}  {Gpt}
//!                            A
//!                            | (latch)
//!                  [ Timer interrupt ] <-- {GptEvents}
//! ```

#![cfg_attr(not(test), no_std)]
#![allow(clippy::module_name_repetitions)]

mod log;

pub mod capture;
pub mod clock;
pub mod compare;
pub mod configuration;
pub mod console;
pub mod diagnostics;
pub mod events;
pub mod gpt;
pub mod menu;
pub mod pad;

#[cfg(test)]
mod testlib;

pub use capture::CaptureOutcome;
pub use compare::CompareReport;
pub use configuration::Configuration;
pub use diagnostics::{Diagnostics, Peripherals};
pub use events::{ArmedMode, Events, TestMode};
