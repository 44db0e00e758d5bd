//! A recording HAL for driver tests.
//!
//! Every pin transition, delay and byte lands in one shared event log, so tests can check the
//! exact line discipline. Bytes are classified as command or data by the level of the
//! data/command line when they are clocked, and clocking a byte while deselected panics.

use core::convert::Infallible;
use std::{cell::RefCell, rc::Rc, vec::Vec};

use embedded_hal::{
    digital::{ErrorType as PinErrorType, OutputPin},
    spi::{Error as SpiErrorTrait, ErrorKind, ErrorType as SpiErrorType},
};
use embedded_hal_async::{delay::DelayNs, spi::SpiBus};

use crate::hw::{CsHw, DcHw, DelayHw, ErrorHw, ResetHw, SpiHw};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Cs(bool),
    Dc(bool),
    Reset(bool),
    DelayMs(u32),
    DelayNs(u32),
    Command(u8),
    Data(u8),
}

#[derive(Debug)]
pub struct Lines {
    pub cs: bool,
    pub dc: bool,
    pub reset: bool,
    pub events: Vec<Event>,
}

impl Lines {
    /// All command-mode bytes, in order.
    pub fn commands(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Command(byte) => Some(*byte),
                _ => None,
            })
            .collect()
    }

    /// All data-mode bytes, in order.
    pub fn data(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Data(byte) => Some(*byte),
                _ => None,
            })
            .collect()
    }
}

pub type SharedLines = Rc<RefCell<Lines>>;

/// The events expected for one command byte.
pub fn bracketed_command(byte: u8) -> [Event; 5] {
    [
        Event::Cs(true),
        Event::Dc(false),
        Event::Cs(false),
        Event::Command(byte),
        Event::Cs(true),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpyError;

impl SpiErrorTrait for SpyError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl From<Infallible> for SpyError {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}

#[derive(Debug, Clone, Copy)]
enum Line {
    Cs,
    Dc,
    Reset,
}

pub struct SpyPin {
    line: Line,
    lines: SharedLines,
}

impl SpyPin {
    fn set(&mut self, level: bool) {
        let mut lines = self.lines.borrow_mut();
        let event = match self.line {
            Line::Cs => {
                lines.cs = level;
                Event::Cs(level)
            }
            Line::Dc => {
                lines.dc = level;
                Event::Dc(level)
            }
            Line::Reset => {
                lines.reset = level;
                Event::Reset(level)
            }
        };
        lines.events.push(event);
    }
}

impl PinErrorType for SpyPin {
    type Error = Infallible;
}

impl OutputPin for SpyPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

pub struct SpyDelay {
    lines: SharedLines,
}

impl DelayNs for SpyDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.lines.borrow_mut().events.push(Event::DelayNs(ns));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.lines.borrow_mut().events.push(Event::DelayMs(ms));
    }
}

pub struct SpySpi {
    lines: SharedLines,
    fail_after: Option<usize>,
}

impl SpySpi {
    /// Lets `writes` more writes through, then fails the next one. Only fails once.
    pub fn fail_after(&mut self, writes: usize) {
        self.fail_after = Some(writes);
    }

    fn record(&mut self, words: &[u8]) -> Result<(), SpyError> {
        match self.fail_after {
            Some(0) => {
                self.fail_after = None;
                return Err(SpyError);
            }
            Some(n) => self.fail_after = Some(n - 1),
            None => {}
        }

        let mut lines = self.lines.borrow_mut();
        assert!(!lines.cs, "byte clocked while chip-select is high");
        for &byte in words {
            let event = if lines.dc {
                Event::Data(byte)
            } else {
                Event::Command(byte)
            };
            lines.events.push(event);
        }
        Ok(())
    }
}

impl SpiErrorType for SpySpi {
    type Error = SpyError;
}

impl SpiBus for SpySpi {
    async fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        words.fill(0);
        Ok(())
    }

    async fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.record(words)
    }

    async fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        read.fill(0);
        self.record(write)
    }

    async fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.record(words)?;
        words.fill(0);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub struct SpyHw {
    cs: SpyPin,
    dc: SpyPin,
    reset: SpyPin,
    delay: SpyDelay,
}

impl ErrorHw for SpyHw {
    type Error = SpyError;
}

impl SpiHw for SpyHw {
    type Spi = SpySpi;
}

impl CsHw for SpyHw {
    type Cs = SpyPin;

    fn cs(&mut self) -> &mut Self::Cs {
        &mut self.cs
    }
}

impl DcHw for SpyHw {
    type Dc = SpyPin;

    fn dc(&mut self) -> &mut Self::Dc {
        &mut self.dc
    }
}

impl ResetHw for SpyHw {
    type Reset = SpyPin;

    fn reset(&mut self) -> &mut Self::Reset {
        &mut self.reset
    }
}

impl DelayHw for SpyHw {
    type Delay = SpyDelay;

    fn delay(&mut self) -> &mut Self::Delay {
        &mut self.delay
    }
}

/// Builds a spy HAL. All lines start low, i.e. selected, in command mode and held in reset.
pub fn spy() -> (SpyHw, SpySpi, SharedLines) {
    let lines = Rc::new(RefCell::new(Lines {
        cs: false,
        dc: false,
        reset: false,
        events: Vec::new(),
    }));
    let pin = |line| SpyPin {
        line,
        lines: lines.clone(),
    };
    let hw = SpyHw {
        cs: pin(Line::Cs),
        dc: pin(Line::Dc),
        reset: pin(Line::Reset),
        delay: SpyDelay {
            lines: lines.clone(),
        },
    };
    let spi = SpySpi {
        lines: lines.clone(),
        fail_after: None,
    };
    (hw, spi, lines)
}
