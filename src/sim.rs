//! Recording bus, pin and delay doubles sharing one event log.

use core::cell::RefCell;
use core::convert::Infallible;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, InputPin, OutputPin};
use embedded_hal::spi::{ErrorType, SpiBus};

use crate::config::DeviceSettings;
use crate::interface::ConfigurableBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Configure(DeviceSettings),
    Exchange { out: u8, back: u8 },
    Flush,
    /// Chip-select level, `true` is high.
    Cs(bool),
    /// Ready line level read by a poll, `true` is high (busy).
    ReadyPoll(bool),
    DelayNs(u32),
    DelayUs(u32),
    DelayMs(u32),
}

pub(crate) type EventLog = Rc<RefCell<Vec<Event>>>;

pub(crate) fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Simulated chip behind the bus: maps every byte shifted out to the byte shifted in.
pub(crate) struct SimBus {
    log: EventLog,
    respond: Box<dyn FnMut(u8) -> u8>,
}

impl SimBus {
    pub(crate) fn new(log: &EventLog, respond: impl FnMut(u8) -> u8 + 'static) -> Self {
        Self {
            log: Rc::clone(log),
            respond: Box::new(respond),
        }
    }

    pub(crate) fn echo(log: &EventLog) -> Self {
        Self::new(log, |byte| byte)
    }

    /// Answers from `responses` in order, `0x00` once exhausted.
    pub(crate) fn scripted(log: &EventLog, responses: &[u8]) -> Self {
        let mut queue: VecDeque<u8> = responses.iter().copied().collect();
        Self::new(log, move |_| queue.pop_front().unwrap_or(0x00))
    }

    fn shift(&mut self, out: u8) -> u8 {
        let back = (self.respond)(out);
        self.log.borrow_mut().push(Event::Exchange { out, back });
        back
    }
}

impl ErrorType for SimBus {
    type Error = Infallible;
}

impl SpiBus for SimBus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.shift(0x00);
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for &word in words {
            self.shift(word);
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        let len = read.len().max(write.len());
        for i in 0..len {
            let back = self.shift(write.get(i).copied().unwrap_or(0x00));
            if let Some(slot) = read.get_mut(i) {
                *slot = back;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words.iter_mut() {
            *word = self.shift(*word);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::Flush);
        Ok(())
    }
}

impl ConfigurableBus for SimBus {
    fn apply_settings(&mut self, settings: &DeviceSettings) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::Configure(*settings));
        Ok(())
    }
}

/// Chip-select line recording every level change.
pub(crate) struct SimPin {
    log: EventLog,
}

impl SimPin {
    pub(crate) fn new(log: &EventLog) -> Self {
        Self { log: Rc::clone(log) }
    }
}

impl PinErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::Cs(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::Cs(true));
        Ok(())
    }
}

/// Ready line that reads high for a number of polls, then low.
pub(crate) struct SimReady {
    log: EventLog,
    busy_polls: Option<u32>,
}

impl SimReady {
    pub(crate) fn ready(log: &EventLog) -> Self {
        Self::after(log, 0)
    }

    pub(crate) fn after(log: &EventLog, busy_polls: u32) -> Self {
        Self {
            log: Rc::clone(log),
            busy_polls: Some(busy_polls),
        }
    }

    /// Never becomes ready.
    pub(crate) fn stuck(log: &EventLog) -> Self {
        Self {
            log: Rc::clone(log),
            busy_polls: None,
        }
    }

    /// Makes the line busy again for the next `busy_polls` reads.
    pub(crate) fn rearm(&mut self, busy_polls: u32) {
        self.busy_polls = Some(busy_polls);
    }

    fn sample(&mut self) -> bool {
        let high = match self.busy_polls.as_mut() {
            None => true,
            Some(0) => false,
            Some(left) => {
                *left -= 1;
                true
            }
        };
        self.log.borrow_mut().push(Event::ReadyPoll(high));
        high
    }
}

impl PinErrorType for SimReady {
    type Error = Infallible;
}

impl InputPin for SimReady {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.sample())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.sample())
    }
}

/// Delay provider that records instead of waiting.
pub(crate) struct SimDelay {
    log: EventLog,
}

impl SimDelay {
    pub(crate) fn new(log: &EventLog) -> Self {
        Self { log: Rc::clone(log) }
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Event::DelayNs(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.log.borrow_mut().push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::DelayMs(ms));
    }
}

/// Exchanges recorded in `log`, in order.
pub(crate) fn exchanges(log: &EventLog) -> Vec<(u8, u8)> {
    log.borrow()
        .iter()
        .filter_map(|event| match *event {
            Event::Exchange { out, back } => Some((out, back)),
            _ => None,
        })
        .collect()
}

impl ConfigurableBus for embedded_hal_mock::eh1::spi::Mock<u8> {
    fn apply_settings(&mut self, _settings: &DeviceSettings) -> Result<(), Self::Error> {
        Ok(())
    }
}
