use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;

use super::InterruptTarget;
use super::Peripheral;
use crate::instruction::Interrupt;

/// The DIV/TIMA/TMA/TAC timer block.
///
/// DIV is the upper byte of a 16-bit counter that increments every tick. TIMA increments on the
/// falling edge of one of the counter's bits (selected by TAC) ANDed with the enable bit, which is
/// also why writing to DIV or TAC can bump TIMA.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    /// ADDR FF04 is the top byte of this
    counter: u16,
    /// ADDR FF05
    timer_counter: TimerCounter,
    /// ADDR FF06
    /// When the timer counter overflows, it resets to the value in this register.
    timer_modulo: u8,
    /// ADDR FF07
    timer_control: u8,
}

/// When the timer counter overflows, it does not immediately load the timer modulo value. That
/// happens four ticks later, and the interrupt is requested at the same time. The first variant
/// models this wait.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
enum TimerCounter {
    Loading(u8),
    Ready(u8),
}

impl Display for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Timer {{")?;
        writeln!(f, "  DIV: 0x{:0>2X} (0x{:0>4X})", self.divider(), self.counter)?;
        match self.timer_counter {
            TimerCounter::Loading(count) => writeln!(f, "  TIMA: Loading({count})")?,
            TimerCounter::Ready(count) => writeln!(f, "  TIMA: 0x{count:0>2X}")?,
        }
        writeln!(f, "  TMA: 0x{:0>2X}", self.timer_modulo)?;
        writeln!(f, "  TAC: 0b{:0>3b}", self.timer_control & 0b111)?;
        write!(f, "}}")
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            counter: 0,
            timer_counter: TimerCounter::Ready(0),
            timer_modulo: 0,
            timer_control: 0,
        }
    }

    pub fn divider(&self) -> u8 {
        (self.counter >> 8) as u8
    }

    /// The counter bit that TIMA watches for the current TAC, gated by the enable bit.
    fn signal(&self) -> bool {
        if self.timer_control & 0b100 == 0 {
            return false;
        }
        let bit = match self.timer_control & 0b11 {
            0b00 => 9,
            0b01 => 3,
            0b10 => 5,
            _ => 7,
        };
        self.counter & (1 << bit) != 0
    }

    fn tick(&mut self, irq: &mut dyn InterruptTarget) {
        if let TimerCounter::Loading(value) = &mut self.timer_counter {
            *value += 1;
            if *value == 4 {
                self.timer_counter = TimerCounter::Ready(self.timer_modulo);
                irq.request_interrupt(Interrupt::Timer);
            }
        }
        let before = self.signal();
        self.counter = self.counter.wrapping_add(1);
        if before && !self.signal() {
            self.inc_timer_counter();
        }
    }

    fn inc_timer_counter(&mut self) {
        let TimerCounter::Ready(value) = &mut self.timer_counter else {
            return;
        };
        match value.checked_add(1) {
            Some(val) => *value = val,
            // `None` indicates there was an overflow, so TIMA holds zero while it waits to reload.
            None => self.timer_counter = TimerCounter::Loading(0),
        }
    }

    /// Runs a register write that can drop the watched signal, bumping TIMA if it does.
    fn with_edge_check(&mut self, update: impl FnOnce(&mut Self)) {
        let before = self.signal();
        update(self);
        if before && !self.signal() {
            self.inc_timer_counter();
        }
    }
}

impl Peripheral for Timer {
    fn clock(&mut self, ticks: u8, irq: &mut dyn InterruptTarget) {
        for _ in 0..ticks {
            self.tick(irq);
        }
    }

    fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF04 => self.divider(),
            0xFF05 => match self.timer_counter {
                TimerCounter::Loading(_) => 0,
                TimerCounter::Ready(value) => value,
            },
            0xFF06 => self.timer_modulo,
            0xFF07 => 0xF8 | self.timer_control,
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        match addr {
            // Any write clears the whole counter.
            0xFF04 => self.with_edge_check(|this| this.counter = 0),
            // Writes during the reload wait cancel it.
            0xFF05 => self.timer_counter = TimerCounter::Ready(val),
            0xFF06 => self.timer_modulo = val,
            0xFF07 => self.with_edge_check(|this| this.timer_control = val & 0b111),
            _ => {}
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
