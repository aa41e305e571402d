use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use super::InterruptTarget;
use super::Peripheral;
use crate::instruction::Interrupt;

/// Ticks per bit with the internal clock.
const TICKS_PER_BIT: u16 = 512;

/// A shared handle onto the bytes sent out of the serial port. Test ROMs report their results
/// this way.
#[derive(Debug, Clone, Default)]
pub struct SerialCapture(Rc<RefCell<Vec<u8>>>);

impl SerialCapture {
    fn push(&self, byte: u8) {
        self.0.borrow_mut().push(byte);
    }

    /// Everything sent so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }

    /// The bytes sent after the first `offset`.
    pub fn bytes_since(&self, offset: usize) -> Vec<u8> {
        self.0.borrow().get(offset..).map(<[u8]>::to_vec).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Everything sent so far, lossily decoded as text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// The serial port with nothing plugged in. Transfers started with the internal clock finish after
/// eight bit periods, shift in 0xFF, and raise the serial interrupt.
#[derive(Debug)]
pub struct Serial {
    /// ADDR FF01
    data: u8,
    /// ADDR FF02
    control: u8,
    ticks_left: u16,
    capture: SerialCapture,
}

impl Serial {
    pub fn new(capture: SerialCapture) -> Self {
        Self {
            data: 0,
            control: 0,
            ticks_left: 0,
            capture,
        }
    }

    fn transferring(&self) -> bool {
        self.ticks_left != 0
    }
}

impl Peripheral for Serial {
    fn clock(&mut self, ticks: u8, irq: &mut dyn InterruptTarget) {
        if !self.transferring() {
            return;
        }
        self.ticks_left = self.ticks_left.saturating_sub(ticks as u16);
        if !self.transferring() {
            self.data = 0xFF;
            self.control &= 0x7F;
            irq.request_interrupt(Interrupt::Serial);
        }
    }

    fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF01 => self.data,
            0xFF02 => self.control | 0x7E,
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        match addr {
            0xFF01 => self.data = val,
            0xFF02 => {
                self.control = val & 0x81;
                // Only transfers on the internal clock ever finish without a partner.
                if val & 0x81 == 0x81 {
                    trace!("Serial transfer of 0x{:0>2X}", self.data);
                    self.capture.push(self.data);
                    self.ticks_left = 8 * TICKS_PER_BIT;
                } else {
                    self.ticks_left = 0;
                }
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.data = 0;
        self.control = 0;
        self.ticks_left = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::io::InterruptFlags;

    #[test]
    fn transfer_completes_after_eight_bits() {
        let capture = SerialCapture::default();
        let mut serial = Serial::new(capture.clone());
        let mut flags = 0;
        serial.write(0xFF01, b'P');
        serial.write(0xFF02, 0x81);
        assert_eq!(capture.text(), "P");
        assert_eq!(serial.read(0xFF02), 0xFF);

        for _ in 0..(8 * TICKS_PER_BIT / 4 - 1) {
            serial.clock(4, &mut InterruptFlags(&mut flags));
        }
        assert_eq!(flags, 0);
        assert_eq!(serial.read(0xFF01), b'P');
        serial.clock(4, &mut InterruptFlags(&mut flags));
        assert_eq!(flags, Interrupt::Serial.mask());
        assert_eq!(serial.read(0xFF01), 0xFF);
        assert_eq!(serial.read(0xFF02), 0x7F);
    }

    #[test]
    fn clearing_the_start_bit_aborts() {
        let capture = SerialCapture::default();
        let mut serial = Serial::new(capture.clone());
        let mut flags = 0;
        serial.write(0xFF01, b'A');
        serial.write(0xFF02, 0x81);
        for _ in 0..100 {
            serial.clock(4, &mut InterruptFlags(&mut flags));
        }
        serial.write(0xFF02, 0x01);
        for _ in 0..2000 {
            serial.clock(4, &mut InterruptFlags(&mut flags));
        }
        assert_eq!(flags, 0);
        assert_eq!(serial.read(0xFF01), b'A');
        assert_eq!(serial.read(0xFF02), 0x7F);
    }

    #[test]
    fn capture_reads_from_an_offset() {
        let capture = SerialCapture::default();
        let mut serial = Serial::new(capture.clone());
        for byte in *b"OK!" {
            serial.write(0xFF01, byte);
            serial.write(0xFF02, 0x81);
        }
        assert_eq!(capture.len(), 3);
        assert_eq!(capture.bytes_since(1), b"K!");
        assert!(capture.bytes_since(3).is_empty());
        assert!(capture.bytes_since(10).is_empty());
    }

    #[test]
    fn external_clock_never_completes() {
        let capture = SerialCapture::default();
        let mut serial = Serial::new(capture.clone());
        let mut flags = 0;
        serial.write(0xFF01, 0x42);
        serial.write(0xFF02, 0x80);
        for _ in 0..10_000 {
            serial.clock(4, &mut InterruptFlags(&mut flags));
        }
        assert_eq!(flags, 0);
        assert!(capture.bytes().is_empty());
    }
}
