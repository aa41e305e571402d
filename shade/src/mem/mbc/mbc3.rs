use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use serde_with::serde_as;
use tracing::debug;

use super::Controller;
use super::ram_enable_value;
use super::ram_index;
use super::rom_byte;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
/// The day counter is nine bits wide
const DAY_LIMIT: u64 = 512;

#[serde_as]
#[derive(Debug, Hash, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MBC3 {
    #[serde_as(as = "serde_with::Bytes")]
    rom: Vec<u8>,
    #[serde_as(as = "serde_with::Bytes")]
    ram: Vec<u8>,
    /// Gates both RAM and the clock registers
    ram_enabled: bool,
    /// Seven bits, never zero
    rom_bank: u8,
    /// ADDR 4000-5FFF. 0x00-0x03 map a RAM bank, 0x08-0x0C map a clock register.
    select: u8,
    rtc: Option<Rtc>,
}

impl MBC3 {
    pub fn new(rom: Vec<u8>, ram_size: usize, has_rtc: bool) -> Self {
        Self {
            rom,
            ram: vec![0; ram_size],
            ram_enabled: false,
            rom_bank: 1,
            select: 0,
            rtc: has_rtc.then(|| Rtc::new(unix_now())),
        }
    }

    pub fn rom_bank(&self) -> usize {
        self.rom_bank as usize
    }

    pub fn rtc(&self) -> Option<&Rtc> {
        self.rtc.as_ref()
    }
}

impl Controller for MBC3 {
    fn read_rom(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, 0, addr)
    }

    fn read_upper_rom(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, self.rom_bank(), addr)
    }

    fn read_external(&self, addr: u16) -> u8 {
        if !self.ram_enabled {
            return 0xFF;
        }
        match (self.select, &self.rtc) {
            (0x00..=0x03, _) => {
                ram_index(&self.ram, self.select as usize, addr).map_or(0xFF, |i| self.ram[i])
            }
            (0x08..=0x0C, Some(rtc)) => rtc.read(self.select),
            _ => 0xFF,
        }
    }

    fn write_external(&mut self, addr: u16, val: u8) {
        if !self.ram_enabled {
            return;
        }
        match (self.select, &mut self.rtc) {
            (0x00..=0x03, _) => {
                if let Some(i) = ram_index(&self.ram, self.select as usize, addr) {
                    self.ram[i] = val;
                }
            }
            (0x08..=0x0C, Some(rtc)) => rtc.write(self.select, val, unix_now()),
            _ => {}
        }
    }

    fn write_control(&mut self, addr: u16, val: u8) {
        match addr {
            0x0000..0x2000 => self.ram_enabled = ram_enable_value(val),
            0x2000..0x4000 => self.rom_bank = std::cmp::max(val & 0x7F, 1),
            0x4000..0x6000 => self.select = val,
            _ => {
                if let Some(rtc) = self.rtc.as_mut() {
                    rtc.latch(unix_now());
                }
            }
        }
    }

    fn ram(&self) -> &[u8] {
        &self.ram
    }

    fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }
}

/// Seconds since the Unix epoch. A clock set before 1970 reads as the epoch.
fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// The values the game sees through the clock registers.
#[derive(Debug, Default, Hash, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtcRegisters {
    /// REG 08
    pub seconds: u8,
    /// REG 09
    pub minutes: u8,
    /// REG 0A
    pub hours: u8,
    /// REG 0B and bit 0 of REG 0C
    pub days: u16,
    /// Bit 6 of REG 0C
    pub halted: bool,
    /// Bit 7 of REG 0C. Set when the day counter overflows, stays set until written.
    pub carry: bool,
}

impl RtcRegisters {
    fn from_counter(counter: u64, halted: bool, carry: bool) -> Self {
        Self {
            seconds: (counter % 60) as u8,
            minutes: (counter / 60 % 60) as u8,
            hours: (counter / 3600 % 24) as u8,
            days: (counter / SECONDS_PER_DAY % DAY_LIMIT) as u16,
            halted,
            carry,
        }
    }

    fn counter(&self) -> u64 {
        self.seconds as u64
            + self.minutes as u64 * 60
            + self.hours as u64 * 3600
            + self.days as u64 * SECONDS_PER_DAY
    }

    fn read(&self, reg: u8) -> u8 {
        match reg {
            0x08 => self.seconds,
            0x09 => self.minutes,
            0x0A => self.hours,
            0x0B => self.days as u8,
            0x0C => {
                (self.days >> 8) as u8 & 0x01
                    | (self.halted as u8) << 6
                    | (self.carry as u8) << 7
            }
            _ => 0xFF,
        }
    }

    fn write(&mut self, reg: u8, val: u8) {
        match reg {
            0x08 => self.seconds = val & 0x3F,
            0x09 => self.minutes = val & 0x3F,
            0x0A => self.hours = val & 0x1F,
            0x0B => self.days = (self.days & 0x100) | val as u16,
            0x0C => {
                self.days = (self.days & 0xFF) | ((val as u16 & 0x01) << 8);
                self.halted = val & 0x40 != 0;
                self.carry = val & 0x80 != 0;
            }
            _ => {}
        }
    }
}

/// The MBC3 clock. The live counter is the number of seconds since `base`, so it keeps moving
/// while the emulator is not running. Games only ever see the latched copy.
#[derive(Debug, Hash, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rtc {
    /// The Unix time at which the live counter read zero
    base: u64,
    /// The frozen counter while the halt bit is set
    halted_at: Option<u64>,
    carry: bool,
    latched: RtcRegisters,
}

impl Rtc {
    pub fn new(now: u64) -> Self {
        Self {
            base: now,
            halted_at: None,
            carry: false,
            latched: RtcRegisters::default(),
        }
    }

    fn counter(&self, now: u64) -> u64 {
        self.halted_at
            .unwrap_or_else(|| now.saturating_sub(self.base))
    }

    /// The live registers at the given time. Folds a day counter overflow into the carry bit.
    pub fn live(&mut self, now: u64) -> RtcRegisters {
        let overflow = self.counter(now) / (SECONDS_PER_DAY * DAY_LIMIT);
        if overflow > 0 {
            let wrap = overflow * SECONDS_PER_DAY * DAY_LIMIT;
            match self.halted_at.as_mut() {
                Some(frozen) => *frozen -= wrap,
                None => self.base += wrap,
            }
            self.carry = true;
        }
        RtcRegisters::from_counter(self.counter(now), self.halted_at.is_some(), self.carry)
    }

    pub fn latched(&self) -> RtcRegisters {
        self.latched
    }

    /// Copies the live counter into the registers the game reads.
    pub fn latch(&mut self, now: u64) {
        self.latched = self.live(now);
        debug!("RTC latched: {:?}", self.latched);
    }

    pub fn read(&self, reg: u8) -> u8 {
        self.latched.read(reg)
    }

    /// Writes one clock register. Both the live counter and the latched copy take the new value.
    pub fn write(&mut self, reg: u8, val: u8, now: u64) {
        let mut live = self.live(now);
        live.write(reg, val);
        let counter = live.counter();
        if live.halted {
            self.halted_at = Some(counter);
        } else {
            self.halted_at = None;
            self.base = now.saturating_sub(counter);
        }
        self.carry = live.carry;
        self.latched.write(reg, val);
    }
}
