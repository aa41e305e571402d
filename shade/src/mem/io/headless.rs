use serde::Deserialize;
use serde::Serialize;
use serde_with::serde_as;

use super::InterruptTarget;
use super::Peripheral;
use crate::cpu::check_bit_const;
use crate::instruction::Interrupt;

const DOTS_PER_LINE: u16 = 456;
const LINES_PER_FRAME: u8 = 154;
const FIRST_VBLANK_LINE: u8 = 144;
/// Mode 2 (OAM scan) length
const OAM_SCAN_DOTS: u16 = 80;
/// End of mode 3 (drawing), using its shortest length
const DRAWING_END_DOTS: u16 = 252;

/// The video unit without a picture. It owns VRAM, OAM, and the LCD registers, and keeps LY/STAT
/// moving with the right timing so that software waiting on VBlank or on a specific line makes
/// progress.
#[serde_as]
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlessVideo {
    #[serde_as(as = "serde_with::Bytes")]
    vram: Vec<u8>,
    #[serde_as(as = "serde_with::Bytes")]
    oam: Vec<u8>,
    /// ADDR FF40
    lcdc: u8,
    /// ADDR FF41. Only the interrupt select bits are stored, the rest is computed.
    stat: u8,
    /// ADDR FF42-FF43
    scroll: (u8, u8),
    /// ADDR FF44
    ly: u8,
    /// ADDR FF45
    lyc: u8,
    /// ADDR FF47-FF49
    palettes: [u8; 3],
    /// ADDR FF4A-FF4B
    window: (u8, u8),
    /// Dots into the current line
    dot: u16,
}

impl Default for HeadlessVideo {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessVideo {
    pub fn new() -> Self {
        Self {
            vram: vec![0; 0x2000],
            oam: vec![0; 0xA0],
            lcdc: 0,
            stat: 0,
            scroll: (0, 0),
            ly: 0,
            lyc: 0,
            palettes: [0; 3],
            window: (0, 0),
            dot: 0,
        }
    }

    pub fn enabled(&self) -> bool {
        check_bit_const::<7>(self.lcdc)
    }

    pub fn ly(&self) -> u8 {
        self.ly
    }

    fn mode(&self) -> u8 {
        if !self.enabled() {
            0
        } else if self.ly >= FIRST_VBLANK_LINE {
            1
        } else if self.dot < OAM_SCAN_DOTS {
            2
        } else if self.dot < DRAWING_END_DOTS {
            3
        } else {
            0
        }
    }

    fn coincidence(&self) -> bool {
        self.ly == self.lyc
    }

    /// Whether any enabled STAT source is active. STAT interrupts fire on the rising edge of this.
    fn stat_line(&self) -> bool {
        let mode = self.mode();
        (check_bit_const::<3>(self.stat) && mode == 0)
            || (check_bit_const::<4>(self.stat) && mode == 1)
            || (check_bit_const::<5>(self.stat) && mode == 2)
            || (check_bit_const::<6>(self.stat) && self.coincidence())
    }
}

impl Peripheral for HeadlessVideo {
    fn clock(&mut self, ticks: u8, irq: &mut dyn InterruptTarget) {
        if !self.enabled() {
            return;
        }
        let line_before = self.stat_line();
        self.dot += ticks as u16;
        if self.dot >= DOTS_PER_LINE {
            self.dot -= DOTS_PER_LINE;
            self.ly = (self.ly + 1) % LINES_PER_FRAME;
            if self.ly == FIRST_VBLANK_LINE {
                irq.request_interrupt(Interrupt::VBlank);
            }
        }
        if !line_before && self.stat_line() {
            irq.request_interrupt(Interrupt::LCD);
        }
    }

    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x8000..=0x9FFF => self.vram[(addr - 0x8000) as usize],
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize],
            0xFF40 => self.lcdc,
            0xFF41 => 0x80 | self.stat | ((self.coincidence() as u8) << 2) | self.mode(),
            0xFF42 => self.scroll.0,
            0xFF43 => self.scroll.1,
            0xFF44 => self.ly,
            0xFF45 => self.lyc,
            0xFF47..=0xFF49 => self.palettes[(addr - 0xFF47) as usize],
            0xFF4A => self.window.0,
            0xFF4B => self.window.1,
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        match addr {
            0x8000..=0x9FFF => self.vram[(addr - 0x8000) as usize] = val,
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize] = val,
            0xFF40 => {
                self.lcdc = val;
                if !self.enabled() {
                    self.ly = 0;
                    self.dot = 0;
                }
            }
            0xFF41 => self.stat = val & 0x78,
            0xFF42 => self.scroll.0 = val,
            0xFF43 => self.scroll.1 = val,
            // LY is read only
            0xFF44 => {}
            0xFF45 => self.lyc = val,
            0xFF47..=0xFF49 => self.palettes[(addr - 0xFF47) as usize] = val,
            0xFF4A => self.window.0 = val,
            0xFF4B => self.window.1 = val,
            _ => {}
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// The sound registers without sound. Reads come back with the unused bits set, the same as the
/// hardware, and the channel status bits in NR52 stay clear.
#[serde_as]
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlessAudio {
    /// ADDR FF10-FF3F
    #[serde_as(as = "serde_with::Bytes")]
    regs: [u8; 0x30],
}

/// The bits of each sound register that always read back as 1.
const AUDIO_READ_MASKS: [u8; 0x20] = [
    0x80, 0x3F, 0x00, 0xFF, 0xBF, // NR10-NR14
    0xFF, 0x3F, 0x00, 0xFF, 0xBF, // unused, NR21-NR24
    0x7F, 0xFF, 0x9F, 0xFF, 0xBF, // NR30-NR34
    0xFF, 0xFF, 0x00, 0x00, 0xBF, // unused, NR41-NR44
    0x00, 0x00, 0x70, // NR50-NR52
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // unused
];

impl Default for HeadlessAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessAudio {
    pub fn new() -> Self {
        Self { regs: [0; 0x30] }
    }
}

impl Peripheral for HeadlessAudio {
    fn clock(&mut self, _ticks: u8, _irq: &mut dyn InterruptTarget) {}

    fn read(&self, addr: u16) -> u8 {
        let index = (addr.wrapping_sub(0xFF10)) as usize;
        match index {
            0x00..=0x1F => self.regs[index] | AUDIO_READ_MASKS[index],
            // Wave RAM
            0x20..=0x2F => self.regs[index],
            _ => 0xFF,
        }
    }

    fn reset(&mut self) {
        self.regs.fill(0);
    }

    fn write(&mut self, addr: u16, val: u8) {
        let index = (addr.wrapping_sub(0xFF10)) as usize;
        match index {
            // NR52: only the power bit can be written
            0x16 => self.regs[index] = val & 0x80,
            0x00..=0x2F => self.regs[index] = val,
            _ => {}
        }
    }
}

/// The joypad with nothing pressed. Only the row select bits can be written.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joypad {
    /// ADDR FF00
    select: u8,
}

impl Joypad {
    pub fn new() -> Self {
        Self { select: 0x30 }
    }
}

impl Peripheral for Joypad {
    fn clock(&mut self, _ticks: u8, _irq: &mut dyn InterruptTarget) {}

    fn read(&self, _addr: u16) -> u8 {
        0xC0 | self.select | 0x0F
    }

    fn write(&mut self, _addr: u16, val: u8) {
        self.select = val & 0x30;
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::io::InterruptFlags;

    #[test]
    fn ly_walks_every_line() {
        let mut video = HeadlessVideo::new();
        let mut flags = 0;
        video.write(0xFF40, 0x91);
        for line in 0..LINES_PER_FRAME as u32 {
            assert_eq!(video.read(0xFF44) as u32, line);
            for _ in 0..DOTS_PER_LINE / 4 {
                video.clock(4, &mut InterruptFlags(&mut flags));
            }
        }
        assert_eq!(video.read(0xFF44), 0);
        assert_eq!(flags & Interrupt::VBlank.mask(), Interrupt::VBlank.mask());
    }

    #[test]
    fn vblank_requested_on_line_144() {
        let mut video = HeadlessVideo::new();
        let mut flags = 0;
        video.write(0xFF40, 0x80);
        for _ in 0..(DOTS_PER_LINE as u32 * 144 / 4 - 1) {
            video.clock(4, &mut InterruptFlags(&mut flags));
        }
        assert_eq!(flags, 0);
        assert_eq!(video.read(0xFF41) & 0x03, 0);
        video.clock(4, &mut InterruptFlags(&mut flags));
        assert_eq!(flags, Interrupt::VBlank.mask());
        assert_eq!(video.read(0xFF41) & 0x03, 1);
    }

    #[test]
    fn lyc_stat_interrupt() {
        let mut video = HeadlessVideo::new();
        let mut flags = 0;
        video.write(0xFF45, 2);
        video.write(0xFF41, 0x40);
        video.write(0xFF40, 0x80);
        for _ in 0..(DOTS_PER_LINE * 2 / 4) {
            video.clock(4, &mut InterruptFlags(&mut flags));
        }
        assert_eq!(video.read(0xFF44), 2);
        assert_eq!(flags, Interrupt::LCD.mask());
        assert_eq!(video.read(0xFF41) & 0x44, 0x44);
    }

    #[test]
    fn disabled_lcd_holds_ly() {
        let mut video = HeadlessVideo::new();
        let mut flags = 0;
        for _ in 0..10_000 {
            video.clock(4, &mut InterruptFlags(&mut flags));
        }
        assert_eq!(video.read(0xFF44), 0);
        assert_eq!(flags, 0);
        video.write(0xFF44, 0x55);
        assert_eq!(video.read(0xFF44), 0);
    }

    #[test]
    fn audio_read_masks() {
        let mut audio = HeadlessAudio::new();
        audio.write(0xFF11, 0x00);
        assert_eq!(audio.read(0xFF11), 0x3F);
        audio.write(0xFF26, 0xFF);
        assert_eq!(audio.read(0xFF26), 0xF0);
        audio.write(0xFF30, 0x12);
        assert_eq!(audio.read(0xFF30), 0x12);
        assert_eq!(audio.read(0xFF15), 0xFF);
    }

    #[test]
    fn joypad_reads_released() {
        let mut joypad = Joypad::new();
        assert_eq!(joypad.read(0xFF00), 0xFF);
        joypad.write(0xFF00, 0x20);
        assert_eq!(joypad.read(0xFF00), 0xEF);
    }
}
