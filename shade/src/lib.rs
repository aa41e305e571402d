//! Shade is the core crate for the phantoms project. Contained here is the logic of a Game Boy
//! that can run a game ROM without any way to show it: the SM83 CPU, the memory bus, cartridge
//! bank switching, and enough of the I/O devices for test ROMs to run. Frontends and harnesses
//! wrap this crate in their own ways.
//!
//! The timing model is cycle-accurate at the M-cycle level. Every bus access and every internal
//! CPU cycle advances the peripherals by four ticks before it happens.
//!
//! # Notes
//! The SM83 is little endian. 16-bit immediates are stored low byte first.

pub mod cpu;
pub mod error;
mod gameboy;
pub mod instruction;
pub mod lookup;
pub mod mem;
pub mod rom;

pub use gameboy::{Gameboy, TICKS_PER_FRAME};
