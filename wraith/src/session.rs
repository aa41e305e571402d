use std::io::Write;
use std::path::PathBuf;

use shade::Gameboy;
use shade::error::SaveError;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::RunnerError;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Outcome {
    Passed,
    Failed,
    /// The frame limit was hit before the ROM reported anything.
    #[display("No verdict")]
    NoVerdict,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Passed | Outcome::NoVerdict => 0,
            Outcome::Failed => 1,
        }
    }
}

/// A loaded ROM and everything needed to drive it to a verdict.
#[derive(Debug)]
pub struct Session {
    gb: Gameboy,
    config: Config,
    save_path: PathBuf,
    /// How much of the serial output has been echoed.
    echoed: usize,
}

impl Session {
    /// Loads the cartridge and, if the save file exists, its external RAM. A save of the wrong
    /// size is ignored.
    pub fn new(rom: Vec<u8>, save_path: PathBuf, config: Config) -> Result<Self, RunnerError> {
        let mut gb = Gameboy::load_cartridge(rom)?;
        if save_path.exists() {
            let data = std::fs::read(&save_path)?;
            match gb.cartridge_mut().load_external_ram(&data) {
                Ok(()) => info!("Loaded save from {}", save_path.display()),
                Err(err @ SaveError::WrongLength { .. }) => {
                    warn!("Ignoring {}: {err}", save_path.display())
                }
            }
        }
        Ok(Self {
            gb,
            config,
            save_path,
            echoed: 0,
        })
    }

    pub fn gameboy(&self) -> &Gameboy {
        &self.gb
    }

    /// Runs frames until the ROM reports a verdict (when configured to stop on one) or the frame
    /// limit is hit.
    pub fn run(&mut self) -> Result<Outcome, RunnerError> {
        for frame in 0..self.config.max_frames {
            self.gb.run_frame().inspect_err(|_| {
                warn!("Stopped in frame {frame} with {}", self.gb.cpu);
            })?;
            self.echo_serial()?;
            if self.config.stop_on_verdict {
                if let Some(outcome) = self.verdict() {
                    info!("{outcome} after {} frames", frame + 1);
                    return Ok(outcome);
                }
            }
        }
        debug!("Frame limit of {} reached", self.config.max_frames);
        Ok(self.verdict().unwrap_or(Outcome::NoVerdict))
    }

    /// Whichever of "Passed" and "Failed" shows up first in the serial output.
    pub fn verdict(&self) -> Option<Outcome> {
        let text = self.gb.serial_output()?.text();
        let passed = text.find("Passed").map(|i| (i, Outcome::Passed));
        let failed = text.find("Failed").map(|i| (i, Outcome::Failed));
        passed
            .into_iter()
            .chain(failed)
            .min_by_key(|(i, _)| *i)
            .map(|(_, outcome)| outcome)
    }

    fn echo_serial(&mut self) -> Result<(), RunnerError> {
        let Some(serial) = self.gb.serial_output() else {
            return Ok(());
        };
        let fresh = serial.bytes_since(self.echoed);
        if !fresh.is_empty() {
            if self.config.serial_echo {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&fresh)?;
                stdout.flush()?;
            }
            self.echoed += fresh.len();
        }
        Ok(())
    }

    /// Writes external RAM to the save file if the cartridge has a battery and saving is turned
    /// on. Returns whether anything was written.
    pub fn store_save(&self) -> Result<bool, RunnerError> {
        let cart = self.gb.cartridge();
        if !self.config.save_ram || !cart.has_battery() || cart.external_ram().is_empty() {
            return Ok(false);
        }
        std::fs::write(&self.save_path, cart.external_ram())?;
        info!("Saved to {}", self.save_path.display());
        Ok(true)
    }
}
