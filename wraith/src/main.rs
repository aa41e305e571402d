//! Wraith runs a ROM on the shade core with nothing attached but the serial port. It is meant for
//! conformance test ROMs, which report "Passed" or "Failed" over serial.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};

pub mod config;
pub mod error;
pub mod session;

use config::{Config, LogLevel};
use error::RunnerError;
use session::{Outcome, Session};

#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// The ROM image to run.
    rom: PathBuf,
    /// The config file to read instead of `wraith.toml`.
    #[arg(long)]
    config: Option<PathBuf>,
    /// The number of frames to run before giving up.
    #[arg(long)]
    frames: Option<u64>,
    /// Where to load and store external RAM. Defaults to the ROM path with a `.sav` extension.
    #[arg(long)]
    save: Option<PathBuf>,
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
    /// Never write the save file.
    #[arg(long)]
    no_save: bool,
}

impl Args {
    /// Layers the command line over the config file.
    fn apply(&self, config: &mut Config) {
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(frames) = self.frames {
            config.max_frames = frames;
        }
        if self.no_save {
            config.save_ram = false;
        }
    }

    fn save_path(&self) -> PathBuf {
        self.save
            .clone()
            .unwrap_or_else(|| self.rom.with_extension("sav"))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };
    args.apply(&mut config);

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(config.log_level))
        .with_writer(std::io::stderr)
        .init();

    match run(&args, config) {
        Ok(outcome) => {
            info!("{outcome}");
            ExitCode::from(outcome.exit_code())
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args, config: Config) -> Result<Outcome, RunnerError> {
    let rom = std::fs::read(&args.rom)?;
    let mut session = Session::new(rom, args.save_path(), config)?;
    // The save is written even when emulation fails
    let outcome = session.run();
    debug!("Final CPU state: {}", session.gameboy().cpu);
    session.store_save()?;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_overrides_config() {
        let args = Args::parse_from([
            "wraith",
            "game.gb",
            "--frames",
            "10",
            "--log-level",
            "debug",
            "--no-save",
        ]);
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.max_frames, 10);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(!config.save_ram);
        assert!(config.serial_echo);
    }

    #[test]
    fn save_path_follows_the_rom() {
        let args = Args::parse_from(["wraith", "roms/cpu_instrs.gb"]);
        assert_eq!(args.save_path(), PathBuf::from("roms/cpu_instrs.sav"));
        let args = Args::parse_from(["wraith", "a.gb", "--save", "b.sav"]);
        assert_eq!(args.save_path(), PathBuf::from("b.sav"));
    }

    #[test]
    fn missing_rom() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::parse_from(["wraith", dir.path().join("none.gb").to_str().unwrap()]);
        assert!(matches!(
            run(&args, Config::default()),
            Err(RunnerError::Io(_))
        ));
    }
}
