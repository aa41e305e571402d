use shade::error::{CartridgeError, EmulationError};

/// Everything that can stop a run before a verdict is reached.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum RunnerError {
    #[display("I/O error: {_0}")]
    Io(std::io::Error),
    #[display("Malformed config file: {_0}")]
    Config(toml::de::Error),
    #[display("Could not load cartridge: {_0}")]
    Cartridge(CartridgeError),
    #[display("Emulation stopped: {_0}")]
    Emulation(EmulationError),
}
