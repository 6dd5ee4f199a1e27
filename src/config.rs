//! Harness configuration: sizes, UART timing and bus read completion.

use camino::Utf8PathBuf;
use clap::Parser;
use eyre::{ensure, Result, WrapErr};

use crate::bus::ReadCompletion;
use crate::uart::UartConfig;

pub const MAX_FIFO_ITEMS: usize = 31;
pub const ROM_SIZE: usize = 16384;
pub const RAM_SIZE: usize = 24576;
pub const RESET_CLOCKS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub fifo_capacity: usize,
    pub rom_size: usize,
    pub ram_size: usize,
    pub uart: UartConfig,
    pub read_completion: ReadCompletion,
    pub reset_clocks: u32,
    /// `$readmemh` file preloaded into ROM, if any.
    pub rom_image: Option<Utf8PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            fifo_capacity: MAX_FIFO_ITEMS,
            rom_size: ROM_SIZE,
            ram_size: RAM_SIZE,
            uart: UartConfig::default(),
            read_completion: ReadCompletion::Acknowledge,
            reset_clocks: RESET_CLOCKS,
            rom_image: None,
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.fifo_capacity > 0, "FIFO capacity must be non-zero");
        ensure!(self.rom_size > 0, "ROM size must be non-zero");
        ensure!(self.ram_size > 0, "RAM size must be non-zero");
        self.uart.validate().wrap_err("invalid UART timing")?;
        Ok(())
    }
}

/// Command-line overrides of [`HarnessConfig`]. Every flag can also come
/// from its `WB_SIM_*` environment variable; unset ones keep the default.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "wb-sim",
    version,
    about = "Cycle-accurate Wishbone peripheral harness"
)]
pub struct HarnessArgs {
    /// Slots in every FIFO under test.
    #[arg(long, env = "WB_SIM_FIFO_CAPACITY")]
    pub fifo_capacity: Option<usize>,

    /// ROM words in the test bed address space.
    #[arg(long, env = "WB_SIM_ROM_SIZE")]
    pub rom_size: Option<usize>,

    /// RAM words in the test bed address space.
    #[arg(long, env = "WB_SIM_RAM_SIZE")]
    pub ram_size: Option<usize>,

    /// Clock ticks per UART bit.
    #[arg(long, env = "WB_SIM_BAUD_PERIOD")]
    pub baud_period: Option<u32>,

    /// Sample bus reads a fixed number of ticks after the drain tick
    /// instead of waiting for ack.
    #[arg(long, env = "WB_SIM_READ_LATENCY")]
    pub read_latency: Option<u32>,

    /// `$readmemh` file preloaded into ROM.
    #[arg(long, env = "WB_SIM_ROM_IMAGE")]
    pub rom_image: Option<Utf8PathBuf>,
}

impl HarnessArgs {
    /// Folds the overrides into the defaults and validates the result.
    pub fn into_config(self) -> Result<HarnessConfig> {
        let mut config = HarnessConfig::default();

        if let Some(capacity) = self.fifo_capacity {
            config.fifo_capacity = capacity;
        }
        if let Some(size) = self.rom_size {
            config.rom_size = size;
        }
        if let Some(size) = self.ram_size {
            config.ram_size = size;
        }
        if let Some(baud) = self.baud_period {
            config.uart = UartConfig::new(baud).wrap_err("invalid --baud-period")?;
        }
        if let Some(latency) = self.read_latency {
            config.read_completion = ReadCompletion::FixedLatency(latency);
        }
        config.rom_image = self.rom_image;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sizes_and_timing() {
        let config = HarnessConfig::default();
        assert_eq!(config.fifo_capacity, 31);
        assert_eq!(config.rom_size, 16384);
        assert_eq!(config.ram_size, 24576);
        assert_eq!(config.uart.baud_period(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_degenerate_sizes() {
        let config = HarnessConfig {
            fifo_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = HarnessConfig {
            ram_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = HarnessArgs::try_parse_from([
            "wb-sim",
            "--fifo-capacity",
            "16",
            "--baud-period",
            "7",
            "--rom-image",
            "boot.hex",
        ])
        .unwrap();
        let config = args.into_config().unwrap();

        assert_eq!(config.fifo_capacity, 16);
        assert_eq!(config.uart.baud_period(), 7);
        assert_eq!(config.rom_image.as_deref(), Some(camino::Utf8Path::new("boot.hex")));
        assert_eq!(config.rom_size, ROM_SIZE);
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(HarnessArgs::try_parse_from(["wb-sim", "--baud-period", "ten"]).is_err());

        let args = HarnessArgs::try_parse_from(["wb-sim", "--baud-period", "1"]).unwrap();
        let err = args.into_config().unwrap_err();
        assert!(format!("{err}").contains("--baud-period"));

        let args = HarnessArgs::try_parse_from(["wb-sim", "--fifo-capacity", "0"]).unwrap();
        assert!(args.into_config().is_err());
    }

    #[test]
    fn test_environment_selects_fixed_latency_reads() {
        std::env::set_var("WB_SIM_READ_LATENCY", "5");
        let args = HarnessArgs::try_parse_from(["wb-sim"]);
        std::env::remove_var("WB_SIM_READ_LATENCY");

        let config = args.unwrap().into_config().unwrap();
        assert_eq!(config.read_completion, ReadCompletion::FixedLatency(5));
    }
}
