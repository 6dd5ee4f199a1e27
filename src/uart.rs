//! Bit-serial UART models sampled once per clock tick.
//!
//! [`UartTransmitter`] stands in for an external sender feeding a receiver
//! under test; [`UartReceiver`] stands in for an external listener on a
//! transmitter under test. A frame is a start bit (low), `data_bits` data
//! bits LSB first and a stop bit (high), each held for `baud_period` ticks.
//! The line idles high.

use eyre::{ensure, Result};
use log::{trace, warn};

pub const DATA_BITS: u8 = 8;
pub const DEFAULT_BAUD_PERIOD: u32 = 10;

/// Line timing; a paired transmitter and receiver must share it.
///
/// Only built through [`new`](Self::new) and
/// [`with_data_bits`](Self::with_data_bits), so every instance is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    baud_period: u32,
    data_bits: u8,
}

impl UartConfig {
    pub fn new(baud_period: u32) -> Result<Self> {
        let config = Self {
            baud_period,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_data_bits(self, data_bits: u8) -> Result<Self> {
        let config = Self { data_bits, ..self };
        config.validate()?;
        Ok(config)
    }

    /// Ticks each bit is held on the line.
    pub fn baud_period(&self) -> u32 {
        self.baud_period
    }

    pub fn data_bits(&self) -> u8 {
        self.data_bits
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.baud_period >= 2,
            "baud period must be at least 2 ticks, got {}",
            self.baud_period
        );
        ensure!(
            (5..=8).contains(&self.data_bits),
            "data bits must be within 5..=8, got {}",
            self.data_bits
        );
        Ok(())
    }

    /// Ticks from the first start-bit sample to the last stop-bit sample.
    pub fn frame_ticks(&self) -> u32 {
        (u32::from(self.data_bits) + 2) * self.baud_period
    }

    fn stop_index(&self) -> u8 {
        self.data_bits + 1
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baud_period: DEFAULT_BAUD_PERIOD,
            data_bits: DATA_BITS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    Idle,
    /// `bit_index` 0 is the start bit, `1..=data_bits` the payload and
    /// `data_bits + 1` the stop bit.
    Sending {
        bit_index: u8,
        byte: u8,
        ticks_left: u32,
    },
}

#[derive(Debug, Clone)]
pub struct UartTransmitter {
    config: UartConfig,
    state: TxState,
}

impl UartTransmitter {
    pub fn new(config: UartConfig) -> Self {
        Self {
            config,
            state: TxState::Idle,
        }
    }

    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.state != TxState::Idle
    }

    /// Begins a frame on the next [`sample`](Self::sample). Ignored, and
    /// returns `false`, while a frame is still on the line.
    pub fn start(&mut self, byte: u8) -> bool {
        if self.is_active() {
            return false;
        }
        trace!("uart tx start {byte:#04x}");
        self.state = TxState::Sending {
            bit_index: 0,
            byte,
            ticks_left: self.config.baud_period,
        };
        true
    }

    /// Line level for this tick.
    pub fn sample(&mut self) -> bool {
        let TxState::Sending {
            bit_index,
            byte,
            ticks_left,
        } = self.state
        else {
            return true;
        };

        let level = self.level(bit_index, byte);
        self.state = if ticks_left > 1 {
            TxState::Sending {
                bit_index,
                byte,
                ticks_left: ticks_left - 1,
            }
        } else if bit_index < self.config.stop_index() {
            TxState::Sending {
                bit_index: bit_index + 1,
                byte,
                ticks_left: self.config.baud_period,
            }
        } else {
            TxState::Idle
        };
        level
    }

    fn level(&self, bit_index: u8, byte: u8) -> bool {
        match bit_index {
            0 => false,
            i if i <= self.config.data_bits => (byte >> (i - 1)) & 1 == 1,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxState {
    Idle,
    Receiving {
        bit_index: u8,
        accumulator: u8,
        countdown: u32,
    },
}

#[derive(Debug, Clone)]
pub struct UartReceiver {
    config: UartConfig,
    state: RxState,
    framing_errors: u64,
}

impl UartReceiver {
    pub fn new(config: UartConfig) -> Self {
        Self {
            config,
            state: RxState::Idle,
            framing_errors: 0,
        }
    }

    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.state != RxState::Idle
    }

    /// Frames whose stop bit was sampled low. Those bytes are still emitted.
    pub fn framing_errors(&self) -> u64 {
        self.framing_errors
    }

    /// Feeds one tick of line level; returns a byte when a frame completes.
    pub fn sample(&mut self, level: bool) -> Option<u8> {
        let baud = self.config.baud_period;
        match self.state {
            RxState::Idle => {
                if !level {
                    // First tick of the start bit: the next sample point is
                    // the centre of data bit 0.
                    self.state = RxState::Receiving {
                        bit_index: 0,
                        accumulator: 0,
                        countdown: baud + baud / 2,
                    };
                }
                None
            }
            RxState::Receiving {
                bit_index,
                accumulator,
                countdown,
            } => {
                if countdown > 1 {
                    self.state = RxState::Receiving {
                        bit_index,
                        accumulator,
                        countdown: countdown - 1,
                    };
                    return None;
                }

                if bit_index < self.config.data_bits {
                    self.state = RxState::Receiving {
                        bit_index: bit_index + 1,
                        accumulator: accumulator | (u8::from(level) << bit_index),
                        countdown: baud,
                    };
                    return None;
                }

                if !level {
                    self.framing_errors += 1;
                    warn!("uart rx stop bit low for byte {accumulator:#04x}");
                }
                self.state = RxState::Idle;
                trace!("uart rx byte {accumulator:#04x}");
                Some(accumulator)
            }
        }
    }
}
