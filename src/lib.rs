pub mod bus;
pub mod config;
pub mod devices;
pub mod fifo;
pub mod harness;
pub mod interconnect;
pub mod memory;
pub mod pins;
pub mod scenarios;
pub mod signals;
#[cfg(feature = "verilator")]
pub mod simulator;
pub mod testbench;
pub mod uart;

pub use bus::{BusDriver, ReadCompletion};
pub use config::HarnessConfig;
pub use pins::Word;
pub use testbench::Testbench;
pub use uart::{UartConfig, UartReceiver, UartTransmitter};
