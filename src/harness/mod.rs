//! Testbenches pairing a device under test with the peripheral models it
//! expects on its boundary.

mod fifo;
mod test_bed;
mod uart_rx;
mod uart_tx;

pub use fifo::FifoBench;
pub use test_bed::TestBedBench;
pub use uart_rx::UartRxBench;
pub use uart_tx::{divider_links, fifo_links, UartTxBench};
