//! Behavioural models of the peripherals under test.
//!
//! These mirror the RTL port lists (`i_*` inputs, `o_*` outputs) and update
//! every output on the clock edge only, the way the Verilated models behave,
//! so the harnesses can run without Verilator installed.

mod clk_divider;
mod fifo;
mod test_bed;
mod uart_rx;
mod uart_tx;

pub use clk_divider::ClkDivider;
pub use fifo::WbFifo;
pub use test_bed::WbTestBed;
pub use uart_rx::WbUartRx;
pub use uart_tx::WbUartTx;

/// Read/write pointers of a FIFO whose slots live in external memory.
#[derive(Debug, Clone)]
pub(crate) struct Ring {
    capacity: usize,
    read: usize,
    write: usize,
    count: usize,
}

impl Ring {
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "FIFO capacity must be non-zero");
        Self {
            capacity,
            read: 0,
            write: 0,
            count: 0,
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new(self.capacity);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub(crate) fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    pub(crate) fn read_addr(&self) -> usize {
        self.read
    }

    /// Claims the next write slot.
    pub(crate) fn advance_write(&mut self) -> usize {
        let slot = self.write;
        self.write = (self.write + 1) % self.capacity;
        self.count += 1;
        slot
    }

    pub(crate) fn advance_read(&mut self) {
        self.read = (self.read + 1) % self.capacity;
        self.count -= 1;
    }
}
