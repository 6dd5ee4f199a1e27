use crate::memory::FifoStore;
use crate::pins::{Clocked, FifoMemoryPort, Resettable, UartRxLine};
use crate::testbench::Testbench;
use crate::uart::{UartConfig, UartTransmitter};

/// A UART receiver device fed by a [`UartTransmitter`] model, with its
/// receive FIFO in a [`FifoStore`].
#[derive(Debug)]
pub struct UartRxBench<D> {
    dut: D,
    store: FifoStore,
    tx: UartTransmitter,
    cycles: u64,
}

impl<D> UartRxBench<D>
where
    D: Clocked + Resettable + FifoMemoryPort + UartRxLine,
{
    pub fn new(dut: D, config: UartConfig, capacity: usize) -> Self {
        Self {
            dut,
            store: FifoStore::new(capacity),
            tx: UartTransmitter::new(config),
            cycles: 0,
        }
    }

    pub fn transmitter(&self) -> &UartTransmitter {
        &self.tx
    }

    /// Starts one frame, first waiting out any frame still on the line.
    pub fn send(&mut self, byte: u8) {
        while self.tx.is_active() {
            self.tick();
        }
        self.tx.start(byte);
        self.tick();
    }

    pub fn send_all(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.send(byte);
        }
    }

    /// Ticks until the transmitter has put its last bit on the line.
    pub fn flush(&mut self) {
        while self.tx.is_active() {
            self.tick();
        }
    }
}

impl<D> Testbench for UartRxBench<D>
where
    D: Clocked + Resettable + FifoMemoryPort + UartRxLine,
{
    type Device = D;

    fn device(&self) -> &D {
        &self.dut
    }

    fn device_mut(&mut self) -> &mut D {
        &mut self.dut
    }

    fn set_reset(&mut self, asserted: bool) {
        self.dut.set_reset_n(!asserted);
    }

    fn tick(&mut self) {
        self.store.react(&mut self.dut);
        self.dut.set_uart_rx(self.tx.sample());
        self.dut.advance_one_clock();
        self.cycles += 1;
    }

    fn cycles(&self) -> u64 {
        self.cycles
    }
}
