use log::debug;

use crate::interconnect::Interconnect;
use crate::memory::FifoStore;
use crate::pins::{
    ClockDividerPort, Clocked, DividerMaster, FifoFlags, FifoMaster, FifoMemoryPort, PopPort,
    PushPort, Resettable, UartTxLine,
};
use crate::testbench::Testbench;
use crate::uart::{UartConfig, UartReceiver};

/// Wires a FIFO-mastering device to both slave ports of a FIFO peripheral.
pub fn fifo_links<D, F>() -> Interconnect<D, F>
where
    D: FifoMaster,
    F: PushPort + PopPort + FifoFlags,
{
    Interconnect::new()
        .wire("push_ack", |d: &mut D, f: &mut F| d.set_push_fifo_ack(f.push_ack()))
        .wire("push_stall", |d: &mut D, f: &mut F| d.set_push_fifo_stall(f.push_stall()))
        .wire("push_stb", |d: &mut D, f: &mut F| f.set_push_stb(d.push_fifo_stb()))
        .wire("push_data", |d: &mut D, f: &mut F| f.set_push_data(d.push_fifo_data()))
        .wire("push_cyc", |d: &mut D, f: &mut F| f.set_push_cyc(d.push_fifo_cyc()))
        .wire("pop_data", |d: &mut D, f: &mut F| d.set_pop_fifo_data(f.pop_data()))
        .wire("pop_ack", |d: &mut D, f: &mut F| d.set_pop_fifo_ack(f.pop_ack()))
        .wire("empty", |d: &mut D, f: &mut F| d.set_fifo_empty(f.empty()))
        .wire("pop_stb", |d: &mut D, f: &mut F| f.set_pop_stb(d.pop_fifo_stb()))
        .wire("pop_cyc", |d: &mut D, f: &mut F| f.set_pop_cyc(d.pop_fifo_cyc()))
}

/// Wires a device to the clock divider that paces it.
pub fn divider_links<D, C>() -> Interconnect<D, C>
where
    D: DividerMaster,
    C: ClockDividerPort,
{
    Interconnect::new()
        .wire("div_clk", |d: &mut D, c: &mut C| d.set_clk_div_clk(c.div_clk()))
        .wire("start_stb", |d: &mut D, c: &mut C| c.set_start_stb(d.clk_div_start_stb()))
        .wire("reset_stb", |d: &mut D, c: &mut C| c.set_reset_stb(d.clk_div_reset_stb()))
}

/// A UART transmitter device whose queue is a separate FIFO peripheral and
/// whose baud clock comes from a separate divider peripheral. The serial
/// output is decoded by a [`UartReceiver`] model.
#[derive(Debug)]
pub struct UartTxBench<D, F, C> {
    dut: D,
    fifo: F,
    divider: C,
    store: FifoStore,
    fifo_wires: Interconnect<D, F>,
    divider_wires: Interconnect<D, C>,
    rx: UartReceiver,
    received: Vec<u8>,
    cycles: u64,
}

impl<D, F, C> UartTxBench<D, F, C>
where
    D: Clocked + Resettable + FifoMaster + DividerMaster + UartTxLine,
    F: Clocked + Resettable + PushPort + PopPort + FifoFlags + FifoMemoryPort,
    C: Clocked + Resettable + ClockDividerPort,
{
    pub fn new(dut: D, fifo: F, divider: C, config: UartConfig, capacity: usize) -> Self {
        Self {
            dut,
            fifo,
            divider,
            store: FifoStore::new(capacity),
            fifo_wires: fifo_links(),
            divider_wires: divider_links(),
            rx: UartReceiver::new(config),
            received: Vec::new(),
            cycles: 0,
        }
    }

    pub fn fifo(&self) -> &F {
        &self.fifo
    }

    pub fn divider(&self) -> &C {
        &self.divider
    }

    pub fn receiver(&self) -> &UartReceiver {
        &self.rx
    }

    /// Bytes decoded from the serial line so far.
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    pub fn take_received(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.received)
    }
}

impl<D, F, C> Testbench for UartTxBench<D, F, C>
where
    D: Clocked + Resettable + FifoMaster + DividerMaster + UartTxLine,
    F: Clocked + Resettable + PushPort + PopPort + FifoFlags + FifoMemoryPort,
    C: Clocked + Resettable + ClockDividerPort,
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
        self.fifo.set_reset_n(!asserted);
        self.divider.set_reset_n(!asserted);
    }

    fn tick(&mut self) {
        self.fifo_wires.propagate(&mut self.dut, &mut self.fifo);
        self.divider_wires.propagate(&mut self.dut, &mut self.divider);
        self.store.react(&mut self.fifo);

        self.divider.advance_one_clock();
        self.fifo.advance_one_clock();
        self.dut.advance_one_clock();
        self.cycles += 1;

        if let Some(byte) = self.rx.sample(self.dut.uart_tx()) {
            debug!("captured uart byte {byte:#04x}");
            self.received.push(byte);
        }
    }

    fn cycles(&self) -> u64 {
        self.cycles
    }
}
