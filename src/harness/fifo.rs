use crate::memory::FifoStore;
use crate::pins::{Clocked, FifoMemoryPort, Resettable};
use crate::testbench::Testbench;

/// A FIFO device whose slots live in a [`FifoStore`].
#[derive(Debug)]
pub struct FifoBench<D> {
    dut: D,
    store: FifoStore,
    cycles: u64,
}

impl<D> FifoBench<D> {
    pub fn new(dut: D, capacity: usize) -> Self {
        Self {
            dut,
            store: FifoStore::new(capacity),
            cycles: 0,
        }
    }

    pub fn store(&self) -> &FifoStore {
        &self.store
    }
}

impl<D> Testbench for FifoBench<D>
where
    D: Clocked + Resettable + FifoMemoryPort,
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
        self.dut.advance_one_clock();
        self.cycles += 1;
    }

    fn cycles(&self) -> u64 {
        self.cycles
    }
}
