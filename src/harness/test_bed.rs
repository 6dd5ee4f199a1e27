use crate::memory::AddressSpace;
use crate::pins::{Clocked, MemoryAdapterPort, Resettable};
use crate::testbench::Testbench;

/// A memory adapter backed by an [`AddressSpace`] of ROM and RAM.
#[derive(Debug)]
pub struct TestBedBench<D> {
    dut: D,
    memory: AddressSpace,
    cycles: u64,
}

impl<D> TestBedBench<D> {
    pub fn new(dut: D, memory: AddressSpace) -> Self {
        Self {
            dut,
            memory,
            cycles: 0,
        }
    }

    pub fn memory(&self) -> &AddressSpace {
        &self.memory
    }
}

impl<D> Testbench for TestBedBench<D>
where
    D: Clocked + Resettable + MemoryAdapterPort,
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
        self.memory.react(&mut self.dut);
        self.dut.advance_one_clock();
        self.cycles += 1;
    }

    fn cycles(&self) -> u64 {
        self.cycles
    }
}
