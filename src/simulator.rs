//! Verilator binding of the RTL in `rtl/`.

use camino::Utf8Path;
use eyre::Result;
use marlin::{
    verilator::{VerilatorRuntime, VerilatorRuntimeOptions},
    verilog::prelude::*,
};

use crate::pins::{Clocked, FifoFlags, FifoMemoryPort, PopPort, PushPort, Resettable, Word};

/// Depth the RTL FIFO is built with.
pub const RTL_FIFO_DEPTH: usize = 31;

#[verilog(src = "rtl/wb_fifo.sv", name = "wb_fifo")]
pub struct WbFifoRtl;

pub fn create_runtime() -> Result<VerilatorRuntime> {
    let include_paths = [Utf8Path::new("rtl")];
    let src_files = [Utf8Path::new("rtl/wb_fifo.sv")];

    VerilatorRuntime::new(
        Utf8Path::new("artifacts"),
        &src_files,
        &include_paths,
        [],
        VerilatorRuntimeOptions::default_logging(),
    )
    .map_err(|e| eyre::eyre!("Failed to create Verilator runtime for rtl/wb_fifo.sv: {}", e))
}

fn bit(level: bool) -> u8 {
    u8::from(level)
}

impl Clocked for WbFifoRtl<'_> {
    fn advance_one_clock(&mut self) {
        // Rising edge
        self.clk = 1;
        self.eval();

        // Falling edge
        self.clk = 0;
        self.eval();
    }
}

impl Resettable for WbFifoRtl<'_> {
    fn set_reset_n(&mut self, level: bool) {
        self.i_reset_n = bit(level);
    }
}

impl PushPort for WbFifoRtl<'_> {
    fn set_push_stb(&mut self, level: bool) {
        self.i_wb_push_stb = bit(level);
    }
    fn set_push_cyc(&mut self, level: bool) {
        self.i_wb_push_cyc = bit(level);
    }
    fn set_push_data(&mut self, data: Word) {
        self.i_wb_push_data = (data & 0xff) as u8;
    }
    fn push_ack(&self) -> bool {
        self.o_wb_push_ack != 0
    }
    fn push_stall(&self) -> bool {
        self.o_wb_push_stall != 0
    }
}

impl PopPort for WbFifoRtl<'_> {
    fn set_pop_stb(&mut self, level: bool) {
        self.i_wb_pop_stb = bit(level);
    }
    fn set_pop_cyc(&mut self, level: bool) {
        self.i_wb_pop_cyc = bit(level);
    }
    fn pop_data(&self) -> Word {
        Word::from(self.o_wb_pop_data)
    }
    fn pop_ack(&self) -> bool {
        self.o_wb_pop_ack != 0
    }
}

impl FifoFlags for WbFifoRtl<'_> {
    fn empty(&self) -> bool {
        self.empty != 0
    }
    fn full(&self) -> bool {
        self.full != 0
    }
}

impl FifoMemoryPort for WbFifoRtl<'_> {
    fn mem_we(&self) -> bool {
        self.mem_we != 0
    }
    fn mem_addr_w(&self) -> usize {
        usize::from(self.mem_addr_w)
    }
    fn mem_addr_r(&self) -> usize {
        usize::from(self.mem_addr_r)
    }
    fn mem_data_write(&self) -> Word {
        Word::from(self.mem_data_write)
    }
    fn set_mem_data_read(&mut self, data: Word) {
        self.mem_data_read = (data & 0xff) as u8;
    }
}
