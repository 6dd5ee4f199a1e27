use log::warn;

use crate::pins::{Clocked, MemoryAdapterPort, Resettable, WishboneSlave, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Rom(usize),
    Ram(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// The external port was strobed last edge; its answer is on the inputs.
    Access { target: Target, write: bool },
}

/// `wb_test_bed` memory adapter: one Wishbone slave in front of an external
/// ROM and RAM sharing a flat address space. A transaction stalls the bus
/// for one tick while the external port answers; ROM writes are dropped.
#[derive(Debug, Clone)]
pub struct WbTestBed {
    pub i_reset_n: bool,

    pub i_wb_mem_adapter_stb: bool,
    pub i_wb_mem_adapter_cyc: bool,
    pub i_wb_mem_adapter_we: bool,
    pub i_wb_mem_adapter_addr: Word,
    pub i_wb_mem_adapter_data: Word,
    pub o_wb_mem_adapter_data: Word,
    pub o_wb_mem_adapter_stall: bool,
    pub o_wb_mem_adapter_ack: bool,

    pub o_mem_adapter_rom_stb: bool,
    pub o_mem_adapter_rom_addr: usize,
    pub i_mem_adapter_rom_data: Word,

    pub o_mem_adapter_ram_stb: bool,
    pub o_mem_adapter_ram_wr: bool,
    pub o_mem_adapter_ram_addr: usize,
    pub o_mem_adapter_ram_data: Word,
    pub i_mem_adapter_ram_data: Word,

    rom_size: usize,
    phase: Phase,
}

impl WbTestBed {
    pub fn new(rom_size: usize) -> Self {
        Self {
            i_reset_n: true,
            i_wb_mem_adapter_stb: false,
            i_wb_mem_adapter_cyc: false,
            i_wb_mem_adapter_we: false,
            i_wb_mem_adapter_addr: 0,
            i_wb_mem_adapter_data: 0,
            o_wb_mem_adapter_data: 0,
            o_wb_mem_adapter_stall: false,
            o_wb_mem_adapter_ack: false,
            o_mem_adapter_rom_stb: false,
            o_mem_adapter_rom_addr: 0,
            i_mem_adapter_rom_data: 0,
            o_mem_adapter_ram_stb: false,
            o_mem_adapter_ram_wr: false,
            o_mem_adapter_ram_addr: 0,
            o_mem_adapter_ram_data: 0,
            i_mem_adapter_ram_data: 0,
            rom_size,
            phase: Phase::Idle,
        }
    }

    fn decode(&self, addr: Word) -> Target {
        let addr = addr as usize;
        if addr < self.rom_size {
            Target::Rom(addr)
        } else {
            Target::Ram(addr - self.rom_size)
        }
    }

    fn start(&mut self) {
        let target = self.decode(self.i_wb_mem_adapter_addr);
        let write = self.i_wb_mem_adapter_we;
        match target {
            Target::Rom(addr) if write => {
                warn!(
                    "write of {:#04x} to ROM address {addr:#04x} dropped",
                    self.i_wb_mem_adapter_data
                );
            }
            Target::Rom(addr) => {
                self.o_mem_adapter_rom_stb = true;
                self.o_mem_adapter_rom_addr = addr;
            }
            Target::Ram(addr) => {
                self.o_mem_adapter_ram_stb = true;
                self.o_mem_adapter_ram_wr = write;
                self.o_mem_adapter_ram_addr = addr;
                self.o_mem_adapter_ram_data = self.i_wb_mem_adapter_data;
            }
        }
        self.o_wb_mem_adapter_stall = true;
        self.phase = Phase::Access { target, write };
    }
}

impl Clocked for WbTestBed {
    fn advance_one_clock(&mut self) {
        self.o_mem_adapter_rom_stb = false;
        self.o_mem_adapter_ram_stb = false;
        self.o_mem_adapter_ram_wr = false;
        self.o_wb_mem_adapter_ack = false;

        if !self.i_reset_n {
            self.o_wb_mem_adapter_stall = false;
            self.phase = Phase::Idle;
            return;
        }

        match self.phase {
            Phase::Idle => {
                if self.i_wb_mem_adapter_stb && self.i_wb_mem_adapter_cyc {
                    self.start();
                }
            }
            Phase::Access { target, write } => {
                if !write {
                    self.o_wb_mem_adapter_data = match target {
                        Target::Rom(_) => self.i_mem_adapter_rom_data,
                        Target::Ram(_) => self.i_mem_adapter_ram_data,
                    };
                }
                self.o_wb_mem_adapter_ack = true;
                self.o_wb_mem_adapter_stall = false;
                self.phase = Phase::Idle;
            }
        }
    }
}

impl Resettable for WbTestBed {
    fn set_reset_n(&mut self, level: bool) {
        self.i_reset_n = level;
    }
}

impl WishboneSlave for WbTestBed {
    fn set_stb(&mut self, level: bool) {
        self.i_wb_mem_adapter_stb = level;
    }
    fn set_cyc(&mut self, level: bool) {
        self.i_wb_mem_adapter_cyc = level;
    }
    fn set_we(&mut self, level: bool) {
        self.i_wb_mem_adapter_we = level;
    }
    fn set_addr(&mut self, addr: Word) {
        self.i_wb_mem_adapter_addr = addr;
    }
    fn set_data(&mut self, data: Word) {
        self.i_wb_mem_adapter_data = data;
    }
    fn data_out(&self) -> Word {
        self.o_wb_mem_adapter_data
    }
    fn stall(&self) -> bool {
        self.o_wb_mem_adapter_stall
    }
    fn ack(&self) -> bool {
        self.o_wb_mem_adapter_ack
    }
}

impl MemoryAdapterPort for WbTestBed {
    fn rom_stb(&self) -> bool {
        self.o_mem_adapter_rom_stb
    }
    fn rom_addr(&self) -> usize {
        self.o_mem_adapter_rom_addr
    }
    fn set_rom_data(&mut self, data: Word) {
        self.i_mem_adapter_rom_data = data;
    }
    fn ram_stb(&self) -> bool {
        self.o_mem_adapter_ram_stb
    }
    fn ram_wr(&self) -> bool {
        self.o_mem_adapter_ram_wr
    }
    fn ram_addr(&self) -> usize {
        self.o_mem_adapter_ram_addr
    }
    fn ram_data_out(&self) -> Word {
        self.o_mem_adapter_ram_data
    }
    fn set_ram_data_in(&mut self, data: Word) {
        self.i_mem_adapter_ram_data = data;
    }
}
