use log::warn;

use super::Ring;
use crate::pins::{Clocked, FifoFlags, FifoMemoryPort, PopPort, PushPort, Resettable, Word};

/// `wb_fifo`: bounded FIFO with Wishbone push and pop slaves and its slots
/// in an external memory.
#[derive(Debug, Clone)]
pub struct WbFifo {
    pub i_reset_n: bool,

    pub i_wb_push_stb: bool,
    pub i_wb_push_cyc: bool,
    pub i_wb_push_data: Word,
    pub o_wb_push_ack: bool,
    pub o_wb_push_stall: bool,

    pub i_wb_pop_stb: bool,
    pub i_wb_pop_cyc: bool,
    pub o_wb_pop_data: Word,
    pub o_wb_pop_ack: bool,

    pub empty: bool,
    pub full: bool,

    pub mem_we: bool,
    pub mem_addr_w: usize,
    pub mem_addr_r: usize,
    pub mem_data_write: Word,
    pub mem_data_read: Word,

    ring: Ring,
}

impl WbFifo {
    pub fn new(capacity: usize) -> Self {
        Self {
            i_reset_n: true,
            i_wb_push_stb: false,
            i_wb_push_cyc: false,
            i_wb_push_data: 0,
            o_wb_push_ack: false,
            o_wb_push_stall: false,
            i_wb_pop_stb: false,
            i_wb_pop_cyc: false,
            o_wb_pop_data: 0,
            o_wb_pop_ack: false,
            empty: true,
            full: false,
            mem_we: false,
            mem_addr_w: 0,
            mem_addr_r: 0,
            mem_data_write: 0,
            mem_data_read: 0,
            ring: Ring::new(capacity),
        }
    }

    fn clear(&mut self) {
        self.ring.clear();
        self.o_wb_push_ack = false;
        self.o_wb_push_stall = false;
        self.o_wb_pop_ack = false;
        self.o_wb_pop_data = 0;
        self.mem_we = false;
        self.mem_addr_w = 0;
        self.mem_addr_r = 0;
        self.empty = true;
        self.full = false;
    }
}

impl Clocked for WbFifo {
    fn advance_one_clock(&mut self) {
        if !self.i_reset_n {
            self.clear();
            return;
        }

        let push = self.i_wb_push_stb && self.i_wb_push_cyc;
        let pop = self.i_wb_pop_stb && self.i_wb_pop_cyc;
        let was_full = self.ring.is_full();

        self.mem_we = false;
        self.o_wb_push_ack = false;
        self.o_wb_pop_ack = false;

        if pop && !self.ring.is_empty() {
            // mem_data_read holds the slot at the read pointer this tick.
            self.o_wb_pop_data = self.mem_data_read;
            self.ring.advance_read();
            self.o_wb_pop_ack = true;
        }

        if push {
            if was_full {
                warn!("fifo push of {:#06x} refused while full", self.i_wb_push_data);
            } else {
                self.mem_addr_w = self.ring.advance_write();
                self.mem_data_write = self.i_wb_push_data;
                self.mem_we = true;
                self.o_wb_push_ack = true;
            }
        }

        self.mem_addr_r = self.ring.read_addr();
        self.empty = self.ring.is_empty();
        self.full = self.ring.is_full();
        self.o_wb_push_stall = self.full;
    }
}

impl Resettable for WbFifo {
    fn set_reset_n(&mut self, level: bool) {
        self.i_reset_n = level;
    }
}

impl PushPort for WbFifo {
    fn set_push_stb(&mut self, level: bool) {
        self.i_wb_push_stb = level;
    }
    fn set_push_cyc(&mut self, level: bool) {
        self.i_wb_push_cyc = level;
    }
    fn set_push_data(&mut self, data: Word) {
        self.i_wb_push_data = data;
    }
    fn push_ack(&self) -> bool {
        self.o_wb_push_ack
    }
    fn push_stall(&self) -> bool {
        self.o_wb_push_stall
    }
}

impl PopPort for WbFifo {
    fn set_pop_stb(&mut self, level: bool) {
        self.i_wb_pop_stb = level;
    }
    fn set_pop_cyc(&mut self, level: bool) {
        self.i_wb_pop_cyc = level;
    }
    fn pop_data(&self) -> Word {
        self.o_wb_pop_data
    }
    fn pop_ack(&self) -> bool {
        self.o_wb_pop_ack
    }
}

impl FifoFlags for WbFifo {
    fn empty(&self) -> bool {
        self.empty
    }
    fn full(&self) -> bool {
        self.full
    }
}

impl FifoMemoryPort for WbFifo {
    fn mem_we(&self) -> bool {
        self.mem_we
    }
    fn mem_addr_w(&self) -> usize {
        self.mem_addr_w
    }
    fn mem_addr_r(&self) -> usize {
        self.mem_addr_r
    }
    fn mem_data_write(&self) -> Word {
        self.mem_data_write
    }
    fn set_mem_data_read(&mut self, data: Word) {
        self.mem_data_read = data;
    }
}
