use log::{debug, warn};

use super::Ring;
use crate::pins::{
    Clocked, FifoFlags, FifoMemoryPort, Resettable, UartRxLine, WishboneSlave, Word,
};
use crate::uart::{UartConfig, UartReceiver};

/// `wb_uart_rx`: decodes `uart_rx` into a FIFO kept in external memory.
/// A Wishbone read pops the oldest byte; bytes arriving while the FIFO is
/// full are dropped.
#[derive(Debug, Clone)]
pub struct WbUartRx {
    pub i_reset_n: bool,
    pub uart_rx: bool,

    pub i_wb_stb: bool,
    pub i_wb_cyc: bool,
    pub i_wb_we: bool,
    pub i_wb_addr: Word,
    pub i_wb_data: Word,
    pub o_wb_data: Word,
    pub o_wb_ack: bool,

    pub uart_empty: bool,
    pub uart_full: bool,

    pub o_fifo_mem_we: bool,
    pub o_fifo_mem_addr_w: usize,
    pub o_fifo_mem_addr_r: usize,
    pub o_fifo_mem_data_write: Word,
    pub i_fifo_mem_data_read: Word,

    receiver: UartReceiver,
    ring: Ring,
    overruns: u64,
}

impl WbUartRx {
    pub fn new(config: UartConfig, capacity: usize) -> Self {
        Self {
            i_reset_n: true,
            uart_rx: true,
            i_wb_stb: false,
            i_wb_cyc: false,
            i_wb_we: false,
            i_wb_addr: 0,
            i_wb_data: 0,
            o_wb_data: 0,
            o_wb_ack: false,
            uart_empty: true,
            uart_full: false,
            o_fifo_mem_we: false,
            o_fifo_mem_addr_w: 0,
            o_fifo_mem_addr_r: 0,
            o_fifo_mem_data_write: 0,
            i_fifo_mem_data_read: 0,
            receiver: UartReceiver::new(config),
            ring: Ring::new(capacity),
            overruns: 0,
        }
    }

    /// Bytes dropped because the FIFO was full.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    fn clear(&mut self) {
        self.receiver = UartReceiver::new(*self.receiver.config());
        self.ring.clear();
        self.o_wb_data = 0;
        self.o_wb_ack = false;
        self.o_fifo_mem_we = false;
        self.o_fifo_mem_addr_w = 0;
        self.o_fifo_mem_addr_r = 0;
        self.uart_empty = true;
        self.uart_full = false;
    }
}

impl Clocked for WbUartRx {
    fn advance_one_clock(&mut self) {
        if !self.i_reset_n {
            self.clear();
            return;
        }

        self.o_wb_ack = false;
        self.o_fifo_mem_we = false;

        if self.i_wb_stb && self.i_wb_cyc {
            if self.i_wb_we {
                warn!("uart rx ignores write of {:#04x}", self.i_wb_data);
            } else if !self.ring.is_empty() {
                self.o_wb_data = self.i_fifo_mem_data_read;
                self.ring.advance_read();
            }
            self.o_wb_ack = true;
        }

        if let Some(byte) = self.receiver.sample(self.uart_rx) {
            if self.ring.is_full() {
                self.overruns += 1;
                warn!("uart rx overrun, dropped {byte:#04x}");
            } else {
                self.o_fifo_mem_addr_w = self.ring.advance_write();
                self.o_fifo_mem_data_write = Word::from(byte);
                self.o_fifo_mem_we = true;
                debug!("uart rx stored {byte:#04x}");
            }
        }

        self.o_fifo_mem_addr_r = self.ring.read_addr();
        self.uart_empty = self.ring.is_empty();
        self.uart_full = self.ring.is_full();
    }
}

impl Resettable for WbUartRx {
    fn set_reset_n(&mut self, level: bool) {
        self.i_reset_n = level;
    }
}

impl UartRxLine for WbUartRx {
    fn set_uart_rx(&mut self, level: bool) {
        self.uart_rx = level;
    }
}

impl WishboneSlave for WbUartRx {
    fn set_stb(&mut self, level: bool) {
        self.i_wb_stb = level;
    }
    fn set_cyc(&mut self, level: bool) {
        self.i_wb_cyc = level;
    }
    fn set_we(&mut self, level: bool) {
        self.i_wb_we = level;
    }
    fn set_addr(&mut self, addr: Word) {
        self.i_wb_addr = addr;
    }
    fn set_data(&mut self, data: Word) {
        self.i_wb_data = data;
    }
    fn data_out(&self) -> Word {
        self.o_wb_data
    }
    fn stall(&self) -> bool {
        false
    }
    fn ack(&self) -> bool {
        self.o_wb_ack
    }
}

impl FifoFlags for WbUartRx {
    fn empty(&self) -> bool {
        self.uart_empty
    }
    fn full(&self) -> bool {
        self.uart_full
    }
}

impl FifoMemoryPort for WbUartRx {
    fn mem_we(&self) -> bool {
        self.o_fifo_mem_we
    }
    fn mem_addr_w(&self) -> usize {
        self.o_fifo_mem_addr_w
    }
    fn mem_addr_r(&self) -> usize {
        self.o_fifo_mem_addr_r
    }
    fn mem_data_write(&self) -> Word {
        self.o_fifo_mem_data_write
    }
    fn set_mem_data_read(&mut self, data: Word) {
        self.i_fifo_mem_data_read = data;
    }
}
