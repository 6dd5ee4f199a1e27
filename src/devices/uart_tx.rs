use log::{debug, warn};

use crate::pins::{
    Clocked, DividerMaster, FifoMaster, PushPort, Resettable, UartTxLine, Word,
};
use crate::signals::Edge;
use crate::uart::DATA_BITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    AwaitingPop,
    /// Bits advance on rising edges of the divided clock. `edges` counts
    /// edges seen so far: edge 1 puts the start bit on the line.
    Framing { byte: u8, edges: u8 },
}

/// `wb_uart_tx`: words written to its Wishbone slave are forwarded into an
/// external FIFO; the transmitter pops them back one at a time and shifts
/// them out on `uart_tx`, one bit per divided-clock period.
#[derive(Debug, Clone)]
pub struct WbUartTx {
    pub i_reset_n: bool,

    pub i_wb_stb: bool,
    pub i_wb_cyc: bool,
    pub i_wb_data: Word,
    pub o_wb_ack: bool,
    pub o_wb_stall: bool,

    pub o_wb_push_fifo_stb: bool,
    pub o_wb_push_fifo_cyc: bool,
    pub o_wb_push_fifo_data: Word,
    pub i_wb_push_fifo_ack: bool,
    pub i_wb_push_fifo_stall: bool,

    pub o_wb_pop_fifo_stb: bool,
    pub o_wb_pop_fifo_cyc: bool,
    pub i_wb_pop_fifo_data: Word,
    pub i_wb_pop_fifo_ack: bool,
    pub i_fifo_empty: bool,

    pub o_clk_div_start_stb: bool,
    pub o_clk_div_reset_stb: bool,
    pub i_clk_div_clk: bool,

    pub uart_tx: bool,

    pending: Option<Word>,
    phase: Phase,
    last_div_clk: bool,
}

impl Default for WbUartTx {
    fn default() -> Self {
        Self::new()
    }
}

impl WbUartTx {
    pub fn new() -> Self {
        Self {
            i_reset_n: true,
            i_wb_stb: false,
            i_wb_cyc: false,
            i_wb_data: 0,
            o_wb_ack: false,
            o_wb_stall: false,
            o_wb_push_fifo_stb: false,
            o_wb_push_fifo_cyc: false,
            o_wb_push_fifo_data: 0,
            i_wb_push_fifo_ack: false,
            i_wb_push_fifo_stall: false,
            o_wb_pop_fifo_stb: false,
            o_wb_pop_fifo_cyc: false,
            i_wb_pop_fifo_data: 0,
            i_wb_pop_fifo_ack: false,
            i_fifo_empty: true,
            o_clk_div_start_stb: false,
            o_clk_div_reset_stb: false,
            i_clk_div_clk: false,
            uart_tx: true,
            pending: None,
            phase: Phase::Idle,
            last_div_clk: false,
        }
    }

    /// `true` while a frame is being shifted out or a pop is outstanding.
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    fn clear(&mut self) {
        self.o_wb_ack = false;
        self.o_wb_stall = false;
        self.o_wb_push_fifo_stb = false;
        self.o_wb_push_fifo_cyc = false;
        self.o_wb_pop_fifo_stb = false;
        self.o_wb_pop_fifo_cyc = false;
        self.o_clk_div_start_stb = false;
        self.o_clk_div_reset_stb = false;
        self.uart_tx = true;
        self.pending = None;
        self.phase = Phase::Idle;
        self.last_div_clk = false;
    }

    fn forward_pending(&mut self) {
        self.o_wb_push_fifo_stb = false;
        self.o_wb_push_fifo_cyc = false;
        if self.i_wb_push_fifo_stall {
            return;
        }
        if let Some(data) = self.pending.take() {
            self.o_wb_push_fifo_data = data;
            self.o_wb_push_fifo_stb = true;
            self.o_wb_push_fifo_cyc = true;
        }
    }

    fn accept_write(&mut self) {
        self.o_wb_ack = false;
        if !(self.i_wb_stb && self.i_wb_cyc) {
            return;
        }
        if self.pending.is_some() {
            warn!("uart tx dropped {:#04x}, forward slot busy", self.i_wb_data);
            return;
        }
        self.pending = Some(self.i_wb_data);
        self.o_wb_ack = true;
    }

    fn step_transmitter(&mut self, div_clk: Edge) {
        self.o_wb_pop_fifo_stb = false;
        self.o_clk_div_start_stb = false;
        self.o_clk_div_reset_stb = false;

        match self.phase {
            Phase::Idle => {
                if !self.i_fifo_empty {
                    self.o_wb_pop_fifo_stb = true;
                    self.o_wb_pop_fifo_cyc = true;
                    self.phase = Phase::AwaitingPop;
                }
            }
            Phase::AwaitingPop => {
                if self.i_wb_pop_fifo_ack {
                    let byte = (self.i_wb_pop_fifo_data & 0xff) as u8;
                    debug!("uart tx sending {byte:#04x}");
                    self.o_wb_pop_fifo_cyc = false;
                    self.o_clk_div_start_stb = true;
                    self.phase = Phase::Framing { byte, edges: 0 };
                }
            }
            Phase::Framing { byte, edges } => {
                if div_clk != Edge::Rising {
                    return;
                }
                let edges = edges + 1;
                let bit_index = edges - 1;
                match bit_index {
                    0 => self.uart_tx = false,
                    i if i <= DATA_BITS => self.uart_tx = (byte >> (i - 1)) & 1 == 1,
                    i if i == DATA_BITS + 1 => self.uart_tx = true,
                    _ => {
                        self.o_clk_div_reset_stb = true;
                        self.phase = Phase::Idle;
                        return;
                    }
                }
                self.phase = Phase::Framing { byte, edges };
            }
        }
    }
}

impl Clocked for WbUartTx {
    fn advance_one_clock(&mut self) {
        if !self.i_reset_n {
            self.clear();
            return;
        }

        let div_clk = Edge::between(self.last_div_clk, self.i_clk_div_clk);
        self.last_div_clk = self.i_clk_div_clk;

        self.forward_pending();
        self.accept_write();
        self.o_wb_stall = self.pending.is_some();
        self.step_transmitter(div_clk);
    }
}

impl Resettable for WbUartTx {
    fn set_reset_n(&mut self, level: bool) {
        self.i_reset_n = level;
    }
}

/// The slave side takes the same single-tick handshake as a FIFO push.
impl PushPort for WbUartTx {
    fn set_push_stb(&mut self, level: bool) {
        self.i_wb_stb = level;
    }
    fn set_push_cyc(&mut self, level: bool) {
        self.i_wb_cyc = level;
    }
    fn set_push_data(&mut self, data: Word) {
        self.i_wb_data = data;
    }
    fn push_ack(&self) -> bool {
        self.o_wb_ack
    }
    fn push_stall(&self) -> bool {
        self.o_wb_stall
    }
}

impl FifoMaster for WbUartTx {
    fn push_fifo_stb(&self) -> bool {
        self.o_wb_push_fifo_stb
    }
    fn push_fifo_cyc(&self) -> bool {
        self.o_wb_push_fifo_cyc
    }
    fn push_fifo_data(&self) -> Word {
        self.o_wb_push_fifo_data
    }
    fn set_push_fifo_ack(&mut self, level: bool) {
        self.i_wb_push_fifo_ack = level;
    }
    fn set_push_fifo_stall(&mut self, level: bool) {
        self.i_wb_push_fifo_stall = level;
    }
    fn pop_fifo_stb(&self) -> bool {
        self.o_wb_pop_fifo_stb
    }
    fn pop_fifo_cyc(&self) -> bool {
        self.o_wb_pop_fifo_cyc
    }
    fn set_pop_fifo_data(&mut self, data: Word) {
        self.i_wb_pop_fifo_data = data;
    }
    fn set_pop_fifo_ack(&mut self, level: bool) {
        self.i_wb_pop_fifo_ack = level;
    }
    fn set_fifo_empty(&mut self, level: bool) {
        self.i_fifo_empty = level;
    }
}

impl DividerMaster for WbUartTx {
    fn clk_div_start_stb(&self) -> bool {
        self.o_clk_div_start_stb
    }
    fn clk_div_reset_stb(&self) -> bool {
        self.o_clk_div_reset_stb
    }
    fn set_clk_div_clk(&mut self, level: bool) {
        self.i_clk_div_clk = level;
    }
}

impl UartTxLine for WbUartTx {
    fn uart_tx(&self) -> bool {
        self.uart_tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A transmitter that has just popped `byte` and started its divider.
    fn framing(byte: u8) -> WbUartTx {
        let mut tx = WbUartTx::new();
        tx.i_fifo_empty = false;
        tx.advance_one_clock();
        assert!(tx.o_wb_pop_fifo_stb);

        tx.i_fifo_empty = true;
        tx.i_wb_pop_fifo_ack = true;
        tx.i_wb_pop_fifo_data = Word::from(byte);
        tx.advance_one_clock();
        assert!(tx.o_clk_div_start_stb);
        tx.i_wb_pop_fifo_ack = false;
        tx
    }

    fn clock(tx: &mut WbUartTx, div_clk: bool) {
        tx.i_clk_div_clk = div_clk;
        tx.advance_one_clock();
    }

    #[test]
    fn test_bits_advance_only_on_rising_edges() {
        let mut tx = framing(0x01);
        assert!(tx.uart_tx());

        clock(&mut tx, true);
        assert!(!tx.uart_tx(), "start bit on the first rising edge");

        clock(&mut tx, true);
        assert!(!tx.uart_tx(), "held while the divided clock stays high");
        clock(&mut tx, false);
        assert!(!tx.uart_tx(), "falling edge does not advance");
        clock(&mut tx, false);

        clock(&mut tx, true);
        assert!(tx.uart_tx(), "data bit 0 of 0x01");
        clock(&mut tx, false);
        clock(&mut tx, true);
        assert!(!tx.uart_tx(), "data bit 1 of 0x01");
    }

    #[test]
    fn test_frame_releases_divider_after_stop_bit() {
        let mut tx = framing(0x00);
        for edge in 1..=10 {
            clock(&mut tx, true);
            assert!(tx.is_busy(), "busy at edge {edge}");
            assert!(!tx.o_clk_div_reset_stb);
            clock(&mut tx, false);
        }
        assert!(tx.uart_tx(), "stop bit");

        clock(&mut tx, true);
        assert!(tx.o_clk_div_reset_stb);
        assert!(!tx.is_busy());
        assert!(tx.uart_tx());
    }
}
