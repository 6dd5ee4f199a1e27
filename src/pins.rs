//! Named-signal capability traits.
//!
//! A device under test exposes its boundary through these traits, one per
//! port group. Drivers, memory models and the interconnect are written
//! against the traits, so the same code serves the behavioural models in
//! [`crate::devices`] and a Verilated RTL model alike.
//!
//! Setters drive an input pin for the next clock edge; getters read an
//! output pin as left by the last clock edge.

/// Width of a bus data word.
pub type Word = u32;

/// The clock-step primitive: one full clock edge of the model.
pub trait Clocked {
    fn advance_one_clock(&mut self);
}

/// Active-low synchronous reset input.
pub trait Resettable {
    fn set_reset_n(&mut self, level: bool);
}

/// Wishbone slave: `stb`, `cyc`, `we`, `addr`, `data_in`, `data_out`,
/// `stall`, `ack`.
pub trait WishboneSlave {
    fn set_stb(&mut self, level: bool);
    fn set_cyc(&mut self, level: bool);
    fn set_we(&mut self, level: bool);
    fn set_addr(&mut self, addr: Word);
    fn set_data(&mut self, data: Word);
    fn data_out(&self) -> Word;
    fn stall(&self) -> bool;
    fn ack(&self) -> bool;
}

/// Push side of a FIFO slave.
pub trait PushPort {
    fn set_push_stb(&mut self, level: bool);
    fn set_push_cyc(&mut self, level: bool);
    fn set_push_data(&mut self, data: Word);
    fn push_ack(&self) -> bool;
    fn push_stall(&self) -> bool;
}

/// Pop side of a FIFO slave.
pub trait PopPort {
    fn set_pop_stb(&mut self, level: bool);
    fn set_pop_cyc(&mut self, level: bool);
    fn pop_data(&self) -> Word;
    fn pop_ack(&self) -> bool;
}

/// FIFO status outputs.
pub trait FifoFlags {
    fn empty(&self) -> bool;
    fn full(&self) -> bool;
}

/// Two-port memory interface a FIFO uses to reach its backing store.
pub trait FifoMemoryPort {
    fn mem_we(&self) -> bool;
    fn mem_addr_w(&self) -> usize;
    fn mem_addr_r(&self) -> usize;
    fn mem_data_write(&self) -> Word;
    fn set_mem_data_read(&mut self, data: Word);
}

/// External ROM and RAM ports of a memory adapter (`o_mem_adapter_*` /
/// `i_mem_adapter_*`).
pub trait MemoryAdapterPort {
    fn rom_stb(&self) -> bool;
    fn rom_addr(&self) -> usize;
    fn set_rom_data(&mut self, data: Word);

    fn ram_stb(&self) -> bool;
    fn ram_wr(&self) -> bool;
    fn ram_addr(&self) -> usize;
    fn ram_data_out(&self) -> Word;
    fn set_ram_data_in(&mut self, data: Word);
}

/// Serial output of a UART transmitter device.
pub trait UartTxLine {
    fn uart_tx(&self) -> bool;
}

/// Serial input of a UART receiver device.
pub trait UartRxLine {
    fn set_uart_rx(&mut self, level: bool);
}

/// Master side of a device that pushes into and pops from an external FIFO.
pub trait FifoMaster {
    fn push_fifo_stb(&self) -> bool;
    fn push_fifo_cyc(&self) -> bool;
    fn push_fifo_data(&self) -> Word;
    fn set_push_fifo_ack(&mut self, level: bool);
    fn set_push_fifo_stall(&mut self, level: bool);

    fn pop_fifo_stb(&self) -> bool;
    fn pop_fifo_cyc(&self) -> bool;
    fn set_pop_fifo_data(&mut self, data: Word);
    fn set_pop_fifo_ack(&mut self, level: bool);
    fn set_fifo_empty(&mut self, level: bool);
}

/// Device side of a clock divider connection.
pub trait DividerMaster {
    fn clk_div_start_stb(&self) -> bool;
    fn clk_div_reset_stb(&self) -> bool;
    fn set_clk_div_clk(&mut self, level: bool);
}

/// Clock divider peripheral.
pub trait ClockDividerPort {
    fn set_start_stb(&mut self, level: bool);
    fn set_reset_stb(&mut self, level: bool);
    fn div_clk(&self) -> bool;
}
