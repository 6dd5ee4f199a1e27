//! Scripted scenarios for each peripheral, runnable against any device that
//! exposes the right pins.
//!
//! Each returns an error describing the first mismatch it finds.

use eyre::{ensure, eyre, Result, WrapErr};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bus::BusDriver;
use crate::config::HarnessConfig;
use crate::devices::{ClkDivider, WbFifo, WbTestBed, WbUartRx, WbUartTx};
use crate::fifo::{self, FifoStatus};
use crate::harness::{FifoBench, TestBedBench, UartRxBench, UartTxBench};
use crate::memory::{AddressSpace, Ram, Rom};
use crate::pins::{
    ClockDividerPort, Clocked, DividerMaster, FifoFlags, FifoMaster, FifoMemoryPort,
    MemoryAdapterPort, PopPort, PushPort, Resettable, UartRxLine, UartTxLine, WishboneSlave,
    Word,
};
use crate::testbench::Testbench;

/// Seeded data words in `1..=100`, reproducible across runs.
#[derive(Debug, Clone)]
pub struct Stimulus {
    rng: StdRng,
}

impl Stimulus {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_value(&mut self) -> Word {
        self.rng.gen_range(1..=100)
    }
}

pub const HELLO: &str = "Hello world!";
pub const OVERRUN_TEXT: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit sit.";

fn expect_status<B>(bench: &B, expected: FifoStatus, when: &str) -> Result<()>
where
    B: Testbench,
    B::Device: FifoFlags,
{
    let status = fifo::status(bench);
    info!("[FIFO] {when}: empty: {}, full: {}", status.empty, status.full);
    ensure!(
        status == expected,
        "{when}: expected {expected:?}, FIFO reports {status:?}"
    );
    Ok(())
}

/// Reset, push/pop round, fill to capacity, drain, then a data-integrity
/// pass over a full FIFO.
pub fn fifo_scenario<B>(bench: &mut B, config: &HarnessConfig) -> Result<()>
where
    B: Testbench,
    B::Device: PushPort + PopPort + FifoFlags,
{
    let capacity = config.fifo_capacity;
    let empty = FifoStatus {
        empty: true,
        full: false,
    };
    let holding = FifoStatus {
        empty: false,
        full: false,
    };
    let full = FifoStatus {
        empty: false,
        full: true,
    };
    let mut stimulus = Stimulus::new(1);

    bench.reset(config.reset_clocks);
    expect_status(bench, empty, "initial state")?;

    fifo::push_array(bench, 3, || stimulus.next_value());
    expect_status(bench, holding, "after initial pushes")?;
    fifo::pop_n(bench, 3);
    expect_status(bench, empty, "after subsequent pops")?;

    for pushed in 1..=capacity {
        fifo::push(bench, stimulus.next_value());
        let status = fifo::status(bench);
        ensure!(
            status.full == (pushed == capacity),
            "full flag {} after push {pushed} of {capacity}",
            status.full
        );
    }
    expect_status(bench, full, "after filling")?;

    fifo::pop(bench);
    expect_status(bench, holding, "after removing one element")?;
    fifo::pop_n(bench, capacity - 1);
    expect_status(bench, empty, "after draining")?;

    let data_in = fifo::push_array(bench, capacity, || stimulus.next_value());
    expect_status(bench, full, "after filling again")?;
    let data_out = fifo::pop_array(bench, capacity);
    expect_status(bench, empty, "after integrity check")?;
    ensure!(
        data_in == data_out,
        "data inconsistency found\n  data in:  {data_in:02X?}\n  data out: {data_out:02X?}"
    );

    Ok(())
}

/// Pops every byte a UART receiver device holds, through the bus.
pub fn read_uart_fifo<B>(bench: &mut B, bus: &mut BusDriver) -> Vec<u8>
where
    B: Testbench,
    B::Device: WishboneSlave + FifoFlags,
{
    let mut bytes = Vec::new();
    while !bench.device().empty() {
        bytes.push((bus.read(bench, 0) & 0xff) as u8);
    }
    bytes
}

/// Sends a greeting that fits the receive FIFO, then a string that overruns
/// it; only the first `capacity` bytes of the second may be stored.
pub fn uart_rx_scenario<D>(
    bench: &mut UartRxBench<D>,
    bus: &mut BusDriver,
    config: &HarnessConfig,
) -> Result<()>
where
    D: Clocked + Resettable + FifoMemoryPort + UartRxLine + WishboneSlave + FifoFlags,
{
    let settle = config.uart.frame_ticks();

    bench.reset(config.reset_clocks);
    bench.wait_clocks(config.reset_clocks);

    info!("sending {HELLO:?}");
    bench.send_all(HELLO.as_bytes());
    bench.flush();
    bench.wait_clocks(settle);
    let received = read_uart_fifo(bench, bus);
    ensure!(
        received == HELLO.as_bytes(),
        "uart rx returned {:?}",
        String::from_utf8_lossy(&received)
    );

    info!("sending {} bytes into a {}-slot FIFO", OVERRUN_TEXT.len(), config.fifo_capacity);
    bench.send_all(OVERRUN_TEXT.as_bytes());
    bench.flush();
    bench.wait_clocks(settle);
    let received = read_uart_fifo(bench, bus);
    let kept = &OVERRUN_TEXT.as_bytes()[..config.fifo_capacity.min(OVERRUN_TEXT.len())];
    ensure!(
        received == kept,
        "uart rx after overrun returned {:?}",
        String::from_utf8_lossy(&received)
    );

    Ok(())
}

/// Pushes `text` into a UART transmitter device and checks the decoded
/// serial line carries it back.
pub fn uart_tx_scenario<D, F, C>(
    bench: &mut UartTxBench<D, F, C>,
    config: &HarnessConfig,
    text: &[u8],
) -> Result<()>
where
    D: Clocked + Resettable + FifoMaster + DividerMaster + UartTxLine + PushPort,
    F: Clocked + Resettable + PushPort + PopPort + FifoFlags + FifoMemoryPort,
    C: Clocked + Resettable + ClockDividerPort,
{
    bench.reset(config.reset_clocks);
    bench.wait_clocks(config.reset_clocks);

    let frame = u64::from(config.uart.frame_ticks());
    for &byte in text {
        // The device raises stall while its queue cannot take another word.
        bench
            .run_until(frame * (config.fifo_capacity as u64 + 2), |b| {
                !b.device().push_stall()
            })
            .ok_or_else(|| eyre!("uart tx stayed stalled before {byte:#04x}"))?;
        fifo::push(bench, Word::from(byte));
    }

    let budget = (text.len() as u64 + 2) * (frame + 32);
    bench
        .run_until(budget, |b| b.received().len() >= text.len())
        .ok_or_else(|| {
            eyre!(
                "uart tx produced {} of {} bytes within {budget} clocks",
                bench.received().len(),
                text.len()
            )
        })?;
    ensure!(
        bench.received() == text,
        "uart tx line carried {:?}, expected {:?}",
        String::from_utf8_lossy(bench.received()),
        String::from_utf8_lossy(text)
    );
    Ok(())
}

/// RAM write/read-back, ROM reads against the preloaded image, and a ROM
/// write that must not stick.
pub fn test_bed_scenario<D>(
    bench: &mut TestBedBench<D>,
    bus: &mut BusDriver,
    rom_words: usize,
) -> Result<()>
where
    D: Clocked + Resettable + MemoryAdapterPort + WishboneSlave,
{
    bench.wait_clocks(100);

    let ram0 = bench.memory().ram_address(0) as Word;
    bus.write(bench, ram0, 100);
    let value = bus.read(bench, ram0);
    ensure!(value == 100, "RAM word 0 read back {value:#04x}, wrote 0x64");

    let rom_words = rom_words.min(bench.memory().rom_size());
    for addr in 0..rom_words {
        let expected = bench.memory().rom().read(addr);
        let value = bus.read(bench, addr as Word);
        ensure!(
            value == expected,
            "ROM word {addr:#x} read {value:#x}, image holds {expected:#x}"
        );
    }

    let before = bench.memory().rom().read(0);
    bus.write(bench, 0, !before);
    let after = bus.read(bench, 0);
    ensure!(after == before, "ROM word 0 changed to {after:#x} after a write");

    Ok(())
}

/// Boot image used when no ROM file is configured.
pub fn default_rom_image() -> Vec<Word> {
    (0..256).map(|i| (i * 7 + 3) & 0xff).collect()
}

pub fn build_address_space(config: &HarnessConfig) -> Result<AddressSpace> {
    let rom = match &config.rom_image {
        Some(path) => Rom::load_readmemh(config.rom_size, path)?,
        None => Rom::from_image(config.rom_size, &default_rom_image())?,
    };
    Ok(AddressSpace::new(rom, Ram::new(config.ram_size)))
}

/// Runs every scenario against the behavioural device models.
pub fn run_all(config: &HarnessConfig) -> Result<()> {
    info!("[TEST] FIFO");
    let mut bench = FifoBench::new(WbFifo::new(config.fifo_capacity), config.fifo_capacity);
    fifo_scenario(&mut bench, config).wrap_err("FIFO scenario")?;

    info!("[TEST] UART RX");
    let dut = WbUartRx::new(config.uart, config.fifo_capacity);
    let mut bench = UartRxBench::new(dut, config.uart, config.fifo_capacity);
    let mut bus = BusDriver::new(config.read_completion);
    uart_rx_scenario(&mut bench, &mut bus, config).wrap_err("UART RX scenario")?;

    info!("[TEST] UART TX");
    let mut bench = UartTxBench::new(
        WbUartTx::new(),
        WbFifo::new(config.fifo_capacity),
        ClkDivider::new(config.uart.baud_period()),
        config.uart,
        config.fifo_capacity,
    );
    uart_tx_scenario(&mut bench, config, HELLO.as_bytes()).wrap_err("UART TX scenario")?;

    info!("[TEST] TEST BED");
    let memory = build_address_space(config)?;
    let mut bench = TestBedBench::new(WbTestBed::new(config.rom_size), memory);
    let mut bus = BusDriver::new(config.read_completion);
    test_bed_scenario(&mut bench, &mut bus, 64).wrap_err("test bed scenario")?;

    Ok(())
}
