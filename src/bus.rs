//! Wishbone single-word transaction driver.
//!
//! Every wait is a loop of [`Testbench::tick`] calls; there is no timeout. A
//! slave that never drops `stall` (or never acks, under
//! [`ReadCompletion::Acknowledge`]) blocks the caller forever.

use log::{debug, trace};

use crate::pins::{WishboneSlave, Word};
use crate::testbench::Testbench;

/// Fixed post-drain wait of the legacy read timing.
pub const LEGACY_READ_LATENCY: u32 = 5;

/// How a read decides the slave has returned its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadCompletion {
    /// Tick until `ack` is seen and capture `data_out` on that tick.
    #[default]
    Acknowledge,
    /// Tick a fixed number of times after the drain tick, then sample.
    FixedLatency(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusState {
    Idle,
    WaitForReady,
    Strobe,
    Drain,
    Done,
}

#[derive(Debug, Clone)]
pub struct BusDriver {
    completion: ReadCompletion,
    state: BusState,
    reads: u64,
    writes: u64,
}

impl Default for BusDriver {
    fn default() -> Self {
        Self::new(ReadCompletion::default())
    }
}

impl BusDriver {
    pub fn new(completion: ReadCompletion) -> Self {
        Self {
            completion,
            state: BusState::Idle,
            reads: 0,
            writes: 0,
        }
    }

    pub fn completion(&self) -> ReadCompletion {
        self.completion
    }

    /// Phase of the transaction in flight, `Done` once one has finished.
    pub fn state(&self) -> BusState {
        self.state
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn write<B>(&mut self, bench: &mut B, addr: Word, data: Word)
    where
        B: Testbench,
        B::Device: WishboneSlave,
    {
        self.wait_for_ready(bench);

        self.enter(BusState::Strobe);
        let dev = bench.device_mut();
        dev.set_cyc(true);
        dev.set_stb(true);
        dev.set_we(true);
        dev.set_addr(addr);
        dev.set_data(data);
        bench.tick();
        let dev = bench.device_mut();
        dev.set_stb(false);
        dev.set_we(false);

        self.enter(BusState::Drain);
        bench.tick();

        self.wait_for_ready(bench);
        bench.device_mut().set_cyc(false);

        self.enter(BusState::Done);
        self.writes += 1;
        debug!("bus write [{addr:#06x}] <- {data:#04x}");
    }

    pub fn read<B>(&mut self, bench: &mut B, addr: Word) -> Word
    where
        B: Testbench,
        B::Device: WishboneSlave,
    {
        self.wait_for_ready(bench);

        self.enter(BusState::Strobe);
        let dev = bench.device_mut();
        dev.set_cyc(true);
        dev.set_stb(true);
        dev.set_we(false);
        dev.set_addr(addr);
        bench.tick();
        let mut captured = acked_data(bench.device());
        bench.device_mut().set_stb(false);

        self.enter(BusState::Drain);
        bench.tick();

        let value = match self.completion {
            ReadCompletion::Acknowledge => loop {
                if let Some(value) = captured.or_else(|| acked_data(bench.device())) {
                    break value;
                }
                bench.tick();
                captured = acked_data(bench.device());
            },
            ReadCompletion::FixedLatency(clocks) => {
                bench.wait_clocks(clocks);
                bench.device().data_out()
            }
        };
        bench.device_mut().set_cyc(false);

        self.enter(BusState::Done);
        self.reads += 1;
        debug!("bus read [{addr:#06x}] -> {value:#04x}");
        value
    }

    /// Ticks while the slave stalls; nothing is driven meanwhile.
    fn wait_for_ready<B>(&mut self, bench: &mut B)
    where
        B: Testbench,
        B::Device: WishboneSlave,
    {
        self.enter(BusState::WaitForReady);
        while bench.device().stall() {
            bench.tick();
        }
    }

    fn enter(&mut self, state: BusState) {
        trace!("bus {:?} -> {:?}", self.state, state);
        self.state = state;
    }
}

fn acked_data<S: WishboneSlave>(slave: &S) -> Option<Word> {
    slave.ack().then(|| slave.data_out())
}
