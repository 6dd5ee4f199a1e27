//! Push/pop handshakes against a FIFO slave.
//!
//! Both handshakes are one strobe tick followed by one idle tick; there is
//! no stall phase. Neither checks the flags first: refusing a push while full
//! or defining what a pop on empty returns is up to the device.

use log::debug;

use crate::pins::{FifoFlags, PopPort, PushPort, Word};
use crate::testbench::Testbench;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoStatus {
    pub empty: bool,
    pub full: bool,
}

pub fn push<B>(bench: &mut B, value: Word)
where
    B: Testbench,
    B::Device: PushPort,
{
    let dev = bench.device_mut();
    dev.set_push_data(value);
    dev.set_push_stb(true);
    dev.set_push_cyc(true);
    bench.tick();
    let dev = bench.device_mut();
    dev.set_push_stb(false);
    dev.set_push_cyc(false);
    bench.tick();

    debug!("pushed data: {value:#06x}");
}

pub fn pop<B>(bench: &mut B) -> Word
where
    B: Testbench,
    B::Device: PopPort,
{
    let dev = bench.device_mut();
    dev.set_pop_stb(true);
    dev.set_pop_cyc(true);
    bench.tick();
    let dev = bench.device_mut();
    dev.set_pop_stb(false);
    dev.set_pop_cyc(false);
    bench.tick();

    let value = bench.device().pop_data();
    debug!("popped data: {value:#06x}");
    value
}

/// Reads the status flags; does not advance the clock.
pub fn status<B>(bench: &B) -> FifoStatus
where
    B: Testbench,
    B::Device: FifoFlags,
{
    let dev = bench.device();
    FifoStatus {
        empty: dev.empty(),
        full: dev.full(),
    }
}

pub fn push_all<B>(bench: &mut B, values: &[Word])
where
    B: Testbench,
    B::Device: PushPort,
{
    for &value in values {
        push(bench, value);
    }
}

/// Pushes `count` values produced by `next` and returns them in push order.
pub fn push_array<B, F>(bench: &mut B, count: usize, mut next: F) -> Vec<Word>
where
    B: Testbench,
    B::Device: PushPort,
    F: FnMut() -> Word,
{
    let mut pushed = Vec::with_capacity(count);
    for _ in 0..count {
        let value = next();
        push(bench, value);
        pushed.push(value);
    }
    pushed
}

pub fn pop_n<B>(bench: &mut B, count: usize)
where
    B: Testbench,
    B::Device: PopPort,
{
    for _ in 0..count {
        pop(bench);
    }
}

pub fn pop_array<B>(bench: &mut B, count: usize) -> Vec<Word>
where
    B: Testbench,
    B::Device: PopPort,
{
    (0..count).map(|_| pop(bench)).collect()
}
