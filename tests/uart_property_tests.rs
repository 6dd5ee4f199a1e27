use proptest::prelude::*;

use wb_sim::devices::{WbFifo, WbTestBed};
use wb_sim::fifo;
use wb_sim::harness::{FifoBench, TestBedBench};
use wb_sim::memory::{AddressSpace, Ram, Rom};
use wb_sim::{BusDriver, Testbench, UartConfig, UartReceiver, UartTransmitter, Word};

/// Property testing helper functions
struct LineHelper {
    tx: UartTransmitter,
    rx: UartReceiver,
    ticks: u64,
}

impl LineHelper {
    fn new(baud_period: u32) -> Self {
        let config = UartConfig::new(baud_period).unwrap();
        Self {
            tx: UartTransmitter::new(config),
            rx: UartReceiver::new(config),
            ticks: 0,
        }
    }

    fn step(&mut self) -> Option<u8> {
        self.ticks += 1;
        let level = self.tx.sample();
        self.rx.sample(level)
    }

    /// Sends `bytes` back to back and collects whatever the receiver decodes.
    fn send(&mut self, bytes: &[u8]) -> Vec<u8> {
        let budget = u64::from(self.tx.config().frame_ticks()) * (bytes.len() as u64 + 2);
        let mut pending = bytes.iter();
        let mut received = Vec::new();
        while received.len() < bytes.len() && self.ticks < budget {
            if !self.tx.is_active() {
                if let Some(&byte) = pending.next() {
                    self.tx.start(byte);
                }
            }
            received.extend(self.step());
        }
        received
    }
}

fn small_test_bed(ram_words: usize) -> TestBedBench<WbTestBed> {
    let memory = AddressSpace::new(Rom::new(16), Ram::new(ram_words));
    TestBedBench::new(WbTestBed::new(16), memory)
}

proptest! {
    #[test]
    fn test_line_round_trip(byte in any::<u8>(), baud in 2u32..40) {
        let mut helper = LineHelper::new(baud);
        prop_assert_eq!(helper.send(&[byte]), vec![byte]);
        prop_assert_eq!(helper.rx.framing_errors(), 0);
    }

    #[test]
    fn test_line_back_to_back_frames(
        bytes in prop::collection::vec(any::<u8>(), 1..12),
        baud in 2u32..24,
    ) {
        let mut helper = LineHelper::new(baud);
        prop_assert_eq!(helper.send(&bytes), bytes.clone());
        // Back to back means no idle time between frames.
        let frame = u64::from(helper.tx.config().frame_ticks());
        prop_assert!(helper.ticks <= frame * bytes.len() as u64);
    }

    #[test]
    fn test_fifo_preserves_order(values in prop::collection::vec(1u32..=0xffff, 1..=31)) {
        let mut bench = FifoBench::new(WbFifo::new(31), 31);
        bench.reset(10);

        fifo::push_all(&mut bench, &values);
        prop_assert_eq!(fifo::status(&bench).full, values.len() == 31);
        prop_assert_eq!(fifo::pop_array(&mut bench, values.len()), values);
        prop_assert!(fifo::status(&bench).empty);
    }

    #[test]
    fn test_ram_last_write_wins(
        writes in prop::collection::vec((0usize..32, any::<u32>()), 1..16),
    ) {
        let mut bench = small_test_bed(32);
        let mut bus = BusDriver::default();
        let mut shadow = [0 as Word; 32];

        for &(offset, value) in &writes {
            let addr = bench.memory().ram_address(offset) as Word;
            bus.write(&mut bench, addr, value);
            shadow[offset] = value;
        }
        for &(offset, _) in &writes {
            let addr = bench.memory().ram_address(offset) as Word;
            prop_assert_eq!(bus.read(&mut bench, addr), shadow[offset]);
        }
    }
}
