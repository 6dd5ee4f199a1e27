use eyre::Result;
use wb_sim::config::HarnessConfig;
use wb_sim::devices::{ClkDivider, WbFifo, WbUartRx, WbUartTx};
use wb_sim::fifo;
use wb_sim::harness::{divider_links, fifo_links, UartRxBench, UartTxBench};
use wb_sim::pins::{FifoFlags, UartTxLine};
use wb_sim::{scenarios, BusDriver, ReadCompletion, Testbench, UartConfig, Word};

const CAPACITY: usize = 31;
const RESET_CLOCKS: u32 = 10;

type TxBench = UartTxBench<WbUartTx, WbFifo, ClkDivider>;

fn create_rx_bench(config: UartConfig) -> UartRxBench<WbUartRx> {
    let mut bench = UartRxBench::new(WbUartRx::new(config, CAPACITY), config, CAPACITY);
    bench.reset(RESET_CLOCKS);
    bench
}

fn create_tx_bench(config: UartConfig) -> TxBench {
    let mut bench = UartTxBench::new(
        WbUartTx::new(),
        WbFifo::new(CAPACITY),
        ClkDivider::new(config.baud_period()),
        config,
        CAPACITY,
    );
    bench.reset(RESET_CLOCKS);
    bench
}

/// Pushes `text` and ticks until the line model has decoded all of it.
fn transmit(bench: &mut TxBench, text: &[u8]) -> Option<u64> {
    let frame = u64::from(bench.receiver().config().frame_ticks());
    for &byte in text {
        bench.run_until(frame * 4, |b| !b.device().o_wb_stall)?;
        fifo::push(bench, Word::from(byte));
    }
    bench.run_until((text.len() as u64 + 2) * (frame + 32), |b| {
        b.received().len() >= text.len()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uart_rx_receives_hi() {
        let config = UartConfig::default();
        let mut bench = create_rx_bench(config);
        let mut bus = BusDriver::default();

        bench.send_all(&[0x48, 0x69]);
        bench.flush();
        bench.wait_clocks(config.frame_ticks());

        assert!(!bench.device().empty());
        assert_eq!(scenarios::read_uart_fifo(&mut bench, &mut bus), b"Hi");
        assert!(bench.device().empty());
        assert_eq!(bus.reads(), 2);
    }

    #[test]
    fn test_uart_rx_with_fixed_latency_reads() {
        let config = UartConfig::default();
        let mut bench = create_rx_bench(config);
        let mut bus = BusDriver::new(ReadCompletion::FixedLatency(5));

        bench.send_all(b"ok");
        bench.flush();
        bench.wait_clocks(config.frame_ticks());
        assert_eq!(scenarios::read_uart_fifo(&mut bench, &mut bus), b"ok");
    }

    #[test]
    fn test_uart_rx_drops_bytes_past_capacity() {
        let config = UartConfig::new(4).unwrap();
        let mut bench = create_rx_bench(config);
        let mut bus = BusDriver::default();
        let text: Vec<u8> = (0..40u8).map(|i| b'a' + i % 26).collect();

        bench.send_all(&text);
        bench.flush();
        bench.wait_clocks(config.frame_ticks());

        assert!(bench.device().full());
        assert_eq!(bench.device().overruns(), 9);
        assert_eq!(scenarios::read_uart_fifo(&mut bench, &mut bus), &text[..CAPACITY]);
        assert!(!bench.device().full());
    }

    #[test]
    fn test_uart_rx_reset_discards_received_bytes() {
        let config = UartConfig::default();
        let mut bench = create_rx_bench(config);

        bench.send_all(b"xyz");
        bench.flush();
        bench.wait_clocks(config.frame_ticks());
        assert!(!bench.device().empty());

        bench.reset(RESET_CLOCKS);
        assert!(bench.device().empty());
    }

    #[test]
    fn test_uart_rx_scenario_passes() -> Result<()> {
        let config = HarnessConfig::default();
        let mut bench = create_rx_bench(config.uart);
        let mut bus = BusDriver::new(config.read_completion);
        scenarios::uart_rx_scenario(&mut bench, &mut bus, &config)
    }

    #[test]
    fn test_uart_tx_sends_hi() {
        let config = UartConfig::default();
        let mut bench = create_tx_bench(config);

        assert!(transmit(&mut bench, b"Hi").is_some());
        assert_eq!(bench.received(), b"Hi");
        assert_eq!(bench.receiver().framing_errors(), 0);

        // Let the stop bit finish and the divider be released.
        bench.wait_clocks(config.baud_period() * 2);
        assert!(!bench.device().is_busy());
        assert!(!bench.divider().is_running());
        assert!(bench.fifo().empty());
        assert!(bench.device().uart_tx());
        assert_eq!(bench.take_received(), b"Hi".to_vec());
        assert!(bench.received().is_empty());
    }

    #[test]
    fn test_uart_tx_holds_each_bit_for_one_baud_period() {
        let config = UartConfig::default();
        let baud = config.baud_period() as usize;
        let mut bench = create_tx_bench(config);

        fifo::push(&mut bench, 0x55);
        assert!(bench
            .run_until(1000, |b| !b.device().uart_tx())
            .is_some());

        let mut levels = Vec::new();
        for _ in 0..(config.frame_ticks() as usize + baud) {
            levels.push(bench.device().uart_tx());
            bench.tick();
        }

        // 0x55 alternates every bit: start 0, data 1010_1010 LSB first, stop 1.
        let mut runs = Vec::new();
        let mut run = 1;
        for pair in levels.windows(2) {
            if pair[0] == pair[1] {
                run += 1;
            } else {
                runs.push(run);
                run = 1;
            }
        }
        assert_eq!(runs.len(), 9, "level runs {runs:?}");
        assert!(runs.iter().all(|&r| r == baud), "level runs {runs:?}");
        assert!(!levels[0]);
    }

    #[test]
    fn test_uart_tx_at_other_baud_periods() {
        for baud in [2, 3, 7, 16] {
            let config = UartConfig::new(baud).unwrap();
            let mut bench = create_tx_bench(config);
            assert!(transmit(&mut bench, &[0x00, 0xff, 0xa5]).is_some(), "baud {baud}");
            assert_eq!(bench.received(), &[0x00, 0xff, 0xa5], "baud {baud}");
        }
    }

    #[test]
    fn test_uart_tx_scenario_passes() -> Result<()> {
        let config = HarnessConfig::default();
        let mut bench = create_tx_bench(config.uart);
        scenarios::uart_tx_scenario(&mut bench, &config, scenarios::HELLO.as_bytes())
    }

    #[test]
    fn test_uart_tx_links_cover_every_port() {
        let fifo_wires = fifo_links::<WbUartTx, WbFifo>();
        let names: Vec<&str> = fifo_wires.wires().iter().map(|w| w.name()).collect();
        assert_eq!(fifo_wires.len(), 10);
        assert!(names.contains(&"empty"));
        assert!(names.contains(&"pop_data"));
        assert_eq!(divider_links::<WbUartTx, ClkDivider>().len(), 3);
    }
}
