use clap::Parser;
use eyre::Result;
use wb_sim::config::HarnessArgs;
use wb_sim::scenarios;

fn main() -> Result<()> {
    env_logger::init();
    println!("🚀 Wishbone peripheral harness starting...");

    let config = HarnessArgs::parse().into_config()?;
    println!(
        "⚙️  FIFO {} words, ROM {} / RAM {} words, {} ticks per UART bit, reads {:?}",
        config.fifo_capacity,
        config.rom_size,
        config.ram_size,
        config.uart.baud_period(),
        config.read_completion
    );

    scenarios::run_all(&config)?;

    println!("🎉 Simulation complete, all scenarios passed!");
    Ok(())
}
