//! AIX Link - accelerator board command firmware
//!
//! Brings up UART0 and hands it, together with the memory-mapped device
//! window and engine registers, to the command dispatcher. Board addresses
//! come from board.toml via the build script.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::uart::Uart;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use aix_core::{ConfigTable, DispatchConfig, Dispatcher, EngineLayout, MemoryWindow, SyntheticDone};
use aix_hal::UartConfig;
use aix_hal_rp2040::uart::rp_config;
use aix_hal_rp2040::{BlockingUart, Mmio};

/// Constants generated from board.toml
mod board {
    include!(concat!(env!("OUT_DIR"), "/board_config.rs"));
}

fn dispatch_config() -> DispatchConfig {
    DispatchConfig::default()
        .with_window(MemoryWindow::new(board::WINDOW_BASE, board::WINDOW_SIZE))
        .with_engine(EngineLayout {
            base: board::ENGINE_BASE,
            ifm_pointer: board::IFM_POINTER,
            ofm_pointer: board::OFM_POINTER,
            weight_pointer: board::WEIGHT_POINTER,
        })
        .with_pause_ms(board::PAUSE_MS)
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("AIX Link firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Host link on GPIO0 (TX) / GPIO1 (RX)
    let link_config = UartConfig::with_baudrate(board::UART_BAUDRATE);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, rp_config(&link_config));
    let link = BlockingUart::new(uart);
    info!("UART0 initialized at {} baud", board::UART_BAUDRATE);

    let config = dispatch_config();
    info!(
        "Window {=u32:#x}+{=u32:#x}, engine at {=u32:#x}, pause {} ms",
        config.window.base, config.window.size, config.engine.base, config.pause_ms
    );

    // SAFETY: build.rs only accepts a window and register block inside the
    // SRAM that memory.x keeps out of the linker's hands
    let bus = unsafe { Mmio::new() };

    let mut dispatcher = Dispatcher::new(
        link,
        bus,
        Delay,
        SyntheticDone,
        ConfigTable::new(),
        config,
    );

    info!("Waiting for commands");
    loop {
        // Only a link fault ends a run; drop the partial command and resync
        let error = dispatcher.run();
        error!("Link error: {}", error);
    }
}
