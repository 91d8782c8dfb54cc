//! Leafy - Alarm and Linear Pong firmware
//!
//! Runs on a Nucleo-L552ZE-Q with a 2x16 character LCD, its RGB backlight
//! and an LED/button I/O-expander pair on I2C2. One cooperative poll loop
//! runs the selected application; a bus task performs the I2C transfers it
//! queues, and edge tasks feed the button and motion sensor events in.

#![no_std]
#![no_main]

mod board;
mod channels;
mod config;
mod tasks;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::bind_interrupts;
use embassy_stm32::exti::{self, ExtiInput};
use embassy_stm32::gpio::Pull;
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::peripherals::I2C2;
use {defmt_rtt as _, panic_probe as _};

use leafy_apps::alarm::{BUTTON, MOTION};
use leafy_hal_stm32l5::i2c_config;

bind_interrupts!(struct Irqs {
    I2C2_EV => i2c::EventInterruptHandler<I2C2>;
    I2C2_ER => i2c::ErrorInterruptHandler<I2C2>;
    EXTI8 => exti::InterruptHandler<embassy_stm32::interrupt::typelevel::EXTI8>;
    EXTI13 => exti::InterruptHandler<embassy_stm32::interrupt::typelevel::EXTI13>;
});

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Leafy firmware starting...");

    let p = embassy_stm32::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();

    // I2C2: PF1 = SCL, PF0 = SDA
    let i2c = I2c::new(
        p.I2C2,
        p.PF1,
        p.PF0,
        Irqs,
        p.DMA1_CH1,
        p.DMA1_CH2,
        i2c_config(config.bus.i2c(), config.bus.timeout_ms),
    );

    // User button (PC13, high while pressed) and motion sensor (PB8)
    let button = ExtiInput::new(p.PC13, p.EXTI13, Pull::Down, Irqs);
    let motion = ExtiInput::new(p.PB8, p.EXTI8, Pull::Down, Irqs);

    let runner = board::build(&config);

    spawner.spawn(unwrap!(tasks::bus_task(i2c, config.bus.timeout_ms)));
    spawner.spawn(unwrap!(tasks::edge_task(button, BUTTON.bit)));
    spawner.spawn(unwrap!(tasks::edge_task(motion, MOTION.bit)));
    spawner.spawn(unwrap!(tasks::poll_task(runner)));

    info!("All tasks spawned");
}
