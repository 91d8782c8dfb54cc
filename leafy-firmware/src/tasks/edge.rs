//! Edge tasks: EXTI events into the interrupt table
//!
//! One task per wired line. The level read right after the wake-up tells
//! the edge apart; an edge that bounced back before the read is taken as
//! the opposite one, which the button debounce absorbs.

use defmt::*;
use embassy_stm32::exti::ExtiInput;
use leafy_hal::Edge;

use crate::board::{EXTI, INTERRUPTS};

#[embassy_executor::task(pool_size = 2)]
pub async fn edge_task(mut input: ExtiInput<'static>, line: u8) {
    info!("Edge task started on EXTI{}", line);

    loop {
        input.wait_for_any_edge().await;

        let edge = if input.is_high() {
            Edge::Rising
        } else {
            Edge::Falling
        };
        if EXTI.latch(line, edge) {
            let handled = INTERRUPTS.dispatch(&EXTI, line);
            trace!("EXTI{}: {}", line, handled);
        }
    }
}
