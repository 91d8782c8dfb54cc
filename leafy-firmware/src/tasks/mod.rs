//! Embassy async tasks
//!
//! Only the poll task submits transfers and only the bus task completes
//! them. The edge tasks stand in for the EXTI interrupt handlers.

pub mod bus;
pub mod edge;
pub mod poll;

pub use bus::{bus_task, BoardI2c};
pub use edge::edge_task;
pub use poll::poll_task;
