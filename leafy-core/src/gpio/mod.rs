//! Pin operations, the interrupt handler table and the virtual port

pub mod interrupt;
pub mod pins;
pub mod virtual_port;

pub use interrupt::{EdgeHandler, InterruptTable};
pub use pins::GpioExt;
pub use virtual_port::VirtualPort;
