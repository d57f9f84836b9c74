//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals.

pub mod button;
pub mod clock;
pub mod network;

pub use button::stop_button_task;
pub use clock::{clock_task, ClockContext};
pub use network::{cyw43_task, net_task};
