//! Display refresh loop
//!
//! Every tick reads the hardware clock and pushes changed hour/minute
//! values to the face; at a fixed interval the tick first resyncs the
//! clock from the network.

pub mod machine;
pub mod schedule;
pub mod session;
pub mod tracker;

pub use machine::{SyncEvent, SyncState};
pub use schedule::{ResyncSchedule, NTP_SYNC_INTERVAL_MS, SERVICE_SYNC_INTERVAL_MS};
pub use session::{
    ClockSession, DisplayUpdate, SessionError, TickReport, TICK_INTERVAL_MS, WRITE_SETTLE_MS,
};
pub use tracker::DisplayTracker;
