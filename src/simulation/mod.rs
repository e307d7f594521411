pub mod scheduler;
pub mod spawn;

pub use scheduler::{FactionTelemetry, Scheduler, TelemetryFrame, TickReport};
pub use spawn::{build_ship, should_spawn_ship, spawn_position};
