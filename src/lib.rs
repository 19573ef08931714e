// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod cancel;
pub mod controller;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod surface;
pub mod target;
pub mod ui;

pub use controller::{Controller, Selection, TickOutcome};
pub use error::GameError;
pub use session::{Phase, Timing};
