pub mod driver;
pub mod map;

pub use driver::SyncLoop;
pub use map::{Command, FleetMap, LoopPhase};
