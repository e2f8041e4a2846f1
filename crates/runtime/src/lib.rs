pub mod event_bus;
pub mod frame;
pub mod scheduler;
pub mod task;

pub use event_bus::*;
pub use frame::*;
pub use scheduler::*;
pub use task::*;
