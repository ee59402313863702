pub mod event_bus;
pub mod frame;
pub mod tap;

pub use event_bus::*;
pub use frame::*;
pub use tap::*;
