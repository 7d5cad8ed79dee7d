pub mod aggregate;
pub mod events;
pub mod loader;
pub mod optimizer;
pub mod ports;
pub mod schedule;

pub use aggregate::*;
pub use events::*;
pub use optimizer::*;
pub use ports::*;
pub use schedule::*;
