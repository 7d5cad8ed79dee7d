pub mod console_logger;
pub mod event_sourced_paths;
pub mod file_logger;
pub mod multi_logger;
pub mod noop_logger;
pub mod patrol_data;

pub use console_logger::*;
pub use event_sourced_paths::*;
pub use file_logger::*;
pub use multi_logger::*;
pub use noop_logger::*;
pub use patrol_data::*;
