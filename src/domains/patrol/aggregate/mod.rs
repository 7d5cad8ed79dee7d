pub mod path;
pub mod patrol_path;
pub mod types;

pub use path::*;
pub use patrol_path::{PatrolPath, MIN_CREATION_BATTERY};
pub use types::*;
