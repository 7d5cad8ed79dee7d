pub mod logger;
pub mod patrol;

pub use logger::*;
pub use patrol::*;
