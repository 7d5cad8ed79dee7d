pub mod patrol_path_service;

pub use patrol_path_service::*;
