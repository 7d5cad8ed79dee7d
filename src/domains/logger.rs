use chrono::Utc;
use log::{error as log_error, info as log_info, warn as log_warn};
use std::sync::Arc;

/// Logging port the patrol domain and services write through.
/// Logging never fails from the caller's point of view.
pub trait DomainLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

pub type DynLogger = Arc<dyn DomainLogger>;

/// Parse a level name from configuration, defaulting to `Info`.
pub fn parse_level(level: &str) -> log::LevelFilter {
    level.parse().unwrap_or(log::LevelFilter::Info)
}

/// `fast_log` backed logger writing to a log file.
pub struct FileLogger;

impl FileLogger {
    pub fn init(path: &str, level: log::LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
        fast_log::init(
            fast_log::config::Config::new().file(path).level(level),
        )?;
        Ok(())
    }
}

impl DomainLogger for FileLogger {
    fn info(&self, msg: &str) {
        log_info!("{} [patrol] {}", Utc::now().to_rfc3339(), msg);
    }

    fn warn(&self, msg: &str) {
        log_warn!("{} [patrol] {}", Utc::now().to_rfc3339(), msg);
    }

    fn error(&self, msg: &str) {
        log_error!("{} [patrol] {}", Utc::now().to_rfc3339(), msg);
    }
}
