use crate::config::LoggingConfig;
use crate::domains::logger::{parse_level, DomainLogger, FileLogger};
use std::sync::Arc;

/// Initialise `fast_log` for the configured file and hand back the domain logger.
pub fn init_file_logger(path: &str, config: &LoggingConfig) -> Result<Arc<dyn DomainLogger>, String> {
    FileLogger::init(path, parse_level(&config.level))
        .map_err(|e| format!("Failed to initialize fast_log at {}: {}", path, e))?;
    Ok(Arc::new(FileLogger))
}
