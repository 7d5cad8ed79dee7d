use crate::config::LoggingConfig;
use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Forwards every message to all attached loggers, in order.
pub struct MultiLogger {
    sinks: Vec<Arc<dyn DomainLogger>>,
}

impl MultiLogger {
    pub fn new(sinks: Vec<Arc<dyn DomainLogger>>) -> Self {
        Self { sinks }
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.error(msg));
    }
}

/// Build the process logger from configuration: file plus console when a
/// log file is configured, console only otherwise or if the file cannot open.
pub fn init_configured_logger(config: &LoggingConfig) -> Arc<dyn DomainLogger> {
    let console = super::init_console_logger();
    let Some(path) = config.file.as_deref() else {
        return console;
    };
    match super::file_logger::init_file_logger(path, config) {
        Ok(file_logger) => Arc::new(MultiLogger::new(vec![file_logger, console])),
        Err(e) => {
            console.warn(&format!("{}; logging to console only", e));
            console
        }
    }
}
