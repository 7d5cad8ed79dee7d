use crate::domains::logger::DomainLogger;
use std::sync::Arc;

struct ConsoleBridge {
    prefix: String,
}

impl DomainLogger for ConsoleBridge {
    fn info(&self, msg: &str) {
        println!("{}{}", self.prefix, msg);
    }
    fn warn(&self, msg: &str) {
        println!("{}WARN: {}", self.prefix, msg);
    }
    fn error(&self, msg: &str) {
        eprintln!("{}ERROR: {}", self.prefix, msg);
    }
}

/// Console-backed logger, used when no log file is configured.
pub fn init_console_logger() -> Arc<dyn DomainLogger> {
    init_prefixed_console_logger("")
}

/// Console logger tagging every line, e.g. with the robot or binary name.
pub fn init_prefixed_console_logger(tag: &str) -> Arc<dyn DomainLogger> {
    let prefix = if tag.is_empty() { String::new() } else { format!("[{}] ", tag) };
    Arc::new(ConsoleBridge { prefix })
}
