//! Library logging.
//!
//! Every record is mirrored to the [`log`] facade and fanned out to the
//! [`LogConsumer`]s registered on the client builder, so hosts can route
//! wallet diagnostics into their own telemetry.

use std::collections::HashMap;
use std::sync::Arc;

/// Severity of a library log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Failure,
}

impl LogLevel {
    fn as_log_level(self) -> log::Level {
        match self {
            LogLevel::Verbose => log::Level::Trace,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error | LogLevel::Failure => log::Level::Error,
        }
    }
}

/// Where a record was emitted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub module_path: &'static str,
    pub file: &'static str,
    pub line: u32,
}

/// Host supplied sink for library logs and telemetry events.
pub trait LogConsumer: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, call_site: CallSite);

    fn event(
        &self,
        name: &str,
        properties: Option<&HashMap<String, String>>,
        measurements: Option<&HashMap<String, f64>>,
    );
}

#[derive(Clone, Default)]
pub struct WalletLibraryLogger {
    consumers: Vec<Arc<dyn LogConsumer>>,
}

impl WalletLibraryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_consumer(&mut self, consumer: Arc<dyn LogConsumer>) {
        self.consumers.push(consumer);
    }

    pub fn log(&self, level: LogLevel, message: &str, call_site: CallSite) {
        log::log!(
            target: call_site.module_path,
            level.as_log_level(),
            "{}",
            message
        );

        for consumer in &self.consumers {
            consumer.log(level, message, call_site);
        }
    }

    pub fn event(
        &self,
        name: &str,
        properties: Option<&HashMap<String, String>>,
        measurements: Option<&HashMap<String, f64>>,
    ) {
        log::debug!("event {}", name);

        for consumer in &self.consumers {
            consumer.event(name, properties, measurements);
        }
    }

    pub fn verbose(&self, message: &str, call_site: CallSite) {
        self.log(LogLevel::Verbose, message, call_site);
    }

    pub fn debug(&self, message: &str, call_site: CallSite) {
        self.log(LogLevel::Debug, message, call_site);
    }

    pub fn info(&self, message: &str, call_site: CallSite) {
        self.log(LogLevel::Info, message, call_site);
    }

    pub fn warning(&self, message: &str, call_site: CallSite) {
        self.log(LogLevel::Warn, message, call_site);
    }

    pub fn error(&self, message: &str, call_site: CallSite) {
        self.log(LogLevel::Error, message, call_site);
    }

    pub fn failure(&self, message: &str, call_site: CallSite) {
        self.log(LogLevel::Failure, message, call_site);
    }
}

/// Capture the current call site for a [`WalletLibraryLogger`] call.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::logger::CallSite {
            module_path: module_path!(),
            file: file!(),
            line: line!(),
        }
    };
}

/// Log through a [`WalletLibraryLogger`] with the caller's location.
///
/// ```ignore
/// wallet_log!(logger, Info, "resolved {} requirements", count);
/// ```
#[macro_export]
macro_rules! wallet_log {
    ($logger:expr, $level:ident, $($arg:tt)+) => {
        $logger.log(
            $crate::logger::LogLevel::$level,
            &format!($($arg)+),
            $crate::call_site!(),
        )
    };
}
