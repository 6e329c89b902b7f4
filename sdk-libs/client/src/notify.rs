use std::fmt::{Display, Formatter};

use tracing::{error, info, warn};

use crate::errors::BankClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", str)
    }
}

/// Fire-and-forget sink for user facing messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, message: &str, detail: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, severity: Severity, message: &str, detail: &str) {
        match severity {
            Severity::Info | Severity::Success => info!(%severity, detail, "{}", message),
            Severity::Warning => warn!(detail, "{}", message),
            Severity::Error => error!(detail, "{}", message),
        }
    }
}

pub fn report_failure(notifier: &dyn Notifier, message: &str, err: &BankClientError) {
    notifier.notify(Severity::Error, message, &err.to_string());
}
