//! Operator error reporting
//!
//! Non-fatal failures that an operator should look at (for example an
//! attachment that could not be archived) go through a [`Reporter`] instead of
//! failing the request.

use std::error::Error as StdError;
use tracing::{error, warn};

/// Sink for operator-facing error reports
pub trait Reporter: Send + Sync {
    fn report(&self, subject: &str, info: &str);
}

/// Reporter backed by `tracing`
///
/// In debug mode reports are plain console warnings. Otherwise they are
/// emitted as errors on the `operator` target so log shipping can route them
/// to administrators.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter {
    debug: bool,
}

impl LogReporter {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

impl Reporter for LogReporter {
    fn report(&self, subject: &str, info: &str) {
        if self.debug {
            warn!("{}\n{}", subject, info);
        } else {
            error!(target: "operator", subject = %subject, "{}", info);
        }
    }
}

/// Report `err` (with its source chain) under `subject`
pub fn report_exception(reporter: &dyn Reporter, subject: &str, err: &(dyn StdError + 'static)) {
    reporter.report(subject, &describe_error(err));
}

/// `Exception in request: <error>` followed by one `caused by` line per source
pub fn describe_error(err: &(dyn StdError + 'static)) -> String {
    let mut info = format!("Exception in request: {}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        info.push_str(&format!("\n  caused by: {}", cause));
        source = cause.source();
    }
    info
}
