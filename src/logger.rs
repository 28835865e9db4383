//! Timing events and the observer that receives them.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::driver::Value;
use crate::error::Error;

/// The driver operation a [`TimerInfo`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    DriverOpen,
    ConnPrepare,
    ConnExec,
    ConnClose,
    ConnBegin,
    StmtClose,
    StmtExec,
    StmtQuery,
    TxCommit,
    TxRollback,
}

impl Method {
    /// Returns the operation tag reported to loggers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::DriverOpen => "driver.Open",
            Method::ConnPrepare => "conn.Prepare",
            Method::ConnExec => "conn.Exec",
            Method::ConnClose => "conn.Close",
            Method::ConnBegin => "conn.Begin",
            Method::StmtClose => "stmt.Close",
            Method::StmtExec => "stmt.Exec",
            Method::StmtQuery => "stmt.Query",
            Method::TxCommit => "tx.Commit",
            Method::TxRollback => "tx.Rollback",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One timed driver call.
///
/// The query, arguments and error are borrowed from the call site; the error is the
/// same value the caller receives.
#[derive(Debug, Clone, Copy)]
pub struct TimerInfo<'a> {
    pub method: Method,
    /// Query text, empty when the operation has none.
    pub query: &'a str,
    pub start: Instant,
    pub end: Instant,
    /// Arguments, `None` when the operation takes none.
    pub args: Option<&'a [Value]>,
    pub err: Option<&'a Error>,
}

impl TimerInfo<'_> {
    /// Time spent in the wrapped operation.
    pub fn duration(&self) -> Duration {
        self.end.saturating_duration_since(self.start)
    }

    pub fn is_err(&self) -> bool {
        self.err.is_some()
    }
}

/// Receives one [`TimerInfo`] per timed driver call.
///
/// Called synchronously on the caller's task after the operation completes, so
/// implementations should be quick.
pub trait TimerLogger: Send + Sync {
    fn log(&self, info: TimerInfo<'_>);
}

impl<L: TimerLogger + ?Sized> TimerLogger for Arc<L> {
    fn log(&self, info: TimerInfo<'_>) {
        (**self).log(info)
    }
}

/// Adapts a bare closure into a [`TimerLogger`].
pub struct TimerLoggerFn<F>(pub F);

impl<F> TimerLogger for TimerLoggerFn<F>
where
    F: Fn(TimerInfo<'_>) + Send + Sync,
{
    fn log(&self, info: TimerInfo<'_>) {
        (self.0)(info)
    }
}

impl<F> fmt::Debug for TimerLoggerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerLoggerFn").finish_non_exhaustive()
    }
}

static GLOBAL_LOGGER: Lazy<RwLock<Option<Arc<dyn TimerLogger>>>> =
    Lazy::new(|| RwLock::new(None));

/// Install the process-wide logger, replacing any previous one.
///
/// Only [`Timer::global`](crate::Timer::global) reads this slot, so register before
/// building drivers.
pub fn set_timer_logger(logger: impl TimerLogger + 'static) {
    *GLOBAL_LOGGER.write() = Some(Arc::new(logger));
}

/// Install a closure as the process-wide logger.
pub fn set_timer_logger_fn<F>(f: F)
where
    F: Fn(TimerInfo<'_>) + Send + Sync + 'static,
{
    set_timer_logger(TimerLoggerFn(f));
}

pub(crate) fn global_logger() -> Option<Arc<dyn TimerLogger>> {
    GLOBAL_LOGGER.read().clone()
}
