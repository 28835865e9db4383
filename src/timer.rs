//! The timing primitive and the context object that carries the active logger.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::driver::Value;
use crate::error::Result;
use crate::logger::{self, Method, TimerInfo, TimerLogger, TimerLoggerFn};

/// Source of timestamps for [`Timer`].
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Monotonic clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Holds the logger every decorator reports to.
///
/// A `Timer` is built once, handed to [`TimerDriver`](crate::TimerDriver), and shared
/// read-only by every connection, statement and transaction opened through it. With
/// no logger set, timed calls skip the clock entirely.
///
/// ```rust
/// use sql_timer::{Timer, TimerInfo};
///
/// let timer = Timer::new().with_logger_fn(|info: TimerInfo<'_>| {
///     println!("{} {:?} {}", info.method, info.duration(), info.query);
/// });
/// assert!(timer.is_enabled());
/// ```
#[derive(Clone)]
pub struct Timer {
    logger: Option<Arc<dyn TimerLogger>>,
    clock: Arc<dyn Clock>,
}

impl Default for Timer {
    fn default() -> Self {
        Self {
            logger: None,
            clock: Arc::new(SystemClock),
        }
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

impl Timer {
    /// Create a timer with no logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a timer reporting to the process-wide logger, if one is registered.
    ///
    /// The slot is read once, here.
    pub fn global() -> Self {
        Self {
            logger: logger::global_logger(),
            ..Self::default()
        }
    }

    /// Replace the logger.
    pub fn set_logger(&mut self, logger: impl TimerLogger + 'static) {
        self.logger = Some(Arc::new(logger));
    }

    /// Replace the logger with a closure.
    pub fn set_logger_fn<F>(&mut self, f: F)
    where
        F: Fn(TimerInfo<'_>) + Send + Sync + 'static,
    {
        self.set_logger(TimerLoggerFn(f));
    }

    pub fn with_logger(mut self, logger: impl TimerLogger + 'static) -> Self {
        self.set_logger(logger);
        self
    }

    pub fn with_logger_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(TimerInfo<'_>) + Send + Sync + 'static,
    {
        self.set_logger_fn(f);
        self
    }

    /// Use a different clock for start and end timestamps.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Returns true if a logger is set.
    pub fn is_enabled(&self) -> bool {
        self.logger.is_some()
    }

    /// Run `op` once and report it to the logger.
    ///
    /// The logger runs after `op` resolves and before this returns; its own cost is
    /// outside the reported window. The result of `op` is returned untouched.
    pub async fn time<T, F, Fut>(
        &self,
        method: Method,
        query: &str,
        args: Option<&[Value]>,
        op: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let Some(logger) = self.logger.as_deref() else {
            return op().await;
        };

        let start = self.clock.now();
        let result = op().await;
        let end = self.clock.now();

        logger.log(TimerInfo {
            method,
            query,
            start,
            end,
            args,
            err: result.as_ref().err(),
        });

        result
    }
}
