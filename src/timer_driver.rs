//! The driver wrapper that opens timed connections.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::OnceCell;

use crate::connection::TimedConnection;
use crate::driver::{Connection, Driver};
use crate::error::{Error, Result};
use crate::logger::Method;
use crate::registry::Registry;
use crate::timer::Timer;

/// Name [`register_timer`](crate::register_timer) installs the timer driver under.
pub const TIMER_DRIVER_NAME: &str = "timer";

/// Inner driver name and connection string, split from a composite name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    driver: String,
    dsn: String,
}

impl Target {
    /// Split on the first space. Later spaces belong to the connection string.
    fn parse(name: &str) -> Result<Self> {
        match name.split_once(' ') {
            Some((driver, dsn)) if !driver.is_empty() && !dsn.is_empty() => Ok(Self {
                driver: driver.to_string(),
                dsn: dsn.to_string(),
            }),
            _ => Err(Error::InvalidConfiguration {
                name: name.to_string(),
            }),
        }
    }
}

/// A [`Driver`] that opens connections through another registered driver and times
/// every call made on them.
///
/// Names take the form `"<driver> <connection string>"`. The first name that parses is
/// remembered, and every later open on the same `TimerDriver` reuses its driver and
/// connection string.
///
/// # Example
///
/// ```rust,ignore
/// use sql_timer::{Registry, Timer, TimerDriver};
///
/// let mut registry = Registry::new();
/// registry.register("postgres", my_postgres_driver);
///
/// let timer = Timer::new().with_logger(TracingLogger::default());
/// let driver = TimerDriver::new(registry, timer);
///
/// let mut conn = driver.open_timed("postgres host=localhost dbname=app").await?;
/// let mut stmt = conn.prepare("SELECT * FROM users WHERE id = $1").await?;
/// ```
#[derive(Debug)]
pub struct TimerDriver {
    registry: Registry,
    timer: Arc<Timer>,
    target: OnceCell<Target>,
}

impl TimerDriver {
    pub fn new(registry: Registry, timer: Timer) -> Self {
        Self {
            registry,
            timer: Arc::new(timer),
            target: OnceCell::new(),
        }
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// The inner driver name and connection string, once the first open has parsed them.
    pub fn target(&self) -> Option<(&str, &str)> {
        self.target
            .get()
            .map(|t| (t.driver.as_str(), t.dsn.as_str()))
    }

    /// Open a timed connection, keeping the exec capability visible in the returned
    /// variant.
    pub async fn open_timed(&self, name: &str) -> Result<TimedConnection> {
        let target = self.target.get_or_try_init(|| Target::parse(name))?;

        let raw = self
            .timer
            .time(Method::DriverOpen, name, None, || {
                self.registry.open(&target.driver, &target.dsn)
            })
            .await?;

        Ok(TimedConnection::wrap(raw, self.timer.clone()))
    }
}

#[async_trait]
impl Driver for TimerDriver {
    async fn open(&self, name: &str) -> Result<Box<dyn Connection>> {
        Ok(self.open_timed(name).await?.into_boxed())
    }
}
