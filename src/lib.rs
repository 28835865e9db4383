//! # sql-timer
//!
//! Timing instrumentation for database drivers.
//!
//! `sql-timer` sits between your code and a database driver. It implements the same
//! driver traits as the driver it wraps, times every call made through it, and hands
//! each call's duration, query text, arguments and outcome to a [`TimerLogger`].
//!
//! ## Features
//!
//! - **Transparent**: connections, statements and transactions behave exactly like
//!   the inner driver's, errors included
//! - **Every driver call**: open, prepare, exec, query, close, begin, commit, rollback
//! - **Free when off**: with no logger set the clock is never read
//! - **Capability preserving**: connections that can execute directly stay
//!   exec-capable; those that can't never expose `exec`
//! - **Tracing integration**: [`TracingLogger`] reports calls as `tracing` spans
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sql_timer::prelude::*;
//!
//! let mut registry = Registry::new();
//! registry.register("postgres", my_postgres_driver);
//!
//! let timer = Timer::new().with_logger(TracingLogger::default());
//! let driver = TimerDriver::new(registry, timer);
//!
//! // "<inner driver> <inner connection string>"
//! let mut conn = driver.open_timed("postgres host=localhost dbname=app").await?;
//! let mut stmt = conn.prepare("SELECT * FROM users WHERE id = $1").await?;
//! let rows = stmt.query(&[Value::from(1i64)]).await?;
//! ```
//!
//! ## Logging Without `tracing`
//!
//! ```rust,ignore
//! let timer = Timer::new().with_logger_fn(|info: TimerInfo<'_>| {
//!     eprintln!("{} took {:?}: {}", info.method, info.duration(), info.query);
//! });
//! ```
//!
//! ## Registering By Name
//!
//! [`register_timer`] installs a [`TimerDriver`] as `"timer"` in a [`Registry`], so code
//! that opens drivers by name can switch to timed connections with
//! `registry.open("timer", "postgres host=localhost")`.

mod config;
mod connection;
mod driver;
mod error;
mod logger;
mod parser;
mod registry;
mod statement;
mod timer;
mod timer_driver;
mod tracing_logger;
mod transaction;

#[cfg(test)]
mod test_support;

pub use config::TracingConfig;
pub use connection::{ExecConn, NoExecConn, TimedConn, TimedConnection};
pub use driver::{
    AsDynConnection, Connection, Driver, ExecConnection, ExecResult, Rows, Statement,
    Transaction, Value,
};
pub use error::{BoxError, Error, Result};
pub use logger::{
    set_timer_logger, set_timer_logger_fn, Method, TimerInfo, TimerLogger, TimerLoggerFn,
};
pub use parser::{ParsedSql, SqlOperation};
pub use registry::{register_timer, Registry};
pub use statement::TimedStmt;
pub use timer::{Clock, SystemClock, Timer};
pub use timer_driver::{TimerDriver, TIMER_DRIVER_NAME};
pub use tracing_logger::TracingLogger;
pub use transaction::TimedTx;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Connection, Driver, ExecConnection, Registry, Rows, Statement, Timer, TimerDriver,
        TimerInfo, TimerLogger, Transaction, TracingConfig, TracingLogger, Value,
    };
}
