//! Timed connection wrappers.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::driver::{Connection, ExecConnection, ExecResult, Statement, Transaction, Value};
use crate::error::Result;
use crate::logger::Method;
use crate::statement::TimedStmt;
use crate::timer::Timer;
use crate::transaction::TimedTx;

/// A connection wrapper that times every call made through it.
///
/// Use the aliases [`ExecConn`] and [`NoExecConn`]: which one wraps a given connection
/// is decided once, when it is opened, by whether the inner connection supports
/// direct execution. `NoExecConn` has no `exec` at all.
pub struct TimedConn<C: ?Sized> {
    inner: Box<C>,
    timer: Arc<Timer>,
}

/// Timed connection whose inner connection supports direct execution.
pub type ExecConn = TimedConn<dyn ExecConnection>;

/// Timed connection whose inner connection only supports prepared statements.
pub type NoExecConn = TimedConn<dyn Connection>;

impl<C: Connection + ?Sized> TimedConn<C> {
    pub(crate) fn new(inner: Box<C>, timer: Arc<Timer>) -> Self {
        Self { inner, timer }
    }

    async fn prepare_timed(&mut self, query: &str) -> Result<Box<dyn Statement>> {
        let stmt = self
            .timer
            .time(Method::ConnPrepare, query, None, || self.inner.prepare(query))
            .await?;

        Ok(Box::new(TimedStmt::new(stmt, query, self.timer.clone())))
    }

    async fn close_timed(&mut self) -> Result<()> {
        self.timer
            .time(Method::ConnClose, "", None, || self.inner.close())
            .await
    }

    async fn begin_timed(&mut self) -> Result<Box<dyn Transaction>> {
        let tx = self
            .timer
            .time(Method::ConnBegin, "", None, || self.inner.begin())
            .await?;

        Ok(Box::new(TimedTx::new(tx, self.timer.clone())))
    }
}

impl<C: ?Sized> fmt::Debug for TimedConn<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedConn")
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Connection for NoExecConn {
    async fn prepare(&mut self, query: &str) -> Result<Box<dyn Statement>> {
        self.prepare_timed(query).await
    }

    async fn close(&mut self) -> Result<()> {
        self.close_timed().await
    }

    async fn begin(&mut self) -> Result<Box<dyn Transaction>> {
        self.begin_timed().await
    }
}

#[async_trait]
impl Connection for ExecConn {
    async fn prepare(&mut self, query: &str) -> Result<Box<dyn Statement>> {
        self.prepare_timed(query).await
    }

    async fn close(&mut self) -> Result<()> {
        self.close_timed().await
    }

    async fn begin(&mut self) -> Result<Box<dyn Transaction>> {
        self.begin_timed().await
    }

    fn into_execer(
        self: Box<Self>,
    ) -> std::result::Result<Box<dyn ExecConnection>, Box<dyn Connection>> {
        Ok(self)
    }
}

#[async_trait]
impl ExecConnection for ExecConn {
    async fn exec(&mut self, query: &str, args: &[Value]) -> Result<ExecResult> {
        self.timer
            .time(Method::ConnExec, query, Some(args), || {
                self.inner.exec(query, args)
            })
            .await
    }
}

/// A connection opened through [`TimerDriver`](crate::TimerDriver).
pub enum TimedConnection {
    Exec(ExecConn),
    NoExec(NoExecConn),
}

impl TimedConnection {
    /// Probe `inner` once and wrap it in the matching variant.
    pub(crate) fn wrap(inner: Box<dyn Connection>, timer: Arc<Timer>) -> Self {
        match inner.into_execer() {
            Ok(execer) => TimedConnection::Exec(TimedConn::new(execer, timer)),
            Err(plain) => TimedConnection::NoExec(TimedConn::new(plain, timer)),
        }
    }

    /// Returns true if the inner connection supports direct execution.
    pub fn is_exec_capable(&self) -> bool {
        matches!(self, TimedConnection::Exec(_))
    }

    /// Borrow the exec-capable wrapper, if this is one.
    pub fn as_exec(&mut self) -> Option<&mut ExecConn> {
        match self {
            TimedConnection::Exec(conn) => Some(conn),
            TimedConnection::NoExec(_) => None,
        }
    }

    /// Erase the variant, keeping the exec capability discoverable through
    /// [`Connection::into_execer`].
    pub fn into_boxed(self) -> Box<dyn Connection> {
        match self {
            TimedConnection::Exec(conn) => Box::new(conn),
            TimedConnection::NoExec(conn) => Box::new(conn),
        }
    }
}

impl fmt::Debug for TimedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimedConnection::Exec(conn) => f.debug_tuple("Exec").field(conn).finish(),
            TimedConnection::NoExec(conn) => f.debug_tuple("NoExec").field(conn).finish(),
        }
    }
}

#[async_trait]
impl Connection for TimedConnection {
    async fn prepare(&mut self, query: &str) -> Result<Box<dyn Statement>> {
        match self {
            TimedConnection::Exec(conn) => conn.prepare_timed(query).await,
            TimedConnection::NoExec(conn) => conn.prepare_timed(query).await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            TimedConnection::Exec(conn) => conn.close_timed().await,
            TimedConnection::NoExec(conn) => conn.close_timed().await,
        }
    }

    async fn begin(&mut self) -> Result<Box<dyn Transaction>> {
        match self {
            TimedConnection::Exec(conn) => conn.begin_timed().await,
            TimedConnection::NoExec(conn) => conn.begin_timed().await,
        }
    }

    fn into_execer(
        self: Box<Self>,
    ) -> std::result::Result<Box<dyn ExecConnection>, Box<dyn Connection>> {
        match *self {
            TimedConnection::Exec(conn) => Ok(Box::new(conn)),
            TimedConnection::NoExec(conn) => Err(Box::new(conn)),
        }
    }
}
