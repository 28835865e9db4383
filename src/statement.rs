//! Timed prepared statement wrapper.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::driver::{ExecResult, Rows, Statement, Value};
use crate::error::Result;
use crate::logger::Method;
use crate::timer::Timer;

/// A prepared statement that reports its exec and query calls with the query text it
/// was prepared from. Returned rows are not wrapped.
pub struct TimedStmt {
    inner: Box<dyn Statement>,
    query: String,
    timer: Arc<Timer>,
}

impl TimedStmt {
    pub(crate) fn new(inner: Box<dyn Statement>, query: &str, timer: Arc<Timer>) -> Self {
        Self {
            inner,
            query: query.to_string(),
            timer,
        }
    }

    /// The query text this statement was prepared from.
    pub fn query_text(&self) -> &str {
        &self.query
    }
}

impl fmt::Debug for TimedStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedStmt")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Statement for TimedStmt {
    async fn close(&mut self) -> Result<()> {
        self.timer
            .time(Method::StmtClose, "", None, || self.inner.close())
            .await
    }

    fn num_input(&self) -> Option<usize> {
        self.inner.num_input()
    }

    async fn exec(&mut self, args: &[Value]) -> Result<ExecResult> {
        self.timer
            .time(Method::StmtExec, &self.query, Some(args), || {
                self.inner.exec(args)
            })
            .await
    }

    async fn query(&mut self, args: &[Value]) -> Result<Box<dyn Rows>> {
        self.timer
            .time(Method::StmtQuery, &self.query, Some(args), || {
                self.inner.query(args)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{Connection, Driver};
    use crate::error::Error;
    use crate::test_support::{CountingClock, FakeDriver, RecordingLogger};

    async fn prepare(driver: &FakeDriver, timer: Timer, query: &str) -> TimedStmt {
        let mut conn = driver.open("mem://test").await.unwrap();
        let stmt = conn.prepare(query).await.unwrap();
        TimedStmt::new(stmt, query, Arc::new(timer))
    }

    #[tokio::test]
    async fn test_statement_reports_its_query_text() {
        let driver = FakeDriver::new();
        let logger = RecordingLogger::default();
        let timer = Timer::new().with_logger(logger.clone());
        let mut stmt = prepare(&driver, timer, "SELECT 1").await;

        stmt.exec(&[]).await.unwrap();
        stmt.exec(&[Value::from(5i64)]).await.unwrap();
        let mut rows = stmt.query(&[Value::from("x")]).await.unwrap();
        stmt.close().await.unwrap();

        assert_eq!(rows.columns(), ["?column?".to_string()]);
        assert_eq!(rows.next().await.unwrap(), Some(vec![Value::from("x")]));
        assert_eq!(rows.next().await.unwrap(), None);

        let events = logger.events();
        assert_eq!(
            logger.methods(),
            vec!["stmt.Exec", "stmt.Exec", "stmt.Query", "stmt.Close"]
        );
        assert!(events[..3].iter().all(|e| e.query == "SELECT 1"));
        assert_eq!(events[1].args, Some(vec![Value::Int(5)]));
        assert_eq!(events[2].args, Some(vec![Value::from("x")]));
        assert_eq!(events[3].query, "");
        assert!(events[3].args.is_none());
    }

    #[tokio::test]
    async fn test_num_input_is_untimed_passthrough() {
        let driver = FakeDriver::new();
        let clock = CountingClock::default();
        let logger = RecordingLogger::default();
        let timer = Timer::new()
            .with_clock(clock.clone())
            .with_logger(logger.clone());

        let stmt = prepare(&driver, timer.clone(), "UPDATE t SET a = ? WHERE id = ?").await;
        assert_eq!(stmt.num_input(), Some(2));

        let unknown = prepare(&driver, timer, "SELECT 1").await;
        assert_eq!(unknown.num_input(), None);

        assert_eq!(clock.reads(), 0);
        assert!(logger.events().is_empty());
    }

    #[tokio::test]
    async fn test_exec_error_passes_through() {
        let driver = FakeDriver::new();
        let logger = RecordingLogger::default();
        let timer = Timer::new().with_logger(logger.clone());
        let mut stmt = prepare(&driver, timer, "INSERT INTO t (a) VALUES (?)").await;

        let err = stmt.exec(&[Value::Null]).await.unwrap_err();

        assert!(matches!(err, Error::Driver(_)));
        let events = logger.events();
        assert_eq!(events[0].err.as_deref(), Some(err.to_string().as_str()));
        assert_eq!(events[0].args, Some(vec![Value::Null]));
    }

    #[tokio::test]
    async fn test_use_after_close_is_inner_error() {
        let driver = FakeDriver::new();
        let logger = RecordingLogger::default();
        let timer = Timer::new().with_logger(logger.clone());
        let mut stmt = prepare(&driver, timer, "SELECT 1").await;

        stmt.close().await.unwrap();
        let err = stmt
            .query(&[])
            .await
            .err()
            .expect("query after close must fail");

        assert!(matches!(err, Error::Closed("statement")));
        assert_eq!(logger.methods(), vec!["stmt.Close", "stmt.Query"]);
    }
}
