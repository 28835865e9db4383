//! In-memory driver, recording logger and counting clock shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::driver::{
    Connection, Driver, ExecConnection, ExecResult, Rows, Statement, Transaction, Value,
};
use crate::error::{Error, Result};
use crate::logger::{TimerInfo, TimerLogger};
use crate::timer::Clock;

/// Owned copy of a [`TimerInfo`].
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub method: &'static str,
    pub query: String,
    pub start: Instant,
    pub end: Instant,
    pub args: Option<Vec<Value>>,
    pub err: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingLogger {
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().clone()
    }

    pub fn methods(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.method).collect()
    }
}

impl TimerLogger for RecordingLogger {
    fn log(&self, info: TimerInfo<'_>) {
        self.events.lock().push(RecordedEvent {
            method: info.method.as_str(),
            query: info.query.to_string(),
            start: info.start,
            end: info.end,
            args: info.args.map(<[Value]>::to_vec),
            err: info.err.map(ToString::to_string),
        });
    }
}

#[derive(Debug, Clone, Default)]
pub struct CountingClock {
    reads: Arc<AtomicUsize>,
}

impl CountingClock {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Clock for CountingClock {
    fn now(&self) -> Instant {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Instant::now()
    }
}

#[derive(Debug, Default)]
struct FakeState {
    opened: Vec<String>,
    calls: Vec<String>,
    fail_open: bool,
    fail_commit: bool,
}

/// Scripted driver. Every inner call is appended to [`FakeDriver::calls`].
#[derive(Debug, Clone)]
pub struct FakeDriver {
    state: Arc<Mutex<FakeState>>,
    exec: bool,
}

impl FakeDriver {
    /// A driver whose connections support direct execution.
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            exec: true,
        }
    }

    /// A driver whose connections only support prepared statements.
    pub fn without_exec() -> Self {
        Self {
            exec: false,
            ..Self::new()
        }
    }

    pub fn failing_open(self) -> Self {
        self.state.lock().fail_open = true;
        self
    }

    pub fn failing_commit(self) -> Self {
        self.state.lock().fail_commit = true;
        self
    }

    /// Connection strings passed to `open`, in order.
    pub fn opened(&self) -> Vec<String> {
        self.state.lock().opened.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn open(&self, name: &str) -> Result<Box<dyn Connection>> {
        let mut state = self.state.lock();
        state.opened.push(name.to_string());
        if state.fail_open {
            return Err(Error::driver(format!("could not connect to {}", name)));
        }
        let conn = FakeConn {
            state: self.state.clone(),
            closed: false,
        };
        if self.exec {
            Ok(Box::new(FakeExecConn(conn)))
        } else {
            Ok(Box::new(conn))
        }
    }
}

pub struct FakeConn {
    state: Arc<Mutex<FakeState>>,
    closed: bool,
}

impl FakeConn {
    fn record(&self, call: String) {
        self.state.lock().calls.push(call);
    }
}

#[async_trait]
impl Connection for FakeConn {
    async fn prepare(&mut self, query: &str) -> Result<Box<dyn Statement>> {
        self.record(format!("prepare {}", query));
        if self.closed {
            return Err(Error::Closed("connection"));
        }
        if query.contains("syntax") {
            return Err(Error::driver(format!("syntax error in {:?}", query)));
        }
        Ok(Box::new(FakeStmt {
            state: self.state.clone(),
            query: query.to_string(),
            closed: false,
        }))
    }

    async fn close(&mut self) -> Result<()> {
        self.record("close".to_string());
        if self.closed {
            return Err(Error::Closed("connection"));
        }
        self.closed = true;
        Ok(())
    }

    async fn begin(&mut self) -> Result<Box<dyn Transaction>> {
        self.record("begin".to_string());
        if self.closed {
            return Err(Error::BadConnection);
        }
        Ok(Box::new(FakeTx {
            state: self.state.clone(),
        }))
    }
}

pub struct FakeExecConn(FakeConn);

#[async_trait]
impl Connection for FakeExecConn {
    async fn prepare(&mut self, query: &str) -> Result<Box<dyn Statement>> {
        self.0.prepare(query).await
    }

    async fn close(&mut self) -> Result<()> {
        self.0.close().await
    }

    async fn begin(&mut self) -> Result<Box<dyn Transaction>> {
        self.0.begin().await
    }

    fn into_execer(
        self: Box<Self>,
    ) -> std::result::Result<Box<dyn ExecConnection>, Box<dyn Connection>> {
        Ok(self)
    }
}

#[async_trait]
impl ExecConnection for FakeExecConn {
    async fn exec(&mut self, query: &str, args: &[Value]) -> Result<ExecResult> {
        self.0.record(format!("exec {}", query));
        if self.0.closed {
            return Err(Error::Closed("connection"));
        }
        Ok(ExecResult {
            rows_affected: args.len() as u64,
            last_insert_id: None,
        })
    }
}

pub struct FakeStmt {
    state: Arc<Mutex<FakeState>>,
    query: String,
    closed: bool,
}

#[async_trait]
impl Statement for FakeStmt {
    async fn close(&mut self) -> Result<()> {
        self.state.lock().calls.push("stmt close".to_string());
        if self.closed {
            return Err(Error::Closed("statement"));
        }
        self.closed = true;
        Ok(())
    }

    fn num_input(&self) -> Option<usize> {
        let placeholders = self.query.matches('?').count();
        (placeholders > 0).then_some(placeholders)
    }

    async fn exec(&mut self, args: &[Value]) -> Result<ExecResult> {
        self.state.lock().calls.push(format!("stmt exec {}", self.query));
        if self.closed {
            return Err(Error::Closed("statement"));
        }
        if args.iter().any(|a| *a == Value::Null) {
            return Err(Error::driver("null value violates not-null constraint"));
        }
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: Some(1),
        })
    }

    async fn query(&mut self, args: &[Value]) -> Result<Box<dyn Rows>> {
        self.state.lock().calls.push(format!("stmt query {}", self.query));
        if self.closed {
            return Err(Error::Closed("statement"));
        }
        Ok(Box::new(FakeRows {
            columns: vec!["?column?".to_string()],
            rows: vec![args.to_vec()],
        }))
    }
}

struct FakeTx {
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl Transaction for FakeTx {
    async fn commit(self: Box<Self>) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push("commit".to_string());
        if state.fail_commit {
            return Err(Error::driver("could not serialize access"));
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.state.lock().calls.push("rollback".to_string());
        Ok(())
    }
}

struct FakeRows {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

#[async_trait]
impl Rows for FakeRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next(&mut self) -> Result<Option<Vec<Value>>> {
        if self.rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.rows.remove(0)))
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.rows.clear();
        Ok(())
    }
}
