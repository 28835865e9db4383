//! The driver capability surface the timing layer decorates.
//!
//! These traits describe what a database driver exposes: a [`Driver`] opens
//! [`Connection`]s, which prepare [`Statement`]s and begin [`Transaction`]s. A
//! connection may optionally support direct execution without a prepared statement;
//! it advertises that through [`Connection::into_execer`].

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;

/// A parameter or column value exchanged with a driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

/// A database driver, able to open connections from a driver-specific name.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Open a new connection. The returned connection is used by one caller at a time.
    async fn open(&self, name: &str) -> Result<Box<dyn Connection>>;
}

/// Upcast helper so default trait methods can hand `self` back as a trait object.
///
/// Implemented for every sized [`Connection`]; there is no need to implement it by hand.
pub trait AsDynConnection {
    fn into_dyn_connection(self: Box<Self>) -> Box<dyn Connection>;
}

impl<T: Connection + 'static> AsDynConnection for T {
    fn into_dyn_connection(self: Box<Self>) -> Box<dyn Connection> {
        self
    }
}

/// A connection to a database.
#[async_trait]
pub trait Connection: AsDynConnection + Send {
    /// Return a prepared statement bound to this connection.
    async fn prepare(&mut self, query: &str) -> Result<Box<dyn Statement>>;

    /// Invalidate the connection and anything prepared or begun on it.
    async fn close(&mut self) -> Result<()>;

    /// Start a new transaction.
    async fn begin(&mut self) -> Result<Box<dyn Transaction>>;

    /// Capability probe for direct execution.
    ///
    /// Connections that implement [`ExecConnection`] override this to return
    /// `Ok(self)`. Anything that does not is treated as unable to execute directly.
    fn into_execer(
        self: Box<Self>,
    ) -> std::result::Result<Box<dyn ExecConnection>, Box<dyn Connection>> {
        Err(self.into_dyn_connection())
    }
}

/// A connection that can execute a query without preparing it first.
#[async_trait]
pub trait ExecConnection: Connection {
    async fn exec(&mut self, query: &str, args: &[Value]) -> Result<ExecResult>;
}

/// A prepared statement.
#[async_trait]
pub trait Statement: Send {
    async fn close(&mut self) -> Result<()>;

    /// Number of placeholder parameters, or `None` when the driver cannot tell, in
    /// which case callers skip argument count validation.
    fn num_input(&self) -> Option<usize>;

    /// Execute a query that doesn't return rows, such as an INSERT or UPDATE.
    async fn exec(&mut self, args: &[Value]) -> Result<ExecResult>;

    /// Execute a query that may return rows, such as a SELECT.
    async fn query(&mut self, args: &[Value]) -> Result<Box<dyn Rows>>;
}

/// An open transaction. Both operations end it.
#[async_trait]
pub trait Transaction: Send {
    async fn commit(self: Box<Self>) -> Result<()>;
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// A cursor over a query's result rows.
#[async_trait]
pub trait Rows: Send {
    fn columns(&self) -> &[String];

    /// Fetch the next row, or `None` once the result set is exhausted.
    async fn next(&mut self) -> Result<Option<Vec<Value>>>;

    async fn close(&mut self) -> Result<()>;
}
