//! Basic example showing how to use sql-timer.
//!
//! Run with: cargo run --example basic

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use sql_timer::prelude::*;
use sql_timer::{register_timer, Error, ExecResult, Result, TIMER_DRIVER_NAME};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Toy key-value "database": `SET <key>` stores the first argument, `GET <key>` reads it.
#[derive(Clone, Default)]
struct KvDriver {
    data: Arc<Mutex<HashMap<String, Value>>>,
}

#[async_trait]
impl Driver for KvDriver {
    async fn open(&self, _name: &str) -> Result<Box<dyn Connection>> {
        Ok(Box::new(KvConn {
            data: self.data.clone(),
        }))
    }
}

struct KvConn {
    data: Arc<Mutex<HashMap<String, Value>>>,
}

#[async_trait]
impl Connection for KvConn {
    async fn prepare(&mut self, query: &str) -> Result<Box<dyn Statement>> {
        match query.split_once(' ') {
            Some((verb @ ("GET" | "SET"), key)) => Ok(Box::new(KvStmt {
                data: self.data.clone(),
                verb: verb.to_string(),
                key: key.to_string(),
            })),
            _ => Err(Error::driver(format!("unsupported query {:?}", query))),
        }
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }

    async fn begin(&mut self) -> Result<Box<dyn Transaction>> {
        Ok(Box::new(KvTx))
    }
}

struct KvStmt {
    data: Arc<Mutex<HashMap<String, Value>>>,
    verb: String,
    key: String,
}

#[async_trait]
impl Statement for KvStmt {
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn num_input(&self) -> Option<usize> {
        Some(if self.verb == "SET" { 1 } else { 0 })
    }

    async fn exec(&mut self, args: &[Value]) -> Result<ExecResult> {
        let value = args.first().cloned().unwrap_or(Value::Null);
        self.data.lock().insert(self.key.clone(), value);
        Ok(ExecResult {
            rows_affected: 1,
            last_insert_id: None,
        })
    }

    async fn query(&mut self, _args: &[Value]) -> Result<Box<dyn Rows>> {
        let row = self.data.lock().get(&self.key).cloned();
        Ok(Box::new(KvRows {
            columns: vec![self.key.clone()],
            row: row.map(|v| vec![v]),
        }))
    }
}

struct KvRows {
    columns: Vec<String>,
    row: Option<Vec<Value>>,
}

#[async_trait]
impl Rows for KvRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next(&mut self) -> Result<Option<Vec<Value>>> {
        Ok(self.row.take())
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

struct KvTx;

#[async_trait]
impl Transaction for KvTx {
    async fn commit(self: Box<Self>) -> Result<()> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sql_timer=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut registry = Registry::new();
    registry.register("kv", KvDriver::default());

    // Option 1: install a timer driver over everything registered so far
    let timer = Timer::new().with_logger(TracingLogger::new(
        TracingConfig::development().with_slow_query_threshold(Duration::from_millis(50)),
    ));
    register_timer(&mut registry, timer);

    // Option 2: hold a TimerDriver directly, reporting to a closure
    // let timer = Timer::new().with_logger_fn(|info: TimerInfo<'_>| {
    //     println!("{} {:?} {}", info.method, info.duration(), info.query);
    // });
    // let driver = TimerDriver::new(registry.clone(), timer);

    tracing::info!("Opening timed connection...");
    let mut conn = registry.open(TIMER_DRIVER_NAME, "kv memory").await?;

    let mut set = conn.prepare("SET greeting").await?;
    set.exec(&[Value::from("hello")]).await?;
    set.close().await?;

    let mut get = conn.prepare("GET greeting").await?;
    let mut rows = get.query(&[]).await?;
    while let Some(row) = rows.next().await? {
        tracing::info!(value = %row[0], "Read back");
    }
    get.close().await?;

    // Failures are reported too, then returned unchanged
    if let Err(e) = conn.prepare("DROP everything").await {
        tracing::info!(error = %e, "Unsupported query rejected");
    }

    let tx = conn.begin().await?;
    tx.commit().await?;
    conn.close().await?;

    Ok(())
}
