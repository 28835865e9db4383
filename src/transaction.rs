//! Timed transaction wrapper.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::driver::Transaction;
use crate::error::Result;
use crate::logger::Method;
use crate::timer::Timer;

pub struct TimedTx {
    inner: Box<dyn Transaction>,
    timer: Arc<Timer>,
}

impl TimedTx {
    pub(crate) fn new(inner: Box<dyn Transaction>, timer: Arc<Timer>) -> Self {
        Self { inner, timer }
    }
}

impl fmt::Debug for TimedTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedTx").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transaction for TimedTx {
    async fn commit(self: Box<Self>) -> Result<()> {
        let TimedTx { inner, timer } = *self;
        timer
            .time(Method::TxCommit, "", None, || inner.commit())
            .await
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let TimedTx { inner, timer } = *self;
        timer
            .time(Method::TxRollback, "", None, || inner.rollback())
            .await
    }
}
