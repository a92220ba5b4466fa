//! Task Handle
//!
//! Future returned by [`ConcurrencyLimiter::run`](crate::ConcurrencyLimiter::run).

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{Error, Result};

/// Resolves to a submitted task's output once it settles.
///
/// Resolves to `Err(Error::TaskAborted)` if the task panicked or was dropped
/// before producing a value. Dropping the handle does not cancel the task.
#[derive(Debug)]
#[must_use = "dropping a TaskHandle discards the task's output"]
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(rx: oneshot::Receiver<T>) -> Self {
        Self { rx }
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.map_err(|_| Error::TaskAborted))
    }
}
