//! Deferred - one-shot settlement bridge
//!
//! A `Deferred` holds the resolve/reject actions of an eventual result so a
//! third party (the queue) can settle it on the producer's behalf. The
//! caller-facing half is a [`TaskHandle`], a future that completes when the
//! bridge is settled.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use eyre::{Report, eyre};
use thiserror::Error;
use tokio::sync::oneshot;

/// A boxed one-shot settlement action
pub type SettleFn<V> = Box<dyn FnOnce(V) + Send + Sync>;

/// Errors raised when invoking a settlement action that was never bound
#[derive(Debug, Error)]
pub enum SettleError {
    #[error("deferred does not implement a resolve action")]
    UnboundResolve,

    #[error("deferred does not implement a reject action")]
    UnboundReject,
}

/// One-shot settlement object: binds zero, one, or two settlement actions at
/// construction and forwards `resolve`/`reject` calls to them.
///
/// Settling consumes the bridge, so each instance is settled at most once.
/// Invoking an action that was never bound is a programming error and returns
/// a [`SettleError`] naming the missing action.
pub struct Deferred<T> {
    resolve: Option<SettleFn<T>>,
    reject: Option<SettleFn<Report>>,
}

impl<T> Deferred<T> {
    /// Create a deferred with no bound actions
    pub fn new() -> Self {
        Self {
            resolve: None,
            reject: None,
        }
    }

    /// Create a deferred with the given settlement actions
    pub fn with_actions(resolve: Option<SettleFn<T>>, reject: Option<SettleFn<Report>>) -> Self {
        Self { resolve, reject }
    }

    /// Invoke the bound success action with `value`
    pub fn resolve(mut self, value: T) -> Result<(), SettleError> {
        match self.resolve.take() {
            Some(action) => {
                action(value);
                Ok(())
            }
            None => Err(SettleError::UnboundResolve),
        }
    }

    /// Invoke the bound failure action with `error`
    pub fn reject(mut self, error: Report) -> Result<(), SettleError> {
        match self.reject.take() {
            Some(action) => {
                action(error);
                Ok(())
            }
            None => Err(SettleError::UnboundReject),
        }
    }
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Deferred<T> {
    /// Create a deferred wired to a fresh [`TaskHandle`].
    ///
    /// Exactly one of the two actions will forward its payload to the handle;
    /// dropping the deferred unsettled fails the handle instead of hanging it.
    pub fn pair() -> (Self, TaskHandle<T>) {
        let (tx, rx) = oneshot::channel::<eyre::Result<T>>();
        let tx = Arc::new(Mutex::new(Some(tx)));

        let resolve = {
            let tx = Arc::clone(&tx);
            Box::new(move |value: T| {
                if let Some(tx) = tx.lock().ok().and_then(|mut slot| slot.take()) {
                    let _ = tx.send(Ok(value));
                }
            })
        };

        let reject = Box::new(move |error: Report| {
            if let Some(tx) = tx.lock().ok().and_then(|mut slot| slot.take()) {
                let _ = tx.send(Err(error));
            }
        });

        (Self::with_actions(Some(resolve), Some(reject)), TaskHandle { rx })
    }
}

/// Caller-side future for a submitted task.
///
/// Resolves with the task's final result, or with the error from the final
/// attempt once the retry budget is exhausted.
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<eyre::Result<T>>,
}

impl<T> Future for TaskHandle<T> {
    type Output = eyre::Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(settled)) => Poll::Ready(settled),
            Poll::Ready(Err(_)) => Poll::Ready(Err(eyre!("task was dropped before settlement"))),
            Poll::Pending => Poll::Pending,
        }
    }
}
