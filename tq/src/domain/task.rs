//! Task - the unit of schedulable work
//!
//! A task carries the awaitable to invoke, its input, the error history
//! accumulated across attempts, and the deferred that must eventually be
//! settled exactly once.

use std::sync::Arc;

use eyre::Report;
use futures::future::BoxFuture;
use thiserror::Error;

use super::deferred::Deferred;

/// Type-erased asynchronous operation: takes one input, produces one result
/// or a failure
pub type Awaitable<I, T> = Arc<dyn Fn(I) -> BoxFuture<'static, eyre::Result<T>> + Send + Sync>;

/// Errors raised by a task's default behavior
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task does not implement an awaitable function")]
    MissingAwaitable,
}

/// One unit of schedulable work.
///
/// Mutated only by the executing attempt (error history append); once its
/// deferred is settled the task is never touched again.
pub struct Task<I, T> {
    /// Settlement bridge for this task's eventual outcome
    pub deferred: Deferred<T>,

    /// Input passed verbatim to the awaitable on every attempt
    pub input: I,

    /// Failures accumulated across attempts; length equals failed attempts so far
    pub errors: Vec<Report>,

    awaitable: Option<Awaitable<I, T>>,
}

impl<I, T> Task<I, T> {
    /// Create a new task; `awaitable` may be absent, in which case every
    /// attempt fails with [`TaskError::MissingAwaitable`]
    pub fn new(deferred: Deferred<T>, awaitable: Option<Awaitable<I, T>>, input: I) -> Self {
        Self {
            deferred,
            input,
            errors: Vec::new(),
            awaitable,
        }
    }
}

impl<I: Clone, T> Task<I, T> {
    /// Run one attempt: invoke the awaitable with this task's input.
    ///
    /// A missing awaitable surfaces as a failed future rather than a panic,
    /// so it flows through the same retry accounting as any other failure.
    pub async fn run(&self) -> eyre::Result<T> {
        match &self.awaitable {
            Some(awaitable) => awaitable(self.input.clone()).await,
            None => Err(TaskError::MissingAwaitable.into()),
        }
    }
}
