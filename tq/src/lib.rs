//! TaskQueue - promise-based task queue with bounded concurrency and retry
//!
//! Callers submit asynchronous units of work ("awaitables") with arbitrary
//! input; the queue admits them into an ordered backlog and a self-driving
//! polling loop executes them under a concurrency cap, retrying failures up
//! to a configurable limit before surfacing the final error to the original
//! caller.
//!
//! # Core Concepts
//!
//! - **Deferred Settlement**: each task's outcome is bridged back to the
//!   caller through a one-shot [`Deferred`] settled exactly once
//! - **Bounded Concurrency**: in-flight executions never exceed the
//!   configured budget
//! - **Automatic Retry**: failures are requeued until the retry budget is
//!   exhausted, then the final error propagates
//! - **FIFO/LIFO Backlog**: insertion side is configurable, drain is always
//!   from one fixed end
//!
//! # Modules
//!
//! - [`domain`] - Task and settlement-bridge models
//! - [`queue`] - The scheduling engine, its configuration, and statistics

pub mod domain;
pub mod queue;

// Re-export commonly used types
pub use domain::{Awaitable, Deferred, SettleError, SettleFn, Task, TaskError, TaskHandle};
pub use queue::{Mode, Queue, QueueConfig, QueueStats};
