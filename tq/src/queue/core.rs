//! Queue implementation

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, warn};

use crate::domain::{Awaitable, Deferred, Task, TaskHandle};

use super::config::{Mode, QueueConfig};
use super::stats::QueueStats;

/// Lifetime counters, mutated only under the inner lock
#[derive(Debug, Default)]
struct Counters {
    running: usize,
    success: u64,
    errors: u64,
    retries: u64,
}

/// Internal state protected by mutex
struct QueueInner<I, T> {
    /// Ordered backlog of tasks awaiting execution, drained from the tail
    backlog: VecDeque<Task<I, T>>,

    /// Running counters
    counters: Counters,

    /// True while the polling loop is scheduled to continue
    is_polling: bool,

    /// Insertion discipline for the backlog
    mode: Mode,
}

impl<I, T> QueueInner<I, T> {
    fn new(mode: Mode) -> Self {
        Self {
            backlog: VecDeque::new(),
            counters: Counters::default(),
            is_polling: false,
            mode,
        }
    }

    /// Insert a task on the side dictated by the mode; a retried task
    /// re-enters here like any fresh insertion
    fn enqueue(&mut self, task: Task<I, T>) {
        match self.mode {
            Mode::Fifo => self.backlog.push_front(task),
            Mode::Lifo => self.backlog.push_back(task),
        }
    }

    /// Pop up to `batch_size` tasks from the drain end of the backlog
    fn pop_batch(&mut self, batch_size: usize) -> Vec<Task<I, T>> {
        let mut batch = Vec::new();
        for _ in 0..batch_size {
            match self.backlog.pop_back() {
                Some(task) => batch.push(task),
                None => break,
            }
        }
        batch
    }

    fn has_tasks(&self) -> bool {
        !self.backlog.is_empty() || self.counters.running > 0
    }
}

/// Promise-based task queue: admits awaitables into an ordered backlog and
/// drains them under a concurrency cap, retrying failures up to the
/// configured budget before surfacing the final error to the caller.
pub struct Queue<I, T> {
    config: QueueConfig,
    inner: Arc<Mutex<QueueInner<I, T>>>,
    notify: Arc<Notify>,
}

impl<I, T> Queue<I, T>
where
    I: Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    /// Create a new queue with the given configuration
    pub fn new(config: QueueConfig) -> Self {
        debug!(?config, "Queue::new: called");
        let inner = QueueInner::new(config.mode);
        Self {
            config,
            inner: Arc::new(Mutex::new(inner)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Start the polling loop.
    ///
    /// A no-op re-arm when the loop is already active.
    pub async fn start(&self) {
        debug!("Queue::start: called");
        {
            let mut inner = self.inner.lock().await;
            if inner.is_polling {
                debug!("Queue::start: already polling, re-arming");
                self.notify.notify_one();
                return;
            }
            inner.is_polling = true;
        }

        tokio::spawn(poll(
            self.config.clone(),
            Arc::clone(&self.inner),
            Arc::clone(&self.notify),
        ));
    }

    /// Stop scheduling further polling ticks.
    ///
    /// In-flight executions are not cancelled; the backlog is kept. The loop
    /// stays stopped until a new `add` or an explicit `start`.
    pub async fn stop(&self) {
        debug!("Queue::stop: called");
        self.inner.lock().await.is_polling = false;
        self.notify.notify_one();
    }

    /// Submit an awaitable with its input; returns a handle that settles with
    /// the task's final outcome. Starts the polling loop if it is idle.
    pub async fn add<F, Fut>(&self, awaitable: F, input: I) -> TaskHandle<T>
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = eyre::Result<T>> + Send + 'static,
    {
        debug!("Queue::add: called");
        let (deferred, handle) = Deferred::pair();
        let erased: Awaitable<I, T> = Arc::new(move |input| awaitable(input).boxed());

        self.enqueue(Task::new(deferred, Some(erased), input)).await;

        let idle = !self.inner.lock().await.is_polling;
        if idle {
            self.start().await;
        }

        handle
    }

    /// Admit a pre-built task without starting the loop.
    ///
    /// This is the non-starting admission path; a loop that was stopped does
    /// not resume for it.
    pub async fn enqueue(&self, task: Task<I, T>) {
        debug!("Queue::enqueue: called");
        self.inner.lock().await.enqueue(task);
        self.notify.notify_one();
    }

    /// True if the backlog is non-empty or any execution is in flight
    pub async fn has_tasks(&self) -> bool {
        debug!("Queue::has_tasks: called");
        self.inner.lock().await.has_tasks()
    }

    /// Point-in-time snapshot of the counters and backlog length
    pub async fn stats(&self) -> QueueStats {
        debug!("Queue::stats: called");
        let inner = self.inner.lock().await;
        QueueStats {
            running: inner.counters.running,
            success: inner.counters.success,
            errors: inner.counters.errors,
            retries: inner.counters.retries,
            size: inner.backlog.len(),
        }
    }
}

/// The self-re-arming draining loop.
///
/// Each tick extracts a batch sized to the remaining concurrency budget and
/// launches every extracted task without waiting for any to finish. The
/// `running` counter is bumped under the same lock as the batch pop, so the
/// budget check on the next tick is always consistent. Between ticks the loop
/// parks on the notifier, which admission, completion, and stop all fire.
async fn poll<I, T>(config: QueueConfig, inner: Arc<Mutex<QueueInner<I, T>>>, notify: Arc<Notify>)
where
    I: Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    debug!("Queue::poll: loop started");
    loop {
        let batch = {
            let mut inner = inner.lock().await;
            if !inner.is_polling {
                debug!("Queue::poll: externally stopped, exiting");
                break;
            }
            let budget = config.concurrency.saturating_sub(inner.counters.running);
            let batch = inner.pop_batch(budget);
            inner.counters.running += batch.len();
            batch
        };

        if !batch.is_empty() {
            debug!(batch_len = batch.len(), "Queue::poll: dispatching batch");
        }
        for task in batch {
            tokio::spawn(process_task(
                Arc::clone(&inner),
                Arc::clone(&notify),
                config.max_retry,
                task,
            ));
        }

        {
            let mut inner = inner.lock().await;
            if !(inner.has_tasks() && inner.is_polling) {
                debug!("Queue::poll: drained, going inactive");
                inner.is_polling = false;
                break;
            }
        }

        notify.notified().await;
    }
}

/// Execute one attempt of one task.
///
/// On success the deferred is resolved with the result. On a failure under
/// budget the error is appended to the task's history and the task is
/// re-enqueued as a fresh insertion; at budget the deferred is rejected with
/// the final error. The `running` counter is decremented exactly once per
/// attempt.
async fn process_task<I, T>(inner: Arc<Mutex<QueueInner<I, T>>>, notify: Arc<Notify>, max_retry: usize, mut task: Task<I, T>)
where
    I: Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    debug!("Queue::process_task: called");
    let result = task.run().await;

    match result {
        Ok(value) => {
            {
                let mut inner = inner.lock().await;
                inner.counters.success += 1;
                inner.counters.running -= 1;
            }
            if let Err(error) = task.deferred.resolve(value) {
                warn!(%error, "Queue::process_task: settlement failed on resolve");
            }
        }
        Err(error) => {
            let mut inner = inner.lock().await;
            inner.counters.running -= 1;
            if task.errors.len() < max_retry {
                debug!(attempts = task.errors.len() + 1, "Queue::process_task: retrying");
                task.errors.push(error);
                inner.counters.retries += 1;
                inner.enqueue(task);
            } else {
                debug!(attempts = task.errors.len() + 1, "Queue::process_task: retry budget exhausted");
                inner.counters.errors += 1;
                drop(inner);
                if let Err(error) = task.deferred.reject(error) {
                    warn!(%error, "Queue::process_task: settlement failed on reject");
                }
            }
        }
    }

    notify.notify_one();
}
