//! Statistics types for the queue

/// Point-in-time snapshot of the queue's counters
#[derive(Debug, Default, Clone)]
pub struct QueueStats {
    /// Current in-flight executions
    pub running: usize,

    /// Lifetime successful completions
    pub success: u64,

    /// Lifetime terminal failures
    pub errors: u64,

    /// Lifetime requeue events
    pub retries: u64,

    /// Current backlog length
    pub size: usize,
}
