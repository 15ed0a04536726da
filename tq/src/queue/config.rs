//! Queue configuration

use serde::{Deserialize, Serialize};

/// Backlog insertion discipline.
///
/// The backlog is always drained from one fixed end; the mode only picks the
/// insertion side. FIFO inserts at the head so the oldest item drains first,
/// LIFO inserts at the tail so the newest item drains first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum Mode {
    #[default]
    Fifo,
    Lifo,
}

impl From<String> for Mode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "LIFO" => Mode::Lifo,
            // Unrecognized modes fall back to FIFO
            _ => Mode::Fifo,
        }
    }
}

/// Queue configuration, immutable after construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Retries after the first attempt before giving up
    #[serde(default = "default_max_retry")]
    pub max_retry: usize,

    /// Backlog insertion discipline
    #[serde(default)]
    pub mode: Mode,

    /// Max simultaneous in-flight executions, must be >= 1
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_max_retry() -> usize {
    3
}

fn default_concurrency() -> usize {
    1
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_retry: 3,
            mode: Mode::Fifo,
            concurrency: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QueueConfig::default();
        assert_eq!(config.max_retry, 3);
        assert_eq!(config.mode, Mode::Fifo);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: QueueConfig = serde_json::from_str("{}").expect("empty config should parse");
        assert_eq!(config.max_retry, 3);
        assert_eq!(config.mode, Mode::Fifo);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_deserialize_partial_overrides() {
        let config: QueueConfig =
            serde_json::from_str(r#"{"max_retry": 5, "mode": "LIFO"}"#).expect("partial config should parse");
        assert_eq!(config.max_retry, 5);
        assert_eq!(config.mode, Mode::Lifo);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_unrecognized_mode_falls_back_to_fifo() {
        let config: QueueConfig =
            serde_json::from_str(r#"{"mode": "PRIORITY"}"#).expect("unknown mode should still parse");
        assert_eq!(config.mode, Mode::Fifo);
    }
}
