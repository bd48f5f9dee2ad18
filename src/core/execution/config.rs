//! Configuration for running batches of independent simulations
//!
//! A single simulation is always driven on one thread. These settings only
//! decide whether separate episodes are spread over a rayon pool.

use crate::core::errors::SimError;

/// Enumeration of supported concurrency modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// Episodes run one after another on the calling thread
    #[default]
    Sequential,
    /// Episodes run concurrently using Rayon
    Rayon,
}

/// Configuration for batch execution
#[derive(Debug, Clone, Default)]
pub struct ExecutionConfig {
    /// The concurrency mode to use for execution
    pub concurrency_mode: ConcurrencyMode,
    /// The size of a dedicated thread pool
    /// Only relevant when concurrency_mode is Rayon; `None` uses the global pool
    pub thread_pool_size: Option<usize>,
}

impl ExecutionConfig {
    /// Create a new configuration with default values
    ///
    /// Default configuration uses Sequential mode with no thread pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency mode
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.thread_pool_size == Some(0) {
            return Err(SimError::InvalidConfig(
                "thread_pool_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
