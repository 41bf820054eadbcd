//! Configuration for the session registry.

/// Default number of progress events buffered per session.
pub const DEFAULT_OUTLET_CAPACITY: usize = 100;

/// Configuration for the session registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Progress events buffered per session before new events are dropped.
    /// Values below 1 are raised to 1.
    pub outlet_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            outlet_capacity: DEFAULT_OUTLET_CAPACITY,
        }
    }
}

impl RegistryConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-session outlet capacity.
    pub fn with_outlet_capacity(mut self, capacity: usize) -> Self {
        self.outlet_capacity = capacity;
        self
    }

    /// Capacity actually used when allocating outlets.
    pub(crate) fn effective_capacity(&self) -> usize {
        self.outlet_capacity.max(1)
    }
}
