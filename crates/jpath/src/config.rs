//! Tunables for a single query evaluation.

/// Default bound on traversal depth and filter nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Settings that bound the resources a query may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Deepest document level recursive descent may reach, and the deepest
    /// bracket/parenthesis nesting a filter may use.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
