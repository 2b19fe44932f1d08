//! Workspace tunables.

/// Configuration for a [`Workspace`](crate::workspace::Workspace).
#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    /// Minimum overlap (relative to the larger of the two ranges) a
    /// candidate node needs before a pointer re-anchors onto it.
    pub pointer_overlap_threshold: f32,
    /// Rehome structurally identical subtrees on commit instead of
    /// rebuilding them.
    pub reuse_identical_subtrees: bool,
    /// Memoise `resolve_all` results until the next modification. Off by
    /// default.
    pub resolve_cache: bool,
    /// Upper bound on ancestors visited by one scope walk.
    pub max_scope_depth: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            pointer_overlap_threshold: 0.5,
            reuse_identical_subtrees: true,
            resolve_cache: false,
            max_scope_depth: 4096,
        }
    }
}

impl CoreConfig {
    pub fn with_subtree_reuse(mut self, reuse: bool) -> Self {
        self.reuse_identical_subtrees = reuse;
        self
    }

    pub fn with_resolve_cache(mut self, enabled: bool) -> Self {
        self.resolve_cache = enabled;
        self
    }

    pub fn with_max_scope_depth(mut self, depth: usize) -> Self {
        self.max_scope_depth = depth;
        self
    }
}
