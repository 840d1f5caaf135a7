//! Configuration for evaluation passes.

/// How a player's grand total is summed from the category map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GrandTotalPolicy {
    /// Sum every value in the map, nested categories included.
    #[default]
    AllCategories,
    /// Sum root categories and the uncategorized bucket only.
    RootsOnly,
}

/// Configuration for the scoring engine.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Results and deltas at or below this magnitude mint no entry.
    pub impact_epsilon: f64,

    /// Longest chain of formulas evaluated on demand before giving up.
    pub max_depth: usize,

    /// How grand totals are summed.
    pub grand_total: GrandTotalPolicy,

    /// Log unknown references at warn level (debug otherwise).
    pub warn_unknown_references: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            impact_epsilon: 0.001,
            max_depth: 64,
            grand_total: GrandTotalPolicy::AllCategories,
            warn_unknown_references: true,
        }
    }
}

impl EngineConfig {
    /// Configuration for templates with nested category trees, where
    /// summing every level would count children twice.
    #[must_use]
    pub fn nested() -> Self {
        Self {
            grand_total: GrandTotalPolicy::RootsOnly,
            ..Self::default()
        }
    }

    /// Configuration that keeps unknown references out of warn-level logs.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            warn_unknown_references: false,
            ..Self::default()
        }
    }

    /// Builder method to set the impact epsilon.
    #[must_use]
    pub fn with_impact_epsilon(mut self, epsilon: f64) -> Self {
        self.impact_epsilon = epsilon;
        self
    }

    /// Builder method to set the formula chain limit.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Builder method to set the grand total policy.
    #[must_use]
    pub fn with_grand_total(mut self, policy: GrandTotalPolicy) -> Self {
        self.grand_total = policy;
        self
    }

    /// Builder method to enable/disable warn-level unknown reference logs.
    #[must_use]
    pub fn with_warn_unknown_references(mut self, warn: bool) -> Self {
        self.warn_unknown_references = warn;
        self
    }
}
