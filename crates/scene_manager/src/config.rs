//! Scene configuration.

use scene_component::ReconcilePolicy;

/// Configuration for a [`Scene`](crate::Scene).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneConfig {
    /// Human-readable scene name, written into scene documents.
    pub name: String,
    /// First id handed out by entity allocation. 0 is reserved.
    pub first_entity_id: u64,
    /// How dynamic components created by this scene write attributes added
    /// during reconciliation.
    pub reconcile_policy: ReconcilePolicy,
}

impl SceneConfig {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            first_entity_id: 1,
            reconcile_policy: ReconcilePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_first_entity_id(mut self, id: u64) -> Self {
        self.first_entity_id = id.max(1);
        self
    }

    #[must_use]
    pub fn with_reconcile_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.reconcile_policy = policy;
        self
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new("scene")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = SceneConfig::new("world")
            .with_first_entity_id(0)
            .with_reconcile_policy(ReconcilePolicy::AddedAsLocal);
        assert_eq!(config.name, "world");
        assert_eq!(config.first_entity_id, 1);
        assert_eq!(config.reconcile_policy, ReconcilePolicy::AddedAsLocal);
    }
}
