//! Boot-time engine configuration.
//!
//! Parameter and meta-key names are part of an immutable configuration value
//! constructed once per server/tenant and passed into the engine, never
//! global mutable state. Two engines with different configurations coexist
//! in one process without coordination.

/// Immutable engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Relationship-object member the count container is nested under
    /// (`relationships.<rel>.<count_container_key>.<count_meta_key>`).
    pub count_container_key: String,
    /// Key under which a relationship count is reported inside its container.
    pub count_meta_key: String,
    /// Top-level meta key holding pagination metadata.
    pub page_meta_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            count_container_key: "meta".to_string(),
            count_meta_key: "count".to_string(),
            page_meta_key: "page".to_string(),
        }
    }
}

impl EngineConfig {
    /// Configuration with default key names.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the relationship member the count container nests under.
    pub fn count_container_key(mut self, key: impl Into<String>) -> Self {
        self.count_container_key = key.into();
        self
    }

    /// Override the relationship count meta key.
    pub fn count_meta_key(mut self, key: impl Into<String>) -> Self {
        self.count_meta_key = key.into();
        self
    }

    /// Override the pagination meta key.
    pub fn page_meta_key(mut self, key: impl Into<String>) -> Self {
        self.page_meta_key = key.into();
        self
    }
}
