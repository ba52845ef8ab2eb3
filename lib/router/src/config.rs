use semroute_core::{Aggregation, Error, Result};
use serde::{Deserialize, Serialize};

/// Knobs applied to every routing call of a router session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// How reference distances collapse into one route distance
    #[serde(default)]
    pub aggregation: Aggregation,

    /// Upper bound on matches reported per query (best route included)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_k: Option<usize>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            aggregation: Aggregation::Min,
            max_k: None,
        }
    }
}

impl RoutingConfig {
    pub fn with_max_k(mut self, max_k: usize) -> Self {
        self.max_k = Some(max_k);
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_k == Some(0) {
            return Err(Error::InvalidConfig("max_k must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Alternatives allowed next to the best route
    pub fn max_alternatives(&self) -> Option<usize> {
        self.max_k.map(|k| k.saturating_sub(1))
    }
}
