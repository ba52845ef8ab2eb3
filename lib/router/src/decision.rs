//! Routing decisions
//!
//! A [`Decision`] is the outcome of one matcher call. "No match" is a valid
//! decision, not an error: callers check [`Decision::is_match`].

use semroute_core::clamp_distance;
use serde::Serialize;
use serde_json::Value;

/// Confidence for a cosine distance: `1 - distance`, kept inside `[0, 1]`.
///
/// Strictly decreasing on `[0, 1]` and exactly 1.0 only at distance 0.
#[inline]
pub fn confidence(distance: f32) -> f32 {
    (1.0 - clamp_distance(distance)).clamp(0.0, 1.0)
}

/// Confidence as a percentage rounded to two decimals, for display
#[inline]
pub fn confidence_percent(confidence: f32) -> f32 {
    (confidence * 10_000.0).round() / 100.0
}

/// One route that cleared its threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMatch {
    pub route_id: String,
    pub distance: f32,
    pub confidence: f32,
}

impl RouteMatch {
    pub fn new(route_id: impl Into<String>, distance: f32) -> Self {
        let distance = clamp_distance(distance);
        Self {
            route_id: route_id.into(),
            distance,
            confidence: confidence(distance),
        }
    }

    pub fn confidence_percent(&self) -> f32 {
        confidence_percent(self.confidence)
    }
}

/// Result of matching one query against a route set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub best_route: Option<String>,
    pub distance: Option<f32>,
    pub confidence: Option<f32>,
    /// Other eligible routes, ordered by non-decreasing distance
    pub alternatives: Vec<RouteMatch>,
    /// The best route's metadata, passed through unchanged
    pub metadata: Value,
}

impl Decision {
    pub fn no_match() -> Self {
        Self {
            best_route: None,
            distance: None,
            confidence: None,
            alternatives: Vec::new(),
            metadata: Value::Null,
        }
    }

    pub(crate) fn matched(best: RouteMatch, alternatives: Vec<RouteMatch>, metadata: Value) -> Self {
        Self {
            best_route: Some(best.route_id),
            distance: Some(best.distance),
            confidence: Some(best.confidence),
            alternatives,
            metadata,
        }
    }

    pub fn is_match(&self) -> bool {
        self.best_route.is_some()
    }

    pub fn best(&self) -> Option<RouteMatch> {
        match (&self.best_route, self.distance, self.confidence) {
            (Some(route_id), Some(distance), Some(confidence)) => Some(RouteMatch {
                route_id: route_id.clone(),
                distance,
                confidence,
            }),
            _ => None,
        }
    }

    /// Best route followed by the alternatives
    pub fn matches(&self) -> Vec<RouteMatch> {
        self.best()
            .into_iter()
            .chain(self.alternatives.iter().cloned())
            .collect()
    }

    pub fn confidence_percent(&self) -> Option<f32> {
        self.confidence.map(confidence_percent)
    }
}
