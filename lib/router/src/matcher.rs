//! Route matcher
//!
//! Turns per-route distances into a [`Decision`]:
//!
//! 1. one candidate per route carrying its aggregated distance (minimum by default)
//! 2. candidates over their own route's threshold are dropped
//! 3. survivors sort by distance, then higher priority, then route name
//! 4. the first survivor is the best route, the rest (capped) are alternatives
//!
//! Matching is a pure function of its inputs; nothing here mutates a route.

use crate::decision::{Decision, RouteMatch};
use ahash::AHashSet;
use ordered_float::OrderedFloat;
use semroute_core::{clamp_distance, Aggregation, Error, Result, Route, RouteTable, Vector};
use std::cmp::Ordering;
use tracing::debug;

/// A route paired with its distance to the query, before threshold filtering
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub route: &'a Route,
    pub distance: f32,
}

impl<'a> Candidate<'a> {
    /// The distance is clamped to `[0, 2]` so filtering, ranking and the
    /// reported confidence all see the same value.
    pub fn new(route: &'a Route, distance: f32) -> Self {
        Self {
            route,
            distance: clamp_distance(distance),
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.route.accepts(self.distance)
    }

    fn rank(&self, other: &Self) -> Ordering {
        OrderedFloat(self.distance)
            .cmp(&OrderedFloat(other.distance))
            .then_with(|| other.route.priority().cmp(&self.route.priority()))
            .then_with(|| self.route.name().cmp(other.route.name()))
    }
}

/// Stateless ranking of candidates into a decision
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    max_alternatives: Option<usize>,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of alternatives reported next to the best route
    pub fn with_max_alternatives(mut self, max_alternatives: Option<usize>) -> Self {
        self.max_alternatives = max_alternatives;
        self
    }

    /// Match a query vector against routes, computing distances here.
    ///
    /// Fails with [`Error::EmptyRouteSet`] before touching the query, and with
    /// [`Error::DimensionMismatch`] before computing any distance.
    pub fn match_routes(
        &self,
        query: &Vector,
        routes: &[Route],
        aggregation: Aggregation,
    ) -> Result<Decision> {
        if routes.is_empty() {
            return Err(Error::EmptyRouteSet);
        }
        if let Some(route) = routes.iter().find(|r| r.dim() != query.dim()) {
            return Err(Error::DimensionMismatch {
                expected: route.dim(),
                actual: query.dim(),
            });
        }

        let mut candidates = Vec::with_capacity(routes.len());
        for route in routes {
            candidates.push(Candidate::new(route, route.distance(query, aggregation)?));
        }
        Ok(self.decide(candidates))
    }

    pub fn match_table(
        &self,
        query: &Vector,
        table: &RouteTable,
        aggregation: Aggregation,
    ) -> Result<Decision> {
        self.match_routes(query, table.routes(), aggregation)
    }

    /// Match pre-computed route distances, e.g. from a
    /// [`VectorIndex`](semroute_core::VectorIndex).
    ///
    /// Routes missing from `distances` are not candidates. A name the table does
    /// not know is an error, and so is a name given twice.
    pub fn match_candidates<I, S>(&self, table: &RouteTable, distances: I) -> Result<Decision>
    where
        I: IntoIterator<Item = (S, f32)>,
        S: AsRef<str>,
    {
        let mut candidates = Vec::with_capacity(table.len());
        let mut seen = AHashSet::with_capacity(table.len());
        for (name, distance) in distances {
            let name = name.as_ref();
            let route = table
                .get(name)
                .ok_or_else(|| Error::RouteNotFound(name.to_string()))?;
            if !seen.insert(route.name()) {
                return Err(Error::InvalidConfig(format!(
                    "route '{}' has more than one distance",
                    name
                )));
            }
            candidates.push(Candidate::new(route, distance));
        }
        Ok(self.decide(candidates))
    }

    /// Filter, rank and cut candidates. Never fails.
    pub fn decide(&self, candidates: Vec<Candidate<'_>>) -> Decision {
        let total = candidates.len();
        let mut eligible: Vec<Candidate<'_>> =
            candidates.into_iter().filter(Candidate::is_eligible).collect();
        eligible.sort_by(Candidate::rank);

        let mut ranked = eligible.into_iter();
        let Some(best) = ranked.next() else {
            debug!("No route within threshold ({} candidates)", total);
            return Decision::no_match();
        };

        let limit = self.max_alternatives.unwrap_or(usize::MAX);
        let alternatives: Vec<RouteMatch> = ranked
            .take(limit)
            .map(|c| RouteMatch::new(c.route.name(), c.distance))
            .collect();

        debug!(
            "Routed to '{}' at distance {:.4} ({} alternatives of {} candidates)",
            best.route.name(),
            best.distance,
            alternatives.len(),
            total
        );

        Decision::matched(
            RouteMatch::new(best.route.name(), best.distance),
            alternatives,
            best.route.metadata().clone(),
        )
    }
}

/// Match with the default matcher: minimum distance, unlimited alternatives
pub fn match_routes(query: &Vector, routes: &[Route]) -> Result<Decision> {
    Matcher::new().match_routes(query, routes, Aggregation::Min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn route(name: &str, threshold: f32, priority: i32) -> Route {
        Route::new(name, vec![Vector::new(vec![1.0, 0.0])], threshold)
            .unwrap()
            .with_priority(priority)
    }

    fn table(routes: Vec<Route>) -> RouteTable {
        RouteTable::new(routes).unwrap()
    }

    #[test]
    fn test_no_match_when_all_over_threshold() {
        let t = table(vec![route("A", 0.3, 0), route("B", 0.3, 0)]);
        let decision = Matcher::new()
            .match_candidates(&t, [("A", 0.5), ("B", 0.5)])
            .unwrap();
        assert_eq!(decision.best_route, None);
        assert!(decision.alternatives.is_empty());
        assert_eq!(decision.confidence, None);
    }

    #[test]
    fn test_priority_breaks_exact_tie() {
        let t = table(vec![route("A", 0.5, 1), route("B", 0.5, 2)]);
        let decision = Matcher::new()
            .match_candidates(&t, [("A", 0.40), ("B", 0.40)])
            .unwrap();
        assert_eq!(decision.best_route.as_deref(), Some("B"));
        assert_eq!(decision.alternatives[0].route_id, "A");
    }

    #[test]
    fn test_name_breaks_priority_tie() {
        let t = table(vec![route("beta", 0.5, 1), route("alpha", 0.5, 1)]);
        let decision = Matcher::new()
            .match_candidates(&t, [("beta", 0.25), ("alpha", 0.25)])
            .unwrap();
        assert_eq!(decision.best_route.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_threshold_boundary_inclusive() {
        let t = table(vec![route("A", 0.3, 0), route("B", 0.3, 0)]);
        let decision = Matcher::new()
            .match_candidates(&t, [("A", 0.3), ("B", 0.3 + 1e-6)])
            .unwrap();
        assert_eq!(decision.best_route.as_deref(), Some("A"));
        assert!(decision.alternatives.is_empty());
    }

    #[test]
    fn test_each_route_clears_its_own_bar() {
        let t = table(vec![
            route("genai_programming", 0.70, 1),
            route("science_fiction", 0.68, 2),
        ]);
        let decision = Matcher::new()
            .match_candidates(&t, [("genai_programming", 0.13), ("science_fiction", 0.90)])
            .unwrap();
        assert_eq!(decision.best_route.as_deref(), Some("genai_programming"));
        assert!((decision.confidence.unwrap() - 0.87).abs() < 1e-6);
        assert_eq!(decision.confidence_percent(), Some(87.0));
        assert!(decision.alternatives.is_empty());
    }

    #[test]
    fn test_alternatives_sorted_and_capped() {
        let t = table(vec![
            route("a", 0.9, 0),
            route("b", 0.9, 0),
            route("c", 0.9, 0),
            route("d", 0.9, 0),
        ]);
        let distances = [("d", 0.1), ("c", 0.4), ("a", 0.3), ("b", 0.2)];

        let full = Matcher::new().match_candidates(&t, distances).unwrap();
        assert_eq!(full.best_route.as_deref(), Some("d"));
        let order: Vec<_> = full.alternatives.iter().map(|m| m.route_id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        for pair in full.alternatives.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        for m in &full.alternatives {
            assert!((m.confidence - (1.0 - m.distance)).abs() < 1e-6);
        }

        let capped = Matcher::new()
            .with_max_alternatives(Some(1))
            .match_candidates(&t, distances)
            .unwrap();
        assert_eq!(capped.alternatives.len(), 1);
        assert_eq!(capped.alternatives[0].route_id, "b");
    }

    #[test]
    fn test_out_of_range_distances_are_clamped() {
        let t = table(vec![route("a", 0.5, 0), route("b", 0.5, 0), route("c", 1.0, 0)]);
        let decision = Matcher::new()
            .match_candidates(&t, [("a", -0.05), ("b", 0.0), ("c", f32::NAN)])
            .unwrap();

        // a drifts below zero and ties with b at 0.0; name decides
        assert_eq!(decision.best_route.as_deref(), Some("a"));
        assert_eq!(decision.distance, Some(0.0));
        assert_eq!(decision.confidence, Some(1.0));
        assert_eq!(decision.alternatives.len(), 1);
        for m in decision.matches() {
            assert!((0.0..=2.0).contains(&m.distance));
            assert!((m.confidence - (1.0 - m.distance)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_repeated_route_distance_rejected() {
        let t = table(vec![route("a", 0.5, 0), route("b", 0.5, 0)]);
        assert!(matches!(
            Matcher::new().match_candidates(&t, [("a", 0.1), ("b", 0.3), ("a", 0.2)]),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_metadata_passthrough() {
        let t = table(vec![route("a", 0.5, 0).with_metadata(json!({"category": "arts"}))]);
        let decision = Matcher::new().match_candidates(&t, [("a", 0.1)]).unwrap();
        assert_eq!(decision.metadata, json!({"category": "arts"}));
    }

    #[test]
    fn test_unknown_candidate_route() {
        let t = table(vec![route("a", 0.5, 0)]);
        assert!(matches!(
            Matcher::new().match_candidates(&t, [("zzz", 0.1)]),
            Err(Error::RouteNotFound(_))
        ));
    }

    #[test]
    fn test_match_routes_computes_min_distance() {
        let near = Route::new(
            "near",
            vec![Vector::new(vec![0.0, 1.0]), Vector::new(vec![1.0, 0.0])],
            0.2,
        )
        .unwrap();
        let far = Route::new("far", vec![Vector::new(vec![-1.0, 0.0])], 1.0).unwrap();
        let routes = vec![near, far];

        let decision = match_routes(&Vector::new(vec![1.0, 0.0]), &routes).unwrap();
        assert_eq!(decision.best_route.as_deref(), Some("near"));
        assert!(decision.distance.unwrap().abs() < 1e-6);
        assert_eq!(decision.confidence, Some(1.0));
        // far sits at distance 2.0, over its 1.0 threshold
        assert!(decision.alternatives.is_empty());
    }

    #[test]
    fn test_match_routes_errors() {
        let query = Vector::new(vec![1.0, 0.0]);
        assert!(matches!(match_routes(&query, &[]), Err(Error::EmptyRouteSet)));

        let routes = vec![route("a", 0.5, 0)];
        assert!(matches!(
            match_routes(&Vector::new(vec![1.0, 0.0, 0.0]), &routes),
            Err(Error::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_idempotent() {
        let routes = vec![route("a", 0.9, 0), route("b", 0.9, 3)];
        let query = Vector::new(vec![0.6, 0.8]);
        let first = match_routes(&query, &routes).unwrap();
        let second = match_routes(&query, &routes).unwrap();
        assert_eq!(first, second);
        // identical references tie on distance, so priority decides
        assert_eq!(first.best_route.as_deref(), Some("b"));
    }
}
