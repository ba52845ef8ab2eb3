//! Semantic router session
//!
//! Owns an embedder and the current routing snapshot. A snapshot bundles the
//! route table, its index and the routing config; reconfiguration builds a new
//! snapshot off to the side and swaps the `Arc` in one step, so every query sees
//! one consistent configuration from start to finish.

use crate::config::RoutingConfig;
use crate::decision::{Decision, RouteMatch};
use crate::definition::RouterDefinition;
use crate::matcher::Matcher;
use parking_lot::RwLock;
use semroute_core::{Embedder, Error, Result, RouteIndex, RouteTable, Vector, VectorIndex};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Immutable routing state shared by in-flight queries
#[derive(Debug)]
struct Snapshot {
    name: String,
    table: Arc<RouteTable>,
    index: Arc<RouteIndex>,
    config: RoutingConfig,
}

impl Snapshot {
    fn build(definition: &RouterDefinition, embedder: &dyn Embedder) -> Result<Self> {
        let table = definition.build_table(embedder)?;
        let index = RouteIndex::from_table(&table)?;

        Ok(Self {
            name: definition.name.clone(),
            table: Arc::new(table),
            index: Arc::new(index),
            config: definition.routing,
        })
    }

    fn decide(&self, query: &Vector, max_alternatives: Option<usize>) -> Result<Decision> {
        let distances = self.index.route_distances(query, self.config.aggregation)?;
        Matcher::new()
            .with_max_alternatives(max_alternatives)
            .match_candidates(&self.table, distances)
    }
}

/// Summary of one configured route
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteInfo {
    pub name: String,
    pub references: usize,
    pub distance_threshold: f32,
    pub priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

pub struct SemanticRouter {
    embedder: Arc<dyn Embedder>,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl SemanticRouter {
    pub fn new(definition: &RouterDefinition, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let snapshot = Snapshot::build(definition, embedder.as_ref())?;
        info!(
            "Router '{}' initialized: {} routes, {} reference documents indexed",
            snapshot.name,
            snapshot.table.len(),
            snapshot.index.num_docs()
        );

        Ok(Self {
            embedder,
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    fn current(&self) -> Arc<Snapshot> {
        self.snapshot.read().clone()
    }

    pub fn name(&self) -> String {
        self.current().name.clone()
    }

    pub fn routing_config(&self) -> RoutingConfig {
        self.current().config
    }

    pub fn route_table(&self) -> Arc<RouteTable> {
        self.current().table.clone()
    }

    pub fn num_docs(&self) -> usize {
        self.current().index.num_docs()
    }

    /// Route a query to its best matching route.
    ///
    /// Alternatives are capped so that at most `max_k` matches are reported.
    pub fn route(&self, query: &str) -> Result<Decision> {
        let snapshot = self.current();
        let vector = self.embedder.embed(query);
        let decision = snapshot.decide(&vector, snapshot.config.max_alternatives())?;
        debug!("Query {:?} -> {:?}", query, decision.best_route);
        Ok(decision)
    }

    /// Route an already embedded query
    pub fn route_vector(&self, vector: &Vector) -> Result<Decision> {
        let snapshot = self.current();
        snapshot.decide(vector, snapshot.config.max_alternatives())
    }

    /// Every route within threshold, best first, at most `max_k` of them
    /// (the session's `max_k` when `None`).
    pub fn route_many(&self, query: &str, max_k: Option<usize>) -> Result<Vec<RouteMatch>> {
        let snapshot = self.current();
        let limit = max_k.or(snapshot.config.max_k);
        if limit == Some(0) {
            return Err(Error::InvalidConfig("max_k must be at least 1".to_string()));
        }

        let vector = self.embedder.embed(query);
        let decision = snapshot.decide(&vector, limit.map(|k| k - 1))?;
        Ok(decision.matches())
    }

    /// Replace the routing config, keeping routes and index
    pub fn update_routing_config(&self, config: RoutingConfig) -> Result<()> {
        config.validate()?;

        let mut guard = self.snapshot.write();
        let next = Snapshot {
            name: guard.name.clone(),
            table: guard.table.clone(),
            index: guard.index.clone(),
            config,
        };
        *guard = Arc::new(next);
        info!("Routing config updated: {:?}", config);
        Ok(())
    }

    /// Rebuild routes, index and config from a new definition.
    ///
    /// On error the current snapshot stays in place.
    pub fn reconfigure(&self, definition: &RouterDefinition) -> Result<()> {
        let next = Arc::new(Snapshot::build(definition, self.embedder.as_ref())?);
        let routes = next.table.len();
        *self.snapshot.write() = next;
        info!("Router '{}' reconfigured with {} routes", definition.name, routes);
        Ok(())
    }

    pub fn routes_info(&self) -> Vec<RouteInfo> {
        self.current()
            .table
            .iter()
            .map(|route| RouteInfo {
                name: route.name().to_string(),
                references: route.references().len(),
                distance_threshold: route.threshold(),
                priority: route.priority(),
                category: route
                    .metadata()
                    .get("category")
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::RouteDefinition;
    use crate::presets;
    use semroute_core::{Aggregation, HashEmbedder};

    fn router() -> SemanticRouter {
        SemanticRouter::new(&presets::topic_router(), Arc::new(HashEmbedder::default())).unwrap()
    }

    #[test]
    fn test_reference_text_routes_to_itself() {
        let router = router();
        let decision = router.route("Bach fugues and cantatas").unwrap();
        assert_eq!(decision.best_route.as_deref(), Some("classical_music"));
        assert!(decision.distance.unwrap() < 1e-4);
        assert_eq!(decision.metadata["category"], "arts");
        assert!(decision.alternatives.len() <= 2);
    }

    #[test]
    fn test_info() {
        let router = router();
        assert_eq!(router.name(), presets::TOPIC_ROUTER_NAME);
        assert_eq!(router.num_docs(), 49);

        let info = router.routes_info();
        assert_eq!(info.len(), 3);
        assert_eq!(info[0].name, "genai_programming");
        assert_eq!(info[0].references, 15);
        assert_eq!(info[0].category.as_deref(), Some("technology"));
    }

    #[test]
    fn test_route_many_respects_max_k() {
        let router = router();
        let matches = router.route_many("vector embeddings for search", Some(1)).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].route_id, "genai_programming");

        assert!(matches!(
            router.route_many("anything", Some(0)),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_route_vector_dimension_mismatch() {
        let router = router();
        assert!(matches!(
            router.route_vector(&Vector::new(vec![1.0, 0.0])),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_update_routing_config() {
        let router = router();
        router
            .update_routing_config(RoutingConfig::default().with_aggregation(Aggregation::Avg))
            .unwrap();
        assert_eq!(router.routing_config().aggregation, Aggregation::Avg);
        assert_eq!(router.routing_config().max_k, None);

        assert!(router
            .update_routing_config(RoutingConfig::default().with_max_k(0))
            .is_err());
        assert_eq!(router.routing_config().aggregation, Aggregation::Avg);
    }

    #[test]
    fn test_reconfigure_failure_keeps_snapshot() {
        let router = router();
        let bad = RouterDefinition::new("bad", vec![RouteDefinition::new("x", vec![], 0.5)]);
        assert!(router.reconfigure(&bad).is_err());
        assert_eq!(router.name(), presets::TOPIC_ROUTER_NAME);
        assert_eq!(router.route_table().len(), 3);
    }

    #[test]
    fn test_embedder_dimension_must_match_embeddings() {
        let mut route = RouteDefinition::new("raw", vec![], 0.5);
        route.embeddings = vec![vec![1.0, 0.0, 0.0]];
        let def = RouterDefinition::new("raw", vec![route]);
        let result = SemanticRouter::new(&def, Arc::new(HashEmbedder::new(8).unwrap()));
        assert!(matches!(result, Err(Error::InvalidRoute { .. })));
    }
}
