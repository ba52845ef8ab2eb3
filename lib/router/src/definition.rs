//! Declarative route definitions
//!
//! Routes are usually described by reference texts and embedded at load time.
//! A [`RouterDefinition`] is the on-disk JSON form of a whole router.

use crate::config::RoutingConfig;
use semroute_core::{Embedder, Error, Result, Route, RouteTable, Vector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Configuration for a single route
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteDefinition {
    pub name: String,

    /// Example texts describing the route's domain
    #[serde(default)]
    pub references: Vec<String>,

    /// Pre-computed reference embeddings, used as-is next to the embedded texts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeddings: Vec<Vec<f32>>,

    /// Maximum cosine distance accepted for this route (0.0 to 1.0)
    #[serde(default = "default_threshold")]
    pub distance_threshold: f32,

    #[serde(default)]
    pub priority: i32,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

fn default_threshold() -> f32 {
    0.5
}

impl RouteDefinition {
    pub fn new(name: impl Into<String>, references: Vec<String>, distance_threshold: f32) -> Self {
        Self {
            name: name.into(),
            references,
            embeddings: Vec::new(),
            distance_threshold,
            priority: 0,
            metadata: Value::Null,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Embed the reference texts and produce a validated [`Route`].
    ///
    /// Pre-computed embeddings must match the embedder's dimension.
    pub fn build(&self, embedder: &dyn Embedder) -> Result<Route> {
        if let Some(bad) = self.embeddings.iter().find(|e| e.len() != embedder.dim()) {
            return Err(Error::invalid_route(
                &self.name,
                format!(
                    "embedding dimension {} differs from embedder dimension {}",
                    bad.len(),
                    embedder.dim()
                ),
            ));
        }

        let mut vectors = embedder.embed_batch(&self.references);
        vectors.extend(self.embeddings.iter().cloned().map(Vector::new));

        Ok(Route::new(self.name.clone(), vectors, self.distance_threshold)?
            .with_priority(self.priority)
            .with_metadata(self.metadata.clone())
            .with_reference_texts(self.references.clone()))
    }
}

/// A complete router: its routes and the routing knobs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouterDefinition {
    #[serde(default = "default_router_name")]
    pub name: String,

    pub routes: Vec<RouteDefinition>,

    #[serde(default)]
    pub routing: RoutingConfig,
}

fn default_router_name() -> String {
    "router".to_string()
}

impl RouterDefinition {
    pub fn new(name: impl Into<String>, routes: Vec<RouteDefinition>) -> Self {
        Self {
            name: name.into(),
            routes,
            routing: RoutingConfig::default(),
        }
    }

    pub fn with_routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = routing;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Embed every route and assemble the table.
    ///
    /// An empty route list fails with [`Error::EmptyRouteSet`] before any
    /// embedding work happens.
    pub fn build_table(&self, embedder: &dyn Embedder) -> Result<RouteTable> {
        if self.routes.is_empty() {
            return Err(Error::EmptyRouteSet);
        }
        self.routing.validate()?;

        let routes = self
            .routes
            .iter()
            .map(|def| def.build(embedder))
            .collect::<Result<Vec<_>>>()?;
        RouteTable::new(routes)
    }
}
