//! Route configuration values
//!
//! A [`Route`] is a named topic described by reference embeddings and a distance
//! threshold. A [`RouteTable`] is the validated, immutable set of routes a router
//! matches against. Both are checked once at construction; nothing downstream
//! re-validates them.

use crate::{Error, Result, Vector};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a route's reference distances collapse into one route distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Closest reference wins
    #[default]
    Min,
    /// Mean distance over all references
    Avg,
}

/// A named routing target with reference embeddings
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    references: Vec<Vector>,
    reference_texts: Vec<String>,
    threshold: f32,
    priority: i32,
    metadata: Value,
}

impl Route {
    /// Create a route from reference embeddings.
    ///
    /// Fails with [`Error::InvalidRoute`] when the name is blank, the reference set
    /// is empty, the references disagree on dimension, or the threshold is not a
    /// finite value in `[0, 1]`.
    pub fn new(name: impl Into<String>, references: Vec<Vector>, threshold: f32) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_route(name, "route name cannot be empty"));
        }
        if references.is_empty() {
            return Err(Error::invalid_route(name, "route has no reference embeddings"));
        }
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(Error::invalid_route(
                name,
                format!("distance threshold {} is outside [0, 1]", threshold),
            ));
        }

        let dim = references[0].dim();
        if dim == 0 {
            return Err(Error::invalid_route(name, "reference embeddings cannot be empty"));
        }
        if let Some(bad) = references.iter().find(|r| r.dim() != dim) {
            return Err(Error::invalid_route(
                name,
                format!("reference dimension {} differs from {}", bad.dim(), dim),
            ));
        }

        Ok(Self {
            name,
            references,
            reference_texts: Vec::new(),
            threshold,
            priority: 0,
            metadata: Value::Null,
        })
    }

    /// Tie-break priority; higher wins an exact distance tie
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Opaque metadata carried through to decisions
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Source texts of the references, kept for display only
    #[must_use]
    pub fn with_reference_texts(mut self, texts: Vec<String>) -> Self {
        self.reference_texts = texts;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn references(&self) -> &[Vector] {
        &self.references
    }

    pub fn reference_texts(&self) -> &[String] {
        &self.reference_texts
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn metadata(&self) -> &Value {
        &self.metadata
    }

    pub fn dim(&self) -> usize {
        self.references[0].dim()
    }

    /// Threshold is inclusive
    #[inline]
    pub fn accepts(&self, distance: f32) -> bool {
        distance <= self.threshold
    }

    /// Smallest cosine distance from `query` to any reference
    pub fn min_distance(&self, query: &Vector) -> Result<f32> {
        let mut best = f32::INFINITY;
        for reference in &self.references {
            let d = query.cosine_distance(reference)?;
            if d < best {
                best = d;
            }
        }
        Ok(best)
    }

    /// Mean cosine distance from `query` over all references
    pub fn mean_distance(&self, query: &Vector) -> Result<f32> {
        let mut total = 0.0f32;
        for reference in &self.references {
            total += query.cosine_distance(reference)?;
        }
        Ok(total / self.references.len() as f32)
    }

    pub fn distance(&self, query: &Vector, aggregation: Aggregation) -> Result<f32> {
        match aggregation {
            Aggregation::Min => self.min_distance(query),
            Aggregation::Avg => self.mean_distance(query),
        }
    }
}

/// Validated, immutable set of routes sharing one embedding dimension
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    by_name: AHashMap<String, usize>,
    dim: usize,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Result<Self> {
        let Some(first) = routes.first() else {
            return Err(Error::EmptyRouteSet);
        };
        let dim = first.dim();

        let mut by_name = AHashMap::with_capacity(routes.len());
        for (slot, route) in routes.iter().enumerate() {
            if route.dim() != dim {
                return Err(Error::invalid_route(
                    route.name(),
                    format!("dimension {} differs from table dimension {}", route.dim(), dim),
                ));
            }
            if by_name.insert(route.name().to_string(), slot).is_some() {
                return Err(Error::invalid_route(route.name(), "duplicate route name"));
            }
        }

        Ok(Self {
            routes,
            by_name,
            dim,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|&slot| &self.routes[slot])
    }

    /// Total number of reference embeddings across all routes
    pub fn num_references(&self) -> usize {
        self.routes.iter().map(|r| r.references().len()).sum()
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}
