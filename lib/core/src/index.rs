//! Route reference index
//!
//! [`RouteIndex`] stores every route's references as one contiguous block of
//! unit-length vectors, so a route distance is a run of dot products against a
//! normalized query. Scans over many routes run on the rayon pool.

use crate::route::{Aggregation, RouteTable};
use crate::simd::dot_product_simd;
use crate::vector::clamp_distance;
use crate::{Error, Result, Vector};
use ahash::AHashMap;
use rayon::prelude::*;

// Fewer routes than this are scanned on the calling thread
const PARALLEL_MIN_ROUTES: usize = 8;

/// Nearest-reference lookup per route
pub trait VectorIndex: Send + Sync {
    fn dim(&self) -> usize;

    /// Distance from `query` to one route, `None` if the route is not indexed
    fn route_distance(
        &self,
        query: &Vector,
        route: &str,
        aggregation: Aggregation,
    ) -> Result<Option<f32>>;

    /// Distance from `query` to every indexed route, in index order
    fn route_distances(&self, query: &Vector, aggregation: Aggregation)
        -> Result<Vec<(String, f32)>>;

    /// Minimum cosine distance to a route's references
    fn nearest(&self, query: &Vector, route: &str) -> Result<Option<f32>> {
        self.route_distance(query, route, Aggregation::Min)
    }

    /// Minimum cosine distance for every route in one call
    fn nearest_all(&self, query: &Vector) -> Result<Vec<(String, f32)>> {
        self.route_distances(query, Aggregation::Min)
    }
}

#[derive(Debug, Clone)]
struct RouteBlock {
    name: String,
    // `count` unit vectors laid out back to back
    data: Vec<f32>,
    count: usize,
}

/// In-memory flat index over route references
#[derive(Debug, Clone)]
pub struct RouteIndex {
    dim: usize,
    blocks: Vec<RouteBlock>,
    slots: AHashMap<String, usize>,
}

impl RouteIndex {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig(
                "index dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            dim,
            blocks: Vec::new(),
            slots: AHashMap::new(),
        })
    }

    pub fn from_table(table: &RouteTable) -> Result<Self> {
        let mut index = Self::new(table.dim())?;
        for route in table {
            index.add_references(route.name(), route.references())?;
        }
        tracing::debug!(
            "Indexed {} references across {} routes",
            index.num_docs(),
            index.num_routes()
        );
        Ok(index)
    }

    /// Append references to a route, creating it if needed
    pub fn add_references(&mut self, route: &str, references: &[Vector]) -> Result<()> {
        if references.is_empty() {
            return Err(Error::invalid_route(route, "route has no reference embeddings"));
        }
        if let Some(bad) = references.iter().find(|r| r.dim() != self.dim) {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: bad.dim(),
            });
        }

        let slot = match self.slots.get(route) {
            Some(&slot) => slot,
            None => {
                self.blocks.push(RouteBlock {
                    name: route.to_string(),
                    data: Vec::with_capacity(references.len() * self.dim),
                    count: 0,
                });
                self.slots.insert(route.to_string(), self.blocks.len() - 1);
                self.blocks.len() - 1
            }
        };

        let block = &mut self.blocks[slot];
        for reference in references {
            block
                .data
                .extend_from_slice(reference.normalized().as_slice());
            block.count += 1;
        }
        Ok(())
    }

    pub fn num_routes(&self) -> usize {
        self.blocks.len()
    }

    /// Total number of indexed reference vectors
    pub fn num_docs(&self) -> usize {
        self.blocks.iter().map(|b| b.count).sum()
    }

    fn unit_query(&self, query: &Vector) -> Result<Vector> {
        if query.dim() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: query.dim(),
            });
        }
        Ok(query.normalized())
    }

    fn block_distance(&self, block: &RouteBlock, unit_query: &[f32], aggregation: Aggregation) -> f32 {
        // A zero query has no direction; every reference sits at distance 1
        let zero_query = unit_query.iter().all(|&x| x == 0.0);
        let distances = block.data.chunks_exact(self.dim).map(|reference| {
            if zero_query {
                1.0
            } else {
                clamp_distance(1.0 - dot_product_simd(unit_query, reference))
            }
        });

        match aggregation {
            Aggregation::Min => distances.fold(f32::INFINITY, f32::min),
            Aggregation::Avg => {
                if block.count == 0 {
                    f32::INFINITY
                } else {
                    distances.sum::<f32>() / block.count as f32
                }
            }
        }
    }
}

impl VectorIndex for RouteIndex {
    fn dim(&self) -> usize {
        self.dim
    }

    fn route_distance(
        &self,
        query: &Vector,
        route: &str,
        aggregation: Aggregation,
    ) -> Result<Option<f32>> {
        let unit = self.unit_query(query)?;
        Ok(self
            .slots
            .get(route)
            .map(|&slot| self.block_distance(&self.blocks[slot], unit.as_slice(), aggregation)))
    }

    fn route_distances(
        &self,
        query: &Vector,
        aggregation: Aggregation,
    ) -> Result<Vec<(String, f32)>> {
        let unit = self.unit_query(query)?;
        let unit = unit.as_slice();
        let score = |block: &RouteBlock| {
            (block.name.clone(), self.block_distance(block, unit, aggregation))
        };

        if self.blocks.len() >= PARALLEL_MIN_ROUTES {
            Ok(self.blocks.par_iter().map(score).collect())
        } else {
            Ok(self.blocks.iter().map(score).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Route;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn table() -> RouteTable {
        RouteTable::new(vec![
            Route::new(
                "x",
                vec![Vector::new(vec![1.0, 0.0, 0.0]), Vector::new(vec![0.0, 0.0, 1.0])],
                0.5,
            )
            .unwrap(),
            Route::new("y", vec![Vector::new(vec![0.0, 3.0, 0.0])], 0.5).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_nearest() {
        let index = RouteIndex::from_table(&table()).unwrap();
        assert_eq!(index.num_routes(), 2);
        assert_eq!(index.num_docs(), 3);

        let query = Vector::new(vec![2.0, 0.0, 0.0]);
        assert!(index.nearest(&query, "x").unwrap().unwrap().abs() < 1e-6);
        assert!((index.nearest(&query, "y").unwrap().unwrap() - 1.0).abs() < 1e-6);
        assert!(index.nearest(&query, "z").unwrap().is_none());
    }

    #[test]
    fn test_avg_aggregation() {
        let index = RouteIndex::from_table(&table()).unwrap();
        let query = Vector::new(vec![1.0, 0.0, 0.0]);
        let avg = index.route_distance(&query, "x", Aggregation::Avg).unwrap().unwrap();
        assert!((avg - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch() {
        let index = RouteIndex::from_table(&table()).unwrap();
        let query = Vector::new(vec![1.0, 0.0]);
        assert!(matches!(
            index.nearest_all(&query),
            Err(Error::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(RouteIndex::new(0), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_add_references_validation() {
        let mut index = RouteIndex::new(2).unwrap();
        assert!(matches!(
            index.add_references("r", &[]),
            Err(Error::InvalidRoute { .. })
        ));
        assert!(matches!(
            index.add_references("r", &[Vector::new(vec![])]),
            Err(Error::DimensionMismatch { expected: 2, actual: 0 })
        ));
        assert_eq!(index.num_routes(), 0);

        index.add_references("r", &[Vector::new(vec![0.0, 1.0])]).unwrap();
        index.add_references("r", &[Vector::new(vec![1.0, 0.0])]).unwrap();
        assert_eq!(index.num_routes(), 1);
        assert_eq!(index.num_docs(), 2);
        let query = Vector::new(vec![1.0, 0.0]);
        assert!(index.nearest(&query, "r").unwrap().unwrap().abs() < 1e-6);
    }

    #[test]
    fn test_zero_query() {
        let index = RouteIndex::from_table(&table()).unwrap();
        let query = Vector::new(vec![0.0, 0.0, 0.0]);
        for (_, distance) in index.nearest_all(&query).unwrap() {
            assert_eq!(distance, 1.0);
        }
    }

    #[test]
    fn test_agrees_with_route_min_distance() {
        let mut rng = StdRng::seed_from_u64(42);
        let dim = 48;
        let mut random = || Vector::new((0..dim).map(|_| rng.random_range(-1.0f32..1.0)).collect());

        let routes: Vec<Route> = (0..12)
            .map(|i| Route::new(format!("r{}", i), (0..5).map(|_| random()).collect(), 0.7).unwrap())
            .collect();
        let table = RouteTable::new(routes).unwrap();
        let index = RouteIndex::from_table(&table).unwrap();

        let query = random();
        let bulk = index.nearest_all(&query).unwrap();
        assert_eq!(bulk.len(), 12);
        for ((name, distance), route) in bulk.iter().zip(table.iter()) {
            assert_eq!(name, route.name());
            let direct = route.min_distance(&query).unwrap();
            assert!((distance - direct).abs() < 1e-4, "{}: {} vs {}", name, distance, direct);
        }
    }
}
