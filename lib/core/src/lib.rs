//! # semroute Core
//!
//! Core library for the semroute semantic query router.
//!
//! This crate provides the building blocks the matcher works on:
//!
//! - [`Vector`] - Dense embedding with cosine distance
//! - [`Route`] - Named topic with reference embeddings and a distance threshold
//! - [`RouteTable`] - Validated, immutable set of routes
//! - [`Embedder`] - Text to vector provider ([`HashEmbedder`] built in)
//! - [`VectorIndex`] - Per-route nearest reference lookup ([`RouteIndex`] built in)
//!
//! ## Example
//!
//! ```rust
//! use semroute_core::{Route, RouteTable, RouteIndex, Vector, VectorIndex};
//!
//! let route = Route::new("greeting", vec![Vector::new(vec![1.0, 0.0])], 0.3).unwrap();
//! let table = RouteTable::new(vec![route]).unwrap();
//! let index = RouteIndex::from_table(&table).unwrap();
//!
//! let query = Vector::new(vec![1.0, 0.1]);
//! let distance = index.nearest(&query, "greeting").unwrap().unwrap();
//! assert!(distance < 0.3);
//! ```

pub mod embedder;
pub mod error;
pub mod index;
pub mod route;
pub mod vector;

/// SIMD-optimized kernels behind cosine distance
///
/// - AVX2/FMA on x86_64
/// - NEON on ARM64/Apple Silicon
/// - scalar fallback elsewhere
pub mod simd;

pub use embedder::{Embedder, HashEmbedder, DEFAULT_EMBEDDING_DIM};
pub use error::{Error, Result};
pub use index::{RouteIndex, VectorIndex};
pub use route::{Aggregation, Route, RouteTable};
pub use vector::{clamp_distance, Vector, MAX_COSINE_DISTANCE};
