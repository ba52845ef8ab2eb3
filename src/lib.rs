//! # semroute
//!
//! A semantic query router: free-text queries are embedded and routed to the
//! closest configured topic, with a confidence score and ranked alternatives.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! semroute info
//! semroute route "How do I implement RAG with vector databases?"
//! semroute --routes my_routes.json multi "tell me about artificial intelligence"
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use semroute::prelude::*;
//! use std::sync::Arc;
//!
//! let embedder = Arc::new(HashEmbedder::default());
//! let router = SemanticRouter::new(&presets::topic_router(), embedder).unwrap();
//!
//! let decision = router.route("Vivaldi Four Seasons").unwrap();
//! if let Some(route) = &decision.best_route {
//!     println!("{} ({}%)", route, decision.confidence_percent().unwrap());
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - `semroute-core` - Vectors, SIMD cosine kernels, routes, embedders, route index
//! - `semroute-router` - Matcher, decisions, route definitions, router sessions
//!
//! ## Features
//!
//! - **Closest example wins**: a route's distance is its best reference match
//! - **Per-route thresholds**: every route clears its own bar independently
//! - **Deterministic ties**: priority, then route name
//! - **Atomic reconfiguration**: routing snapshots are swapped, never mutated

// Re-export core types
pub use semroute_core::{
    Aggregation, Embedder, Error, HashEmbedder, Result, Route, RouteIndex, RouteTable, Vector,
    VectorIndex,
};

// Re-export router
pub use semroute_router::{
    match_routes, presets, Decision, Matcher, RouteDefinition, RouteInfo, RouteMatch,
    RouterDefinition, RoutingConfig, SemanticRouter,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        match_routes, presets, Aggregation, Decision, Embedder, Error, HashEmbedder, Matcher,
        Result, Route, RouteDefinition, RouteIndex, RouteMatch, RouteTable, RouterDefinition,
        RoutingConfig, SemanticRouter, Vector, VectorIndex,
    };
}

/// SIMD-optimized vector operations
pub mod simd {
    pub use semroute_core::simd::{cosine_parts_simd, dot_product_simd, norm_simd};
}
