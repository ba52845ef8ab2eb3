//! # semroute Router
//!
//! Semantic query routing on top of `semroute-core`.
//!
//! A query is embedded, compared against every route's reference embeddings,
//! and the [`Matcher`] turns the per-route distances into a [`Decision`]: the
//! best route within its threshold, a confidence of `1 - distance`, and the
//! remaining eligible routes as ranked alternatives.
//!
//! ## Example
//!
//! ```rust
//! use semroute_router::{presets, SemanticRouter};
//! use semroute_core::HashEmbedder;
//! use std::sync::Arc;
//!
//! let router = SemanticRouter::new(&presets::topic_router(), Arc::new(HashEmbedder::default())).unwrap();
//! let decision = router.route("Beethoven piano concertos").unwrap();
//! assert_eq!(decision.best_route.as_deref(), Some("classical_music"));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Query    │────>│  Embedder   │────>│ RouteIndex  │
//! │   (text)    │     │ (text→v)    │     │ (distances) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                      ┌─────────────┐           │
//!                      │   Matcher   │<──────────┘
//!                      │ (threshold, │
//!                      │  ranking)   │
//!                      └─────────────┘
//!                             │
//!                      ┌─────────────┐
//!                      │  Decision   │
//!                      └─────────────┘
//! ```

pub mod config;
pub mod decision;
pub mod definition;
pub mod matcher;
pub mod presets;
pub mod router;

pub use config::RoutingConfig;
pub use decision::{confidence, confidence_percent, Decision, RouteMatch};
pub use definition::{RouteDefinition, RouterDefinition};
pub use matcher::{match_routes, Candidate, Matcher};
pub use router::{RouteInfo, SemanticRouter};
