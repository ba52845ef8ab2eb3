//! Embedding providers
//!
//! The router only needs `text -> fixed-length vector`. [`HashEmbedder`] is a
//! deterministic feature-hashing embedder that needs no model files: words and
//! character trigrams are hashed into signed buckets and the result is normalized.
//! Model-backed providers plug in through the [`Embedder`] trait.

use crate::{Error, Result, Vector};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Default output dimension for [`HashEmbedder`]
pub const DEFAULT_EMBEDDING_DIM: usize = 256;

const WORD_WEIGHT: f32 = 2.0;
const TRIGRAM_WEIGHT: f32 = 1.0;

/// Maps free text to a fixed-length vector.
///
/// Implementations must be deterministic for identical input.
pub trait Embedder: Send + Sync {
    /// Output dimension
    fn dim(&self) -> usize;

    fn embed(&self, text: &str) -> Vector;

    fn embed_batch(&self, texts: &[String]) -> Vec<Vector> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Feature-hashing text embedder
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self { dim })
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        let hash = hasher.finish();

        let bucket = (hash % self.dim as u64) as usize;
        // Top bit picks the sign so collisions cancel instead of piling up
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            dim: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Vector {
        let mut data = vec![0.0f32; self.dim];
        let lowered = text.to_lowercase();

        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            self.add_feature(&mut data, token, WORD_WEIGHT);

            let padded: Vec<char> = format!(" {} ", token).chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut data, &trigram, TRIGRAM_WEIGHT);
            }
        }

        let mut vector = Vector::new(data);
        vector.normalize();
        vector
    }
}
