use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Largest cosine distance: two vectors pointing in opposite directions
pub const MAX_COSINE_DISTANCE: f32 = 2.0;

/// A dense embedding vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        crate::simd::norm_simd(&self.data)
    }

    /// Cosine distance (`1 - cosine similarity`) clamped to `[0, 2]`.
    ///
    /// A zero vector has no direction; its distance to anything is 1.0.
    pub fn cosine_distance(&self, other: &Vector) -> Result<f32> {
        if self.dim() != other.dim() {
            return Err(Error::DimensionMismatch {
                expected: other.dim(),
                actual: self.dim(),
            });
        }

        let (dot, norm_a, norm_b) = crate::simd::cosine_parts_simd(&self.data, &other.data);
        if norm_a <= 0.0 || norm_b <= 0.0 {
            return Ok(1.0);
        }

        Ok(clamp_distance(1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())))
    }

    /// Scale to unit length in place. Zero vectors are left untouched.
    #[inline]
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > f32::EPSILON {
            let inv_norm = 1.0 / norm;
            for x in &mut self.data {
                *x *= inv_norm;
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut v = self.clone();
        v.normalize();
        v
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

/// Pull a raw cosine distance back into `[0, 2]`.
///
/// Floating point error can push identical vectors slightly below zero. NaN maps
/// to the maximum distance so it never passes a threshold.
#[inline]
pub fn clamp_distance(distance: f32) -> f32 {
    if distance.is_nan() {
        return MAX_COSINE_DISTANCE;
    }
    distance.clamp(0.0, MAX_COSINE_DISTANCE)
}
