//! Appearance embeddings and their similarity measure.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::shared::constants::SIMILARITY_EPSILON;

/// Appearance embedding of one person crop.
///
/// Produced by the upstream tracker's feature extractor and immutable once
/// created. Similarity is computed in `f64`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f32>", into = "Vec<f32>")]
pub struct Embedding(Array1<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(Array1::from_vec(values))
    }

    pub fn from_array(values: Array1<f32>) -> Self {
        Self(values)
    }

    pub fn as_array(&self) -> &Array1<f32> {
        &self.0
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn norm(&self) -> f64 {
        self.0
            .iter()
            .map(|x| (*x as f64) * (*x as f64))
            .sum::<f64>()
            .sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|x| x.is_finite())
    }

    /// True when the norm is small enough that the epsilon guard dominates
    /// the similarity denominator.
    pub fn is_degenerate(&self) -> bool {
        self.norm() < SIMILARITY_EPSILON
    }

    /// `dot(a, b) / (|a| * |b| + eps)`.
    ///
    /// Never divides by zero; a near-zero vector scores close to 0 against
    /// everything. Vectors of different length are compared over their
    /// common prefix, callers are expected to reject mismatches first.
    pub fn cosine_similarity(&self, other: &Embedding) -> f64 {
        let dot: f64 = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (*a as f64) * (*b as f64))
            .sum();
        dot / (self.norm() * other.norm() + SIMILARITY_EPSILON)
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(embedding: Embedding) -> Self {
        embedding.0.to_vec()
    }
}
