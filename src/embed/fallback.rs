//! Hash-based deterministic text embedder.
//!
//! Unchanged in spirit from the teacher's `embedding::fallback`: word-level
//! and character-trigram hashing folded into a fixed-dimension vector,
//! normalized to unit length. Not semantic, but deterministic and
//! dependency-free, so tests and the default build run without a model
//! download.

use crate::embed::TextEmbedder;
use crate::error::Result;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic hash-based text embedder.
pub struct FallbackTextEmbedder {
    dimensions: usize,
}

impl FallbackTextEmbedder {
    /// Creates a fallback embedder producing vectors of `dimensions` length.
    #[must_use]
    pub const fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash_string(s: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn generate(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; self.dimensions];

        let normalized: String = text
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c.is_whitespace() {
                    c.to_ascii_lowercase()
                } else {
                    ' '
                }
            })
            .collect();

        for word in normalized.split_whitespace() {
            let hash = Self::hash_string(word);
            let idx = (hash as usize) % self.dimensions;
            let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            let magnitude = 1.0 + ((hash >> 16) & 0xFF) as f32 / 255.0;
            embedding[idx] += sign * magnitude;
        }

        let chars: Vec<char> = normalized.chars().collect();
        if chars.len() >= 3 {
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let hash = Self::hash_string(&trigram);
                let idx = (hash as usize) % self.dimensions;
                let sign = if (hash >> 32) & 1 == 0 { 0.5 } else { -0.5 };
                embedding[idx] += sign;
            }
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut embedding {
                *v /= magnitude;
            }
        }
        embedding
    }
}

impl TextEmbedder for FallbackTextEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.generate(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        use rayon::prelude::*;
        Ok(texts.par_iter().map(|t| self.generate(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::{DEFAULT_DIMENSIONS, cosine_similarity};

    #[test]
    fn test_deterministic() {
        let embedder = FallbackTextEmbedder::new(DEFAULT_DIMENSIONS);
        assert_eq!(
            embedder.embed("hello world").unwrap(),
            embedder.embed("hello world").unwrap()
        );
    }

    #[test]
    fn test_dimensions() {
        let embedder = FallbackTextEmbedder::new(DEFAULT_DIMENSIONS);
        assert_eq!(embedder.embed("pump").unwrap().len(), DEFAULT_DIMENSIONS);
    }

    #[test]
    fn test_similar_text_scores_higher() {
        let embedder = FallbackTextEmbedder::new(DEFAULT_DIMENSIONS);
        let base = embedder.embed("centrifugal pump flow rate 1000").unwrap();
        let similar = embedder.embed("centrifugal pump flow rate 900").unwrap();
        let different = embedder.embed("unrelated electrical switchgear text").unwrap();
        assert!(cosine_similarity(&base, &similar) > cosine_similarity(&base, &different));
    }

    #[test]
    fn test_batch_matches_sequential() {
        let embedder = FallbackTextEmbedder::new(DEFAULT_DIMENSIONS);
        let texts = ["a", "b", "c"];
        let batch = embedder.embed_batch(&texts).unwrap();
        for (i, text) in texts.iter().enumerate() {
            assert_eq!(batch[i], embedder.embed(text).unwrap());
        }
    }
}
