//! Embedding generation (C5): text and (unused-in-production, spec'd for
//! completeness) image embedders.
//!
//! Directly adapted from the teacher's `embedding` module: kept the
//! `Embedder` trait shape (`dimensions`/`embed`/`embed_batch` with a
//! sequential default batch impl), `DEFAULT_DIMENSIONS = 384`, the
//! hash-based deterministic fallback, and the optional `FastEmbed` backend
//! behind the same feature flag — renamed `Embedder` to `TextEmbedder` to
//! sit alongside the new `ImageEmbedder` trait per `spec.md` §4.5.
//!
//! Per `DESIGN.md`'s Open Question resolution, drawings are searched by
//! their OCR'd/captioned text through the same `TextEmbedder` as every
//! other collection; no CLIP-equivalent image embedder ships in this
//! crate. `ImageEmbedder` and [`fake_image::FakeImageEmbedder`] exist so the
//! seam is in place without committing to a vision-model dependency no
//! example repo in the retrieval pack actually uses.

mod fake_image;
mod fallback;
#[cfg(feature = "fastembed-embeddings")]
mod fastembed_impl;

pub use fake_image::FakeImageEmbedder;
pub use fallback::FallbackTextEmbedder;
#[cfg(feature = "fastembed-embeddings")]
pub use fastembed_impl::FastEmbedTextEmbedder;

use crate::error::Result;

/// Default embedding dimensions, matching the teacher's all-MiniLM-L6-v2
/// default so the fallback and real backend stay interchangeable.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Generates dense embeddings for prose/table/IFC chunk text and for
/// queries.
pub trait TextEmbedder: Send + Sync {
    /// Returns the embedding dimensionality.
    fn dimensions(&self) -> usize;

    /// Embeds one piece of text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EmbedError`] if the backend fails.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds a batch of texts. The default implementation calls
    /// [`embed`](Self::embed) sequentially; batch-capable backends should
    /// override this.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EmbedError`] if the backend fails for any
    /// input.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Generates dense embeddings for drawing/image content. Not wired into the
/// default ingestion pipeline (see module docs); kept as an extension seam.
pub trait ImageEmbedder: Send + Sync {
    /// Returns the embedding dimensionality.
    fn dimensions(&self) -> usize;

    /// Embeds one image's raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EmbedError`] if the backend fails.
    fn embed_image(&self, bytes: &[u8]) -> Result<Vec<f32>>;
}

/// Creates the default text embedder for the active feature set: the real
/// `FastEmbed` backend when `fastembed-embeddings` is enabled, the
/// deterministic hash-based fallback otherwise.
///
/// # Errors
///
/// Returns [`crate::error::EmbedError::InitFailed`] if the backend fails to
/// initialize.
#[cfg(feature = "fastembed-embeddings")]
pub fn default_text_embedder() -> Result<Box<dyn TextEmbedder>> {
    Ok(Box::new(FastEmbedTextEmbedder::new()?))
}

/// Creates the default text embedder for the active feature set.
///
/// # Errors
///
/// Never fails; kept fallible to match the feature-enabled signature.
#[cfg(not(feature = "fastembed-embeddings"))]
pub fn default_text_embedder() -> Result<Box<dyn TextEmbedder>> {
    Ok(Box::new(FallbackTextEmbedder::new(DEFAULT_DIMENSIONS)))
}

/// Cosine similarity between two embedding vectors, in `[-1.0, 1.0]`.
/// Returns `0.0` for mismatched lengths or a zero-magnitude vector.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_default_text_embedder_dimensions() {
        let embedder = default_text_embedder().unwrap();
        assert_eq!(embedder.dimensions(), DEFAULT_DIMENSIONS);
    }
}
