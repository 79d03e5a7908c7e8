//! `FastEmbed` semantic text embedder (all-MiniLM-L6-v2), behind the
//! `fastembed-embeddings` feature. Adapted unchanged in structure from the
//! teacher's `embedding::fastembed_impl`.

use crate::embed::{DEFAULT_DIMENSIONS, TextEmbedder};
use crate::error::{EmbedError, Result};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::OnceLock;

static EMBEDDING_MODEL: OnceLock<std::sync::Mutex<fastembed::TextEmbedding>> = OnceLock::new();

/// `FastEmbed`-backed text embedder. The model is lazily loaded on first
/// use to keep cold start time low for commands that never query it.
pub struct FastEmbedTextEmbedder {
    model_name: &'static str,
}

impl FastEmbedTextEmbedder {
    /// Creates a new `FastEmbed` embedder. Does not load the model; that
    /// happens lazily on first [`embed`](TextEmbedder::embed) call.
    ///
    /// # Errors
    ///
    /// Never fails today; kept fallible to match the feature seam.
    #[allow(clippy::missing_const_for_fn, clippy::unnecessary_wraps)]
    pub fn new() -> Result<Self> {
        Ok(Self {
            model_name: "all-MiniLM-L6-v2",
        })
    }

    fn get_model() -> Result<&'static std::sync::Mutex<fastembed::TextEmbedding>> {
        if let Some(model) = EMBEDDING_MODEL.get() {
            return Ok(model);
        }
        let options = fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2)
            .with_show_download_progress(false);
        let model = fastembed::TextEmbedding::try_new(options)
            .map_err(|e| EmbedError::InitFailed(e.to_string()))?;
        let _ = EMBEDDING_MODEL.set(std::sync::Mutex::new(model));
        EMBEDDING_MODEL
            .get()
            .ok_or_else(|| EmbedError::InitFailed("model initialization race".to_string()).into())
    }

    /// Returns the underlying model name, for logs.
    #[must_use]
    pub const fn model_name(&self) -> &'static str {
        self.model_name
    }
}

fn recover_panic_message(panic_info: Box<dyn std::any::Any + Send>) -> String {
    panic_info
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic_info.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl TextEmbedder for FastEmbedTextEmbedder {
    fn dimensions(&self) -> usize {
        DEFAULT_DIMENSIONS
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(EmbedError::GenerationFailed("cannot embed empty text".to_string()).into());
        }
        let model = Self::get_model()?;
        let mut model = model
            .lock()
            .map_err(|e| EmbedError::GenerationFailed(format!("model lock poisoned: {e}")))?;

        let texts = [text];
        let result = catch_unwind(AssertUnwindSafe(|| model.embed(texts, None)));
        let embeddings = result
            .map_err(|p| EmbedError::GenerationFailed(format!("ONNX runtime panic: {}", recover_panic_message(p))))?
            .map_err(|e| EmbedError::GenerationFailed(e.to_string()))?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::GenerationFailed("no embedding returned".to_string()).into())
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|t| t.is_empty()) {
            return Err(EmbedError::GenerationFailed("cannot embed empty text".to_string()).into());
        }
        let model = Self::get_model()?;
        let mut model = model
            .lock()
            .map_err(|e| EmbedError::GenerationFailed(format!("model lock poisoned: {e}")))?;

        let result = catch_unwind(AssertUnwindSafe(|| model.embed(texts.to_vec(), None)));
        let embeddings = result
            .map_err(|p| EmbedError::GenerationFailed(format!("ONNX runtime panic: {}", recover_panic_message(p))))?
            .map_err(|e| EmbedError::GenerationFailed(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(EmbedError::BatchSizeMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            }
            .into());
        }
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder = FastEmbedTextEmbedder::new().unwrap();
        assert_eq!(embedder.dimensions(), DEFAULT_DIMENSIONS);
        assert_eq!(embedder.model_name(), "all-MiniLM-L6-v2");
    }

    #[test]
    fn test_embed_empty_fails() {
        let embedder = FastEmbedTextEmbedder::new().unwrap();
        assert!(embedder.embed("").is_err());
    }

    #[test]
    fn test_embed_batch_empty_list() {
        let embedder = FastEmbedTextEmbedder::new().unwrap();
        assert!(embedder.embed_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_embed_batch_with_empty_fails() {
        let embedder = FastEmbedTextEmbedder::new().unwrap();
        assert!(embedder.embed_batch(&["valid", "", "also valid"]).is_err());
    }

    #[test]
    #[ignore = "requires fastembed model download"]
    fn test_embed_real_model() {
        let embedder = FastEmbedTextEmbedder::new().unwrap();
        let result = embedder.embed("Hello, world!").unwrap();
        assert_eq!(result.len(), DEFAULT_DIMENSIONS);
    }
}
