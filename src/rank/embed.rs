//! Embedding capability.
//!
//! The ranker only needs "text in, fixed-length vector out". Any model can
//! back the [`Embedder`] trait; [`HashingEmbedder`] is a deterministic
//! bag-of-words stand-in that needs no model files.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError};

use crate::error::{Error, Result};
use crate::text::{is_stopword, tokenize};

/// A text embedding backend.
pub trait Embedder: Send + Sync {
    /// Length of the produced vectors.
    fn dimensions(&self) -> usize;

    /// Embed one text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts in one call.
    ///
    /// Backends that batch natively should override this.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Short backend name for logs.
    fn name(&self) -> &str {
        "embedder"
    }
}

/// Deterministic feature-hashing embedder.
///
/// Each non-stop-word token is hashed into one of `dimensions` buckets;
/// the vector is L2-normalized.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    /// Default vector length.
    pub const DEFAULT_DIMENSIONS: usize = 384;

    /// Create an embedder with the given vector length.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSIONS)
    }
}

impl Embedder for HashingEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            if is_stopword(&token) {
                continue;
            }
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

/// Embedder that always fails; stands in for an unreachable service.
#[derive(Debug, Clone, Default)]
pub struct UnavailableEmbedder;

impl Embedder for UnavailableEmbedder {
    fn dimensions(&self) -> usize {
        0
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::EmbeddingUnavailable(
            "no embedding backend configured".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

/// Embed a batch on a worker thread, giving up after `timeout`.
///
/// A timed-out worker is abandoned; its result is dropped when it finishes.
/// Every failure, including a vector count that does not match the input,
/// is reported as [`Error::EmbeddingUnavailable`].
pub fn embed_with_timeout(
    embedder: Arc<dyn Embedder>,
    texts: Vec<String>,
    timeout: Duration,
) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let expected = texts.len();
    let (tx, rx) = bounded(1);
    thread::Builder::new()
        .name("docmap-embed".to_string())
        .spawn(move || {
            let result = embedder.embed_batch(&texts);
            // The receiver is gone after a timeout
            let _ = tx.send(result);
        })?;

    let vectors = match rx.recv_timeout(timeout) {
        Ok(result) => result.map_err(|e| match e {
            Error::EmbeddingUnavailable(msg) => Error::EmbeddingUnavailable(msg),
            other => Error::EmbeddingUnavailable(other.to_string()),
        })?,
        Err(RecvTimeoutError::Timeout) => {
            return Err(Error::EmbeddingUnavailable(format!(
                "timed out after {} ms",
                timeout.as_millis()
            )))
        }
        Err(RecvTimeoutError::Disconnected) => {
            return Err(Error::EmbeddingUnavailable(
                "embedding worker stopped without a result".to_string(),
            ))
        }
    };

    if vectors.len() != expected {
        return Err(Error::EmbeddingUnavailable(format!(
            "expected {} vectors, got {}",
            expected,
            vectors.len()
        )));
    }
    Ok(vectors)
}
