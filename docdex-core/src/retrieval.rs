//! Query-side retrieval: embed a question, search the index, join
//! metadata.

use tracing::{error, info};

use crate::document::QueryResult;
use crate::embedder::Embedder;
use crate::error::{Error, Result};
use crate::index::VectorIndex;

/// Serves semantic queries against a loaded index.
///
/// The retriever checks for an empty index before asking the backend for
/// a query embedding, so a query against an empty index costs nothing.
pub struct Retriever {
    index: VectorIndex,
    embedder: Box<dyn Embedder>,
}

impl Retriever {
    /// Creates a retriever over an index and an embedding backend.
    ///
    /// The backend must be the same model family the index was built
    /// with; vectors from a different model occupy a different space and
    /// the distances would be meaningless.
    pub fn new(index: VectorIndex, embedder: Box<dyn Embedder>) -> Self {
        Self { index, embedder }
    }

    /// The underlying index.
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Returns the `k` chunks nearest to `query`, closest first.
    ///
    /// If the index holds fewer than `k` rows, every row is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `k` is zero,
    /// [`Error::IndexEmpty`] if the index has no rows, and
    /// [`Error::EmbeddingBackend`] if the query cannot be embedded.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<QueryResult>> {
        if k == 0 {
            return Err(Error::InvalidArgument(
                "result count k must be greater than zero".into(),
            ));
        }
        if self.index.is_empty() {
            return Err(Error::IndexEmpty);
        }

        let embedding = self.embedder.embed(query).inspect_err(|err| {
            error!(error = %err, "embedding failed during query");
        })?;
        let hits = self.index.search(&embedding, k)?;

        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            let meta = self.index.metadata(hit.row).ok_or_else(|| {
                Error::IndexCorrupt(format!(
                    "search returned row {} but the index holds {} metadata records",
                    hit.row,
                    self.index.len()
                ))
            })?;
            results.push(QueryResult {
                name: meta.name.clone(),
                chunk: meta.text.clone(),
                distance: hit.distance,
            });
        }

        info!(results = results.len(), requested = k, "query served");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ChunkMeta;
    use crate::embedder::MockEmbedder;

    fn retriever_over(texts: &[(&str, &str)]) -> Retriever {
        let embedder = MockEmbedder::new(12);
        let vectors: Vec<Vec<f32>> = texts
            .iter()
            .map(|(_, text)| embedder.embed(text).unwrap())
            .collect();
        let metadata: Vec<ChunkMeta> = texts
            .iter()
            .map(|(name, text)| ChunkMeta {
                name: (*name).into(),
                text: (*text).into(),
            })
            .collect();
        let mut index = VectorIndex::new(12).unwrap();
        index.add(vectors, metadata).unwrap();
        Retriever::new(index, Box::new(embedder))
    }

    #[test]
    fn identical_text_ranks_first_with_zero_distance() {
        let retriever = retriever_over(&[
            ("UIView", "A view manages content for a rectangular area."),
            ("UIButton", "A control that executes custom code on taps."),
        ]);
        let results = retriever
            .retrieve("A view manages content for a rectangular area.", 1)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "UIView");
        assert_eq!(results[0].distance, 0.0);
    }

    #[test]
    fn results_come_back_closest_first() {
        let retriever = retriever_over(&[
            ("alpha", "alpha text"),
            ("beta", "beta text"),
            ("gamma", "gamma text"),
        ]);
        let results = retriever.retrieve("beta text", 3).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].name, "beta");
        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn fewer_rows_than_k_returns_all() {
        let retriever = retriever_over(&[("only", "just one chunk")]);
        let results = retriever.retrieve("anything", 10).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn zero_k_is_rejected() {
        let retriever = retriever_over(&[("a", "a")]);
        let err = retriever.retrieve("query", 0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn empty_index_is_rejected_before_embedding() {
        struct PanickyEmbedder;
        impl Embedder for PanickyEmbedder {
            fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
                panic!("embedder must not be called for an empty index");
            }
        }

        let index = VectorIndex::new(4).unwrap();
        let retriever = Retriever::new(index, Box::new(PanickyEmbedder));
        let err = retriever.retrieve("query", 3).unwrap_err();
        assert!(matches!(err, Error::IndexEmpty));
    }
}
