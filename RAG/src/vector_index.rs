use crate::document_processor::TextSplitter;
use crate::embedding_service::{calculate_similarity, EmbeddingService};
use crate::models::*;
use anyhow::Result;

/// In-memory index of embedded chunks.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    embedder: EmbeddingService,
    chunks: Vec<DocumentChunk>,
}

impl VectorIndex {
    pub fn from_documents(documents: &[Document], splitter: &TextSplitter) -> Result<Self> {
        if documents.is_empty() {
            anyhow::bail!("cannot build an index without documents");
        }

        let mut chunks: Vec<DocumentChunk> = documents
            .iter()
            .flat_map(|document| splitter.split_document(document))
            .collect();

        let embedder = EmbeddingService::fit(&chunks);
        embedder.embed_chunks(&mut chunks);

        log::info!(
            "Indexed {} chunks from {} documents",
            chunks.len(),
            documents.len()
        );

        Ok(Self { embedder, chunks })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns up to `top_k` chunks, most similar first.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Vec<ScoredChunk> {
        let query_embedding = self.embedder.embed(query);

        let mut scored: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                chunk.embedding.as_ref().map(|embedding| ScoredChunk {
                    chunk: chunk.clone(),
                    score: calculate_similarity(&query_embedding, embedding),
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        log::debug!("Found {} relevant chunks", scored.len());
        scored
    }
}

/// Builds a searchable index from parsed documents.
pub trait IndexBuilder: Send + Sync {
    fn build_index(&self, documents: &[Document]) -> Result<VectorIndex>;
}

#[derive(Debug, Clone)]
pub struct TfIdfIndexBuilder {
    splitter: TextSplitter,
}

impl TfIdfIndexBuilder {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Ok(Self {
            splitter: TextSplitter::new(chunk_size, chunk_overlap)?,
        })
    }
}

impl IndexBuilder for TfIdfIndexBuilder {
    fn build_index(&self, documents: &[Document]) -> Result<VectorIndex> {
        VectorIndex::from_documents(documents, &self.splitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn document(filename: &str, content: &str) -> Document {
        Document {
            id: filename.to_string(),
            filename: filename.to_string(),
            content: content.to_string(),
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn retrieves_chunk_sharing_query_terms_first() {
        let builder = TfIdfIndexBuilder::new(60, 10).unwrap();
        let index = builder
            .build_index(&[
                document("shipping.txt", "Parcels ship from the central warehouse every morning."),
                document("refunds.txt", "Refund requests are honoured within thirty days of purchase."),
                document("support.txt", "Support agents answer tickets around the clock."),
            ])
            .unwrap();

        let results = index.retrieve("How long do I have to request a refund?", 2);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.filename, "refunds.txt");
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn top_k_larger_than_index_returns_everything() {
        let builder = TfIdfIndexBuilder::new(500, 50).unwrap();
        let index = builder.build_index(&[document("a.txt", "Just one sentence.")]).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.retrieve("sentence", 5).len(), 1);
    }

    #[test]
    fn empty_document_set_is_rejected() {
        let builder = TfIdfIndexBuilder::new(500, 50).unwrap();
        assert!(builder.build_index(&[]).is_err());
    }

    #[test]
    fn documents_without_text_build_an_empty_index() {
        let builder = TfIdfIndexBuilder::new(500, 50).unwrap();
        let index = builder.build_index(&[document("scan.pdf", "")]).unwrap();

        assert!(index.is_empty());
        assert!(index.retrieve("anything", 2).is_empty());
    }
}
