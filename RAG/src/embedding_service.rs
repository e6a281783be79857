use crate::models::*;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

const VOCABULARY_SIZE: usize = 1000;
const MIN_DIMENSIONS: usize = 100;

/// TF-IDF embedder fitted on one chunk corpus. Queries must be embedded with
/// the same instance that embedded the corpus.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingService {
    vocabulary: HashMap<String, usize>,
    idf_scores: HashMap<String, f32>,
}

impl EmbeddingService {
    pub fn fit(chunks: &[DocumentChunk]) -> Self {
        let mut word_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_frequencies: HashMap<String, usize> = HashMap::new();
        let total_chunks = chunks.len();

        for chunk in chunks {
            let words = tokenize(&chunk.content);
            let unique_words: HashSet<_> = words.iter().collect();

            for word in &words {
                *word_counts.entry(word.clone()).or_insert(0) += 1;
            }

            for word in unique_words {
                *doc_frequencies.entry(word.clone()).or_insert(0) += 1;
            }
        }

        // Smoothed so that terms present in every chunk keep a non-zero weight.
        let idf_scores: HashMap<String, f32> = doc_frequencies
            .iter()
            .map(|(word, df)| {
                let idf = (1.0 + total_chunks as f32 / *df as f32).ln();
                (word.clone(), idf)
            })
            .collect();

        // Ties broken alphabetically so the vocabulary is deterministic.
        let mut word_freq_pairs: Vec<_> = word_counts.into_iter().collect();
        word_freq_pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let vocabulary: HashMap<String, usize> = word_freq_pairs
            .into_iter()
            .take(VOCABULARY_SIZE)
            .enumerate()
            .map(|(idx, (word, _))| (word, idx))
            .collect();

        log::info!(
            "Fitted TF-IDF vocabulary of {} terms over {} chunks",
            vocabulary.len(),
            total_chunks
        );

        Self { vocabulary, idf_scores }
    }

    pub fn dimensions(&self) -> usize {
        self.vocabulary.len().max(MIN_DIMENSIONS)
    }

    pub fn embed_chunks(&self, chunks: &mut [DocumentChunk]) {
        chunks.par_iter_mut().for_each(|chunk| {
            chunk.embedding = Some(self.embed(&chunk.content));
        });
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions()];
        let words = tokenize(text);
        let word_counts = count_words(&words);
        let total_words = words.len() as f32;

        for (word, count) in word_counts {
            if let Some(&idx) = self.vocabulary.get(&word) {
                let tf = count as f32 / total_words;
                let idf = self.idf_scores.get(&word).copied().unwrap_or(1.0);
                embedding[idx] = tf * idf;
            }
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in embedding.iter_mut() {
                *value /= norm;
            }
        }

        embedding
    }
}

pub fn calculate_similarity(embedding1: &[f32], embedding2: &[f32]) -> f32 {
    let min_len = embedding1.len().min(embedding2.len());

    let dot_product: f32 = embedding1[..min_len]
        .iter()
        .zip(embedding2[..min_len].iter())
        .map(|(a, b)| a * b)
        .sum();

    let norm1: f32 = embedding1[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm2: f32 = embedding2[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm1 == 0.0 || norm2 == 0.0 {
        0.0
    } else {
        dot_product / (norm1 * norm2)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| word.chars().count() > 2)
        .collect()
}

fn count_words(words: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for word in words {
        *counts.entry(word.clone()).or_insert(0) += 1;
    }
    counts
}
