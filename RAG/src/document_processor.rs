use crate::models::*;
use anyhow::{Context, Result};
use pdf_extract::extract_text;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

/// Turns every file in a directory into parsed documents.
pub trait DocumentReader: Send + Sync {
    fn load_data(&self, dir: &Path) -> Result<Vec<Document>>;
}

/// Reads PDFs through `pdf-extract` and everything else as UTF-8 text.
#[derive(Debug, Default, Clone)]
pub struct SimpleDirectoryReader;

impl SimpleDirectoryReader {
    pub fn new() -> Self {
        Self
    }

    fn read_file(&self, file_path: &Path) -> Result<Document> {
        let filename = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .with_context(|| format!("invalid file path: {}", file_path.display()))?;

        let is_pdf = file_path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);

        log::info!("Reading {}", filename);

        let content = if is_pdf {
            extract_text(file_path)
                .with_context(|| format!("failed to extract text from {}", filename))?
        } else {
            fs::read_to_string(file_path)
                .with_context(|| format!("{} is not a readable text file", filename))?
        };

        let file_size = fs::metadata(file_path)?.len();
        let mut metadata = BTreeMap::new();
        metadata.insert("file_name".to_string(), filename.clone());
        metadata.insert("file_size".to_string(), file_size.to_string());
        metadata.insert(
            "file_type".to_string(),
            if is_pdf { "application/pdf" } else { "text/plain" }.to_string(),
        );

        Ok(Document {
            id: Uuid::new_v4().to_string(),
            filename,
            content,
            metadata,
        })
    }
}

impl DocumentReader for SimpleDirectoryReader {
    fn load_data(&self, dir: &Path) -> Result<Vec<Document>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            anyhow::bail!("No files found in {}", dir.display());
        }

        let documents = paths
            .iter()
            .map(|path| self.read_file(path))
            .collect::<Result<Vec<_>>>()?;

        log::info!("Processed {} documents", documents.len());
        Ok(documents)
    }
}

/// Packs sentences into overlapping character-bounded chunks.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    overlap: usize,
    re_whitespace: Regex,
    re_special: Regex,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            anyhow::bail!("chunk size must be positive");
        }
        if overlap >= chunk_size {
            anyhow::bail!("chunk overlap ({}) must be smaller than chunk size ({})", overlap, chunk_size);
        }

        Ok(Self {
            chunk_size,
            overlap,
            re_whitespace: Regex::new(r"\s+")?,
            re_special: Regex::new(r"[^\w\s.,!?;:()\-\[\]{}%$/']")?,
        })
    }

    pub fn split_document(&self, document: &Document) -> Vec<DocumentChunk> {
        let chunk = |content: &str, start: usize| DocumentChunk {
            id: Uuid::new_v4().to_string(),
            document_id: document.id.clone(),
            filename: document.filename.clone(),
            content: content.trim().to_string(),
            start_position: start,
            end_position: start + content.chars().count(),
            embedding: None,
        };

        let mut chunks = Vec::new();
        let cleaned_content = self.clean_text(&document.content);
        let sentences = self.split_into_sentences(&cleaned_content);

        let mut current_chunk = String::new();
        let mut start_pos = 0;

        for sentence in sentences {
            let current_len = current_chunk.chars().count();
            if current_len + sentence.chars().count() > self.chunk_size && !current_chunk.is_empty() {
                chunks.push(chunk(&current_chunk, start_pos));

                let overlap_text = if current_len > self.overlap {
                    current_chunk.chars().skip(current_len - self.overlap).collect::<String>()
                } else {
                    current_chunk.clone()
                };

                start_pos = start_pos + current_len - overlap_text.chars().count();
                current_chunk = overlap_text + " " + &sentence;
            } else {
                if !current_chunk.is_empty() {
                    current_chunk.push(' ');
                }
                current_chunk.push_str(&sentence);
            }
        }

        if !current_chunk.trim().is_empty() {
            chunks.push(chunk(&current_chunk, start_pos));
        }

        log::debug!("Created {} chunks for {}", chunks.len(), document.filename);
        chunks
    }

    fn clean_text(&self, text: &str) -> String {
        let cleaned = self.re_special.replace_all(text, " ");
        let cleaned = self.re_whitespace.replace_all(&cleaned, " ");

        cleaned.trim().to_string()
    }

    fn split_into_sentences(&self, text: &str) -> Vec<String> {
        text.unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .flat_map(|s| self.split_long_sentence(s))
            .collect()
    }

    /// Breaks a sentence longer than `chunk_size` on word boundaries. Words
    /// that are longer on their own are cut by characters.
    fn split_long_sentence(&self, sentence: &str) -> Vec<String> {
        if sentence.chars().count() <= self.chunk_size {
            return vec![sentence.to_string()];
        }

        let mut pieces = Vec::new();
        let mut piece = String::new();
        let mut piece_len = 0;

        for word in sentence.split_whitespace() {
            let word_len = word.chars().count();

            if word_len > self.chunk_size {
                if !piece.is_empty() {
                    pieces.push(std::mem::take(&mut piece));
                    piece_len = 0;
                }
                let chars: Vec<char> = word.chars().collect();
                pieces.extend(chars.chunks(self.chunk_size).map(|part| part.iter().collect::<String>()));
                continue;
            }

            if !piece.is_empty() && piece_len + 1 + word_len > self.chunk_size {
                pieces.push(std::mem::take(&mut piece));
                piece_len = 0;
            }
            if !piece.is_empty() {
                piece.push(' ');
                piece_len += 1;
            }
            piece.push_str(word);
            piece_len += word_len;
        }

        if !piece.is_empty() {
            pieces.push(piece);
        }
        pieces
    }
}
