//! Overlapping text splitter
//!
//! Text is measured in `char`s. Each chunk ends at the best boundary found
//! past the overlap region: a paragraph break, then a sentence end, then any
//! whitespace, and as a last resort a hard cut at the size limit.

use docrag_core::{Chunk, ChunkingError};

use crate::config::ChunkingConfig;

/// Splits documents into overlapping chunks of bounded length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    /// Create a chunker, rejecting sizes that could never make progress
    pub fn new(max_chars: usize, overlap_chars: usize) -> Result<Self, ChunkingError> {
        Self::from_config(ChunkingConfig {
            max_chars,
            overlap_chars,
        })
    }

    pub fn from_config(config: ChunkingConfig) -> Result<Self, ChunkingError> {
        if config.max_chars == 0 {
            return Err(ChunkingError::ZeroChunkSize);
        }
        if config.overlap_chars >= config.max_chars {
            return Err(ChunkingError::OverlapTooLarge {
                max_chars: config.max_chars,
                overlap_chars: config.overlap_chars,
            });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> ChunkingConfig {
        self.config
    }

    /// Split `text` into chunks in document order
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let max = self.config.max_chars;
        let overlap = self.config.overlap_chars;

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            if chars.len() - start <= max {
                chunks.push(make_chunk(&chars[start..], chunks.len()));
                break;
            }

            let cut = find_cut(&chars, start, max, overlap);
            chunks.push(make_chunk(&chars[start..cut], chunks.len()));

            // cut > start + overlap, so this always moves forward
            start = cut - overlap.min(cut - start);
        }

        chunks
    }
}

/// Split `text` with the given sizes
pub fn split(text: &str, max_chars: usize, overlap_chars: usize) -> Result<Vec<Chunk>, ChunkingError> {
    Ok(Chunker::new(max_chars, overlap_chars)?.split(text))
}

fn make_chunk(chars: &[char], index: usize) -> Chunk {
    Chunk {
        text: chars.iter().collect(),
        index,
    }
}

/// Exclusive end of the chunk starting at `start`.
///
/// Candidates are `(start + overlap, start + max]`, searched from the right
/// so the chunk is as long as the boundary kind allows.
fn find_cut(chars: &[char], start: usize, max: usize, overlap: usize) -> usize {
    let hi = start + max;
    let lo = start + overlap + 1;
    let candidates = || (lo..=hi).rev();

    candidates()
        .find(|&cut| is_paragraph_end(chars, start, cut))
        .or_else(|| candidates().find(|&cut| is_sentence_end(chars, start, cut)))
        .or_else(|| candidates().find(|&cut| chars[cut - 1].is_whitespace()))
        .unwrap_or(hi)
}

/// True when the chunk `[start, cut)` ends with a blank line
fn is_paragraph_end(chars: &[char], start: usize, cut: usize) -> bool {
    if cut < start + 2 || chars[cut - 1] != '\n' {
        return false;
    }
    match chars[cut - 2] {
        '\n' => true,
        '\r' => cut >= start + 3 && chars[cut - 3] == '\n',
        _ => false,
    }
}

fn is_sentence_end(chars: &[char], start: usize, cut: usize) -> bool {
    let last = chars[cut - 1];
    if last == '\n' {
        return true;
    }
    last.is_whitespace() && cut >= start + 2 && matches!(chars[cut - 2], '.' | '!' | '?')
}
