use crate::application::ports::{TextSplitter, TextSplitterError};
use crate::domain::Chunk;

/// Splits text into windows of at most `chunk_size` chars that overlap by
/// `chunk_overlap` chars. A window is pulled back to the last paragraph break,
/// line break or space in its second half so words are not cut in two.
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

const SEPARATORS: [char; 2] = ['\n', ' '];

impl RecursiveCharacterSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    fn step(&self, window: usize) -> usize {
        if window > self.chunk_overlap {
            window - self.chunk_overlap
        } else {
            window
        }
    }

    fn window_end(&self, chars: &[char], start: usize) -> usize {
        let hard_end = (start + self.chunk_size).min(chars.len());
        if hard_end == chars.len() {
            return hard_end;
        }

        let floor = start + self.chunk_size / 2;
        for separator in SEPARATORS {
            if let Some(pos) = (floor..hard_end).rev().find(|&i| chars[i] == separator) {
                return pos + 1;
            }
        }
        hard_end
    }
}

impl TextSplitter for RecursiveCharacterSplitter {
    fn split(&self, text: &str) -> Result<Vec<Chunk>, TextSplitterError> {
        if self.chunk_size == 0 {
            return Err(TextSplitterError::InvalidConfiguration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        let chars: Vec<char> = text.chars().collect();
        let mut chunks = Vec::new();
        let mut offset = 0;

        while offset < chars.len() {
            let end = self.window_end(&chars, offset);
            let chunk_text: String = chars[offset..end].iter().collect();

            if !chunk_text.trim().is_empty() {
                chunks.push(Chunk::new(chunks.len(), chunk_text, offset));
            }

            if end == chars.len() {
                break;
            }
            offset += self.step(end - offset);
        }

        Ok(chunks)
    }
}
