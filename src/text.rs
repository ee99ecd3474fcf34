//! Text wrapping with fixed average character widths

use crate::config::LayoutConfig;
use tracing::trace;

/// Fixed-ratio text metrics: every character is assumed to be
/// `font_size * char_width_ratio` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub char_width_ratio: f32,
    pub line_height: f32,
}

impl TextMetrics {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            char_width_ratio: config.char_width_ratio,
            line_height: config.line_height,
        }
    }

    /// Estimated width of a single line of text
    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * self.char_width_ratio
    }

    pub fn line_height(&self, font_size: f32) -> f32 {
        font_size * self.line_height
    }

    /// Break text into lines that fit within the specified width
    pub fn wrap(&self, text: &str, max_width: f32, font_size: f32) -> Vec<String> {
        if text.is_empty() {
            return vec![String::new()];
        }

        let char_width = font_size * self.char_width_ratio;
        let max_chars = if char_width > 0.0 {
            (max_width / char_width) as usize
        } else {
            0
        };

        if max_chars == 0 {
            return text.split('\n').map(str::to_string).collect();
        }

        let mut lines = Vec::new();

        // Explicit newlines always start a new line
        for segment in text.split('\n') {
            let mut current = String::new();
            let mut current_len = 0;

            for word in segment.split_whitespace() {
                let word_len = word.chars().count();

                if word_len > max_chars {
                    if current_len > 0 {
                        lines.push(std::mem::take(&mut current));
                    }
                    let (chunks, rest) = split_long_word(word, max_chars);
                    lines.extend(chunks);
                    current_len = rest.chars().count();
                    current = rest;
                } else if current_len > 0 && current_len + 1 + word_len > max_chars {
                    lines.push(std::mem::replace(&mut current, word.to_string()));
                    current_len = word_len;
                } else {
                    if current_len > 0 {
                        current.push(' ');
                        current_len += 1;
                    }
                    current.push_str(word);
                    current_len += word_len;
                }
            }

            // Whitespace-only segments still occupy a line
            lines.push(current);
        }

        trace!("Wrapped text into {} lines", lines.len());
        lines
    }

    pub fn line_count(&self, text: &str, max_width: f32, font_size: f32) -> usize {
        self.wrap(text, max_width, font_size).len()
    }

    /// Height needed for the wrapped text
    pub fn wrapped_height(&self, text: &str, max_width: f32, font_size: f32) -> f32 {
        self.line_count(text, max_width, font_size) as f32 * self.line_height(font_size)
    }
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

/// Split a word into full-width chunks on char boundaries; returns the
/// full chunks and the trailing remainder.
fn split_long_word(word: &str, max_chars: usize) -> (Vec<String>, String) {
    let mut chunks = Vec::new();
    let mut remaining = word;
    while remaining.chars().count() > max_chars {
        let split_byte = remaining
            .char_indices()
            .nth(max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(remaining.len());
        let (chunk, rest) = remaining.split_at(split_byte);
        chunks.push(chunk.to_string());
        remaining = rest;
    }
    (chunks, remaining.to_string())
}
