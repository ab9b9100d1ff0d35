//! Fixed-width text layout for narrow paper

use tracing::debug;

/// Default paper width in characters (58mm receipt roll)
pub const DEFAULT_PAPER_WIDTH: usize = 32;

/// Greedy word-wrap to `width` columns
///
/// A word joins the current line while the joined length stays below
/// `width`. Words are never split, so a single word wider than `width`
/// occupies a line of its own. Lengths are counted in chars.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    debug!(text_len = text.len(), width, "wrap: called");
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let joined_len = if line.is_empty() { word_len } else { line_len + 1 + word_len };

        if joined_len < width {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
            line_len = joined_len;
        } else {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            line.push_str(word);
            line_len = word_len;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines
}

/// Pad `text` on both sides to center it within `width` columns
///
/// Extra padding goes to the right, text wider than `width` is returned as is.
pub fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

/// A horizontal rule of `width` characters
pub fn rule(ch: char, width: usize) -> String {
    std::iter::repeat_n(ch, width).collect()
}
