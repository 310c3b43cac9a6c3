//! Wrapping measured in terminal cells, so wide (CJK) glyphs take two.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Break `line` into rows of at most `width` cells, splitting between any
/// two chars. Always returns at least one row.
pub fn hard_wrap(line: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![line.to_string()];
    }

    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_width = 0;
    for c in line.chars() {
        let char_width = c.width().unwrap_or(0);
        if row_width + char_width > width && !row.is_empty() {
            rows.push(std::mem::take(&mut row));
            row_width = 0;
        }
        row.push(c);
        row_width += char_width;
    }
    rows.push(row);
    rows
}

/// Visual rows of multi-line text when every line is hard-wrapped
pub fn visual_rows(text: &str, width: usize) -> Vec<String> {
    text.split('\n').flat_map(|line| hard_wrap(line, width)).collect()
}

/// Word-wrap to `width` cells, keeping explicit line breaks. Words wider
/// than a whole row are hard-split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current_line = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.width();

            if word_width > width {
                if current_width > 0 {
                    lines.push(std::mem::take(&mut current_line));
                }
                let mut pieces = hard_wrap(word, width);
                current_line = pieces.pop().unwrap_or_default();
                current_width = current_line.width();
                lines.extend(pieces);
                continue;
            }

            if current_width > 0 && current_width + 1 + word_width > width {
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
            }
            if current_width > 0 {
                current_line.push(' ');
                current_width += 1;
            }
            current_line.push_str(word);
            current_width += word_width;
        }

        lines.push(current_line);
    }

    lines
}
