//! Word wrapping by terminal display width.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Wrap `text` into lines no wider than `width` columns.
///
/// Breaks at spaces where possible and inside words only when a single word
/// is wider than the line. Hard newlines are kept. Always returns at least
/// one line, so an empty text still occupies a row.
///
/// ```
/// # use tokflow::view::wrap::wrap_lines;
/// assert_eq!(wrap_lines("hello world", 5), vec!["hello", "world"]);
/// assert_eq!(wrap_lines("", 10), vec![""]);
/// ```
pub fn wrap_lines(text: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    let mut lines = Vec::new();

    for hard_line in text.split('\n') {
        let hard_line = hard_line.strip_suffix('\r').unwrap_or(hard_line);
        let mut line = String::new();
        let mut line_width = 0;

        for word in hard_line.split_inclusive(' ') {
            let word_width = word.width();
            if line_width + word_width <= width {
                line.push_str(word);
                line_width += word_width;
                continue;
            }

            // Trailing space may hang past the edge
            let bare = word.trim_end_matches(' ');
            let bare_width = bare.width();
            if line_width + bare_width <= width {
                line.push_str(bare);
                line_width = width;
                continue;
            }

            if !line.is_empty() {
                lines.push(finish(&mut line));
                line_width = 0;
            }

            if word_width <= width {
                line.push_str(word);
                line_width = word_width;
                continue;
            }

            for grapheme in bare.graphemes(true) {
                let grapheme_width = grapheme.width();
                if line_width + grapheme_width > width && !line.is_empty() {
                    lines.push(finish(&mut line));
                    line_width = 0;
                }
                line.push_str(grapheme);
                line_width += grapheme_width;
            }
            if bare.len() < word.len() && line_width < width {
                line.push(' ');
                line_width += 1;
            }
        }

        lines.push(finish(&mut line));
    }

    lines
}

fn finish(line: &mut String) -> String {
    let done = line.trim_end_matches(' ').to_string();
    line.clear();
    done
}
