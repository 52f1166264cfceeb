//! Source spans, labels and offset-to-line/column mapping.

use std::path::PathBuf;

/// A contiguous byte range in a named source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub file: PathBuf,
    /// The starting byte offset (inclusive).
    pub start: usize,
    /// The ending byte offset (exclusive).
    pub end: usize,
}

impl SourceSpan {
    pub fn new(file: impl Into<PathBuf>, start: usize, end: usize) -> Self {
        Self {
            file: file.into(),
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// A span annotated with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub span: SourceSpan,
    pub message: String,
}

impl Label {
    pub fn new(span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// A 1-based line and column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

impl LineColumn {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Precomputed line starts for one source text.
///
/// Columns count characters, not bytes, so a multi-byte character before the
/// error site still advances the column by one.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: source.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Maps a byte offset to its line and column. Offsets past the end clamp
    /// to the end of the source.
    pub fn line_col(&self, source: &str, offset: usize) -> LineColumn {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = source
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - line_start);
        LineColumn::new(line + 1, column + 1)
    }

    /// The text of a 1-based line without its trailing newline.
    pub fn line_text<'a>(&self, source: &'a str, line: usize) -> Option<&'a str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        source
            .get(start..end)
            .map(|text| text.strip_suffix('\r').unwrap_or(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_col_first_line() {
        let src = "const x = 1;";
        let index = LineIndex::new(src);
        assert_eq!(index.line_col(src, 0), LineColumn::new(1, 1));
        assert_eq!(index.line_col(src, 6), LineColumn::new(1, 7));
    }

    #[test]
    fn test_line_col_after_newlines() {
        let src = "const a = 1;\nconst b = 2;\n\nconst c = a;";
        let index = LineIndex::new(src);
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_col(src, 13), LineColumn::new(2, 1));
        assert_eq!(index.line_col(src, 19), LineColumn::new(2, 7));
        assert_eq!(index.line_col(src, 27), LineColumn::new(4, 1));
    }

    #[test]
    fn test_line_col_clamps_past_end() {
        let src = "a\nbc";
        let index = LineIndex::new(src);
        assert_eq!(index.line_col(src, 100), LineColumn::new(2, 3));
    }

    #[test]
    fn test_line_col_counts_characters() {
        let src = "const s = \"é\" + 1;";
        let index = LineIndex::new(src);
        // 'é' is two bytes; the '+' sits at byte 15 but column 15
        assert_eq!(index.line_col(src, 15), LineColumn::new(1, 15));
    }

    #[test]
    fn test_line_text() {
        let src = "first\r\nsecond\nthird";
        let index = LineIndex::new(src);
        assert_eq!(index.line_text(src, 1), Some("first"));
        assert_eq!(index.line_text(src, 2), Some("second"));
        assert_eq!(index.line_text(src, 3), Some("third"));
        assert_eq!(index.line_text(src, 0), None);
        assert_eq!(index.line_text(src, 4), None);
    }

    #[test]
    fn test_span_queries() {
        let span = SourceSpan::new("a.js", 4, 9);
        assert_eq!(span.len(), 5);
        assert!(span.contains(4));
        assert!(!span.contains(9));
        assert!(SourceSpan::new("a.js", 3, 3).is_empty());
    }
}
