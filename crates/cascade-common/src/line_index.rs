//! Line/column lookup for byte offsets.
//! 字节偏移到行列号的映射。

use std::fmt;

use crate::BytePos;

/// A 1-based line and column pair.
/// 从 1 开始计数的行列号。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Precomputed line starts for a source text.
/// 预先计算的源文本行起始位置。
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self { line_starts }
    }

    /// Look up the line and column of a byte position.
    /// 查找字节位置所在的行和列。
    pub fn line_col(&self, pos: BytePos) -> LineCol {
        let line = match self.line_starts.binary_search(&pos.0) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        LineCol {
            line: line as u32 + 1,
            column: pos.0 - self.line_starts[line] + 1,
        }
    }

    /// The text of the line containing `pos`, without its newline.
    pub fn line_text<'a>(&self, source: &'a str, pos: BytePos) -> &'a str {
        let LineCol { line, .. } = self.line_col(pos);
        let start = self.line_starts[line as usize - 1] as usize;
        let end = self
            .line_starts
            .get(line as usize)
            .map(|&s| s as usize - 1)
            .unwrap_or(source.len());
        source.get(start..end).unwrap_or("").trim_end_matches('\r')
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let index = LineIndex::new("a\nbc\n\ndef");
        assert_eq!(index.line_col(BytePos(0)), LineCol { line: 1, column: 1 });
        assert_eq!(index.line_col(BytePos(3)), LineCol { line: 2, column: 2 });
        assert_eq!(index.line_col(BytePos(5)), LineCol { line: 3, column: 1 });
        assert_eq!(index.line_col(BytePos(8)), LineCol { line: 4, column: 3 });
    }

    #[test]
    fn test_line_text() {
        let source = "first\r\nsecond\nthird";
        let index = LineIndex::new(source);
        assert_eq!(index.line_text(source, BytePos(2)), "first");
        assert_eq!(index.line_text(source, BytePos(9)), "second");
        assert_eq!(index.line_text(source, BytePos(16)), "third");
        assert_eq!(index.line_count(), 3);
    }
}
