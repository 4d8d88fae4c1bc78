/// Sentence marker of a parser output block.
const SENTENCE_MARKER: &str = "# ::snt ";

/// One AMR block of a multi-sentence dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Text of the preceding `# ::snt` line, empty when there was none.
    pub sentence: String,
    /// Notation lines joined with single spaces.
    pub text: String,
    /// 1-based line where the notation starts.
    pub line: usize,
}

/// Splits a parser dump into blocks.
///
/// A block is a run of non-blank lines. `# ::snt` sets the sentence of the
/// block it precedes; other `#` lines are metadata and skipped. The last
/// block does not need a trailing blank line.
pub fn split_blocks(content: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut sentence = String::new();
    let mut lines: Vec<&str> = Vec::new();
    let mut start = 0;

    for (i, line) in content.lines().enumerate() {
        if let Some(snt) = line.strip_prefix(SENTENCE_MARKER) {
            sentence = snt.trim().to_string();
        } else if line.starts_with('#') {
            continue;
        } else if line.trim().is_empty() {
            if !lines.is_empty() {
                blocks.push(Block {
                    sentence: std::mem::take(&mut sentence),
                    text: lines.join(" "),
                    line: start,
                });
                lines.clear();
            }
        } else {
            if lines.is_empty() {
                start = i + 1;
            }
            lines.push(line);
        }
    }
    if !lines.is_empty() {
        blocks.push(Block {
            sentence,
            text: lines.join(" "),
            line: start,
        });
    }
    blocks
}
