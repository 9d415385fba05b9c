//! Locating expression blocks inside text
//!
//! Two delimiters mark a block: `{{ ... }}` and `exp( ... )`. Blocks nest,
//! and evaluation always starts from the innermost one. Quotes inside a
//! block are honoured, so `{{ "}}" }}` is a single block.

/// Which delimiter introduced a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Braces,
    Exp,
}

/// A complete expression block found in a piece of text.
///
/// `start..end` spans the delimiters; `inner_start..inner_end` spans the
/// expression text between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub start: usize,
    pub end: usize,
    pub inner_start: usize,
    pub inner_end: usize,
}

impl Block {
    pub fn inner<'a>(&self, text: &'a str) -> &'a str {
        &text[self.inner_start..self.inner_end]
    }

    /// Whether the block covers all of `text`.
    pub fn spans(&self, text: &str) -> bool {
        self.start == 0 && self.end == text.len()
    }
}

enum Frame {
    Braces { start: usize, depth: usize },
    Exp { start: usize, depth: usize },
}

/// Find the first block that closes, which is always an innermost one.
///
/// Returns `None` when the text holds no complete block. An opening
/// delimiter that is never closed leaves the text literal.
pub fn find_innermost(text: &str) -> Option<Block> {
    let bytes = text.as_bytes();
    let mut stack: Vec<Frame> = Vec::new();
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        if bytes[i..].starts_with(b"{{") {
            stack.push(Frame::Braces { start: i, depth: 0 });
            i += 2;
            continue;
        }
        if bytes[i..].starts_with(b"exp(") && starts_identifier(bytes, i) {
            stack.push(Frame::Exp { start: i, depth: 0 });
            i += 4;
            continue;
        }

        match stack.last_mut() {
            None => {}
            Some(Frame::Braces { start, depth }) => match b {
                b'"' | b'\'' => quote = Some(b),
                b'{' => *depth += 1,
                b'}' if *depth > 0 => *depth -= 1,
                b'}' if bytes.get(i + 1) == Some(&b'}') => {
                    return Some(Block {
                        kind: BlockKind::Braces,
                        start: *start,
                        end: i + 2,
                        inner_start: *start + 2,
                        inner_end: i,
                    });
                }
                _ => {}
            },
            Some(Frame::Exp { start, depth }) => match b {
                b'"' | b'\'' => quote = Some(b),
                b'(' => *depth += 1,
                b')' if *depth > 0 => *depth -= 1,
                b')' => {
                    return Some(Block {
                        kind: BlockKind::Exp,
                        start: *start,
                        end: i + 1,
                        inner_start: *start + 4,
                        inner_end: i,
                    });
                }
                _ => {}
            },
        }
        i += 1;
    }

    None
}

fn starts_identifier(bytes: &[u8], at: usize) -> bool {
    at == 0 || {
        let prev = bytes[at - 1];
        !(prev.is_ascii_alphanumeric() || prev == b'_')
    }
}

/// Whether `text` contains at least one complete block.
pub fn contains_block(text: &str) -> bool {
    find_innermost(text).is_some()
}

/// Text that begins or ends with a space is kept verbatim, blocks and all.
pub fn is_literal_escape(text: &str) -> bool {
    text.starts_with(' ') || text.ends_with(' ')
}
