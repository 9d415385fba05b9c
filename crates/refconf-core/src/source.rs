//! Document text handling
//!
//! Configuration text is JSON with comments. `/* ... */` blocks (which may
//! span lines) and `// ...` line comments are removed before decoding.
//! Comment markers inside string literals are left alone, so values such as
//! `"http://example.com"` survive.

use serde_json::Value;

use crate::error::Result;

/// Remove comments that lie outside string literals.
///
/// Line comments keep their terminating newline so that line numbers in
/// decode errors still match the source. An unterminated block comment
/// runs to the end of the text.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                    }
                    if previous == '*' && skipped == '/' {
                        break;
                    }
                    previous = skipped;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Strip comments and decode the remaining JSON.
///
/// # Errors
///
/// Returns [`Error::Decode`](crate::Error::Decode) carrying the decoder's
/// own error unchanged.
pub fn decode(source: &str) -> Result<Value> {
    let stripped = strip_comments(source);
    Ok(serde_json::from_str(&stripped)?)
}
