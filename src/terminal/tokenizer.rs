//! Command line tokenizing
//!
//! Lines are split shell-style so quoted text stays a single token with its
//! whitespace intact. A `$` inside a quoted span is escaped before splitting
//! and unescaped afterward, so it always survives as a literal character.
//! There are no comments: a word starting with `#` is an ordinary token.

use crate::core::error::{Result, TerminalError};

/// Character reserved for substitution by shell-style tokenizers
const SUBSTITUTION_CHAR: char = '$';
const ESCAPED_SUBSTITUTION: &str = "\\$";

/// Starts a comment for shell-style tokenizers when it opens a word
const COMMENT_CHAR: char = '#';

/// Split a raw command line into tokens
///
/// An empty (or all-whitespace) line yields no tokens; callers treat that as
/// "no command provided", which is not the same as an unknown command.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let processed = escape_for_split(line.trim());

    let tokens = shlex::split(&processed).ok_or_else(|| {
        TerminalError::Parse("unbalanced quotes or trailing escape in command line".into())
    })?;

    Ok(tokens
        .into_iter()
        .map(|t| t.replace(ESCAPED_SUBSTITUTION, "$"))
        .collect())
}

/// Escape the substitution character inside every quoted span, and a `#`
/// that opens an unquoted word
///
/// A span runs from a quote to the next occurrence of the same quote. A quote
/// with no partner is copied through untouched and left for the splitter to
/// reject.
fn escape_for_split(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' || c == '\'' {
            if let Some(offset) = chars[i + 1..].iter().position(|&ch| ch == c) {
                let close = i + 1 + offset;
                out.push(c);
                for &inner in &chars[i + 1..close] {
                    if inner == SUBSTITUTION_CHAR {
                        out.push_str(ESCAPED_SUBSTITUTION);
                    } else {
                        out.push(inner);
                    }
                }
                out.push(c);
                i = close + 1;
                continue;
            }
        }
        if c == COMMENT_CHAR && (i == 0 || chars[i - 1].is_whitespace()) {
            out.push('\\');
        }
        out.push(c);
        i += 1;
    }

    out
}
