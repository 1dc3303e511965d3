//! Endpoint path syntax.
//!
//! # Rules
//! - Non-empty
//! - Starts with `/`
//! - No whitespace or control characters
//! - No `?` or `#` (query and fragment are not part of a route)
//! - No `{`, `}` or `*` (routes are exact paths, not patterns)
//! - Otherwise only RFC 3986 path characters: unreserved, sub-delims, `:`,
//!   `@`, `/` and `%`
//!
//! Matching is exact and case-sensitive against the raw request path. No
//! normalization or percent-decoding is applied, so `/echo` and `/echo/` are
//! different endpoints, and a route containing `é` is registered as
//! `/caf%C3%A9`.

use std::fmt;

/// Why a path is not a well-formed endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathDefect {
    Empty,
    MissingLeadingSlash,
    IllegalChar(char),
}

impl fmt::Display for PathDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathDefect::Empty => write!(f, "is empty"),
            PathDefect::MissingLeadingSlash => write!(f, "must start with a forward-slash"),
            PathDefect::IllegalChar(c) if c.is_whitespace() || c.is_control() => {
                write!(f, "contains whitespace or a control character ({:?})", c)
            }
            PathDefect::IllegalChar(c) if RESERVED_CHARS.contains(c) => {
                write!(f, "contains the reserved character '{}'", c)
            }
            PathDefect::IllegalChar(c) => {
                write!(f, "contains '{}', which is not allowed in a URI path", c)
            }
        }
    }
}

/// Characters that turn a path into something other than an exact route.
const RESERVED_CHARS: [char; 5] = ['?', '#', '{', '}', '*'];

/// Punctuation a raw request path can carry besides ASCII letters and digits.
const PATH_PUNCTUATION: &str = "-._~!$&'()+,;=:@/%";

fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || PATH_PUNCTUATION.contains(c)
}

/// Check that `path` is only non-empty.
pub fn check_non_empty(path: &str) -> Result<(), PathDefect> {
    if path.is_empty() {
        Err(PathDefect::Empty)
    } else {
        Ok(())
    }
}

/// Check that `path` starts with `/` and contains no illegal characters.
///
/// Assumes `check_non_empty` has already passed; an empty path still reports
/// `Empty` for callers that only run this check.
pub fn check_syntax(path: &str) -> Result<(), PathDefect> {
    check_non_empty(path)?;
    if !path.starts_with('/') {
        return Err(PathDefect::MissingLeadingSlash);
    }
    if let Some(c) = path
        .chars()
        .find(|c| RESERVED_CHARS.contains(c) || !is_path_char(*c))
    {
        return Err(PathDefect::IllegalChar(c));
    }
    Ok(())
}
