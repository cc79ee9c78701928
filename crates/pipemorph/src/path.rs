//! Path expressions over JSON elements.
//!
//! Two dialects coexist and are deliberately kept distinct:
//!
//! - A JSONPath subset (`$.field.sub[0]`, leading `$.` optional, quoted keys
//!   via `['key']`), compiled by [`parse_path`] and evaluated by
//!   [`get_path`]. Used by every operation except `template`.
//! - A restricted dot-path (`field.sub`) evaluated by [`get_dot_path`],
//!   used only by `template` placeholders. Object-member traversal only, no
//!   indexing, no `$` root.
//!
//! Unifying the dialects would silently change the template operation's
//! historical semantics, so both are preserved as-is.

use serde_json::Value as JsonValue;

/// One compiled step of a JSONPath expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathToken {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    pub path: String,
    pub message: String,
}

impl PathError {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid path {:?}: {}", self.path, self.message)
    }
}

impl std::error::Error for PathError {}

/// Compile a JSONPath-subset expression into a token list.
///
/// `$` alone selects the element itself (empty token list).
pub fn parse_path(path: &str) -> Result<Vec<PathToken>, PathError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(PathError::new(path, "path is empty"));
    }

    let mut rest = trimmed;
    if let Some(stripped) = rest.strip_prefix('$') {
        rest = stripped;
        if rest.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(after_dot) = rest.strip_prefix('.') {
            rest = after_dot;
        } else if !rest.starts_with('[') {
            return Err(PathError::new(path, "expected '.' or '[' after '$'"));
        }
    }

    let mut tokens = Vec::new();
    let mut buf = String::new();
    let mut after_bracket = false;
    let mut chars = rest.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if buf.is_empty() && !after_bracket {
                    return Err(PathError::new(path, "empty key segment"));
                }
                if !buf.is_empty() {
                    tokens.push(PathToken::Key(std::mem::take(&mut buf)));
                }
                after_bracket = false;
            }
            '[' => {
                if !buf.is_empty() {
                    tokens.push(PathToken::Key(std::mem::take(&mut buf)));
                }
                tokens.push(parse_bracket(path, &mut chars)?);
                after_bracket = true;
            }
            ']' => {
                return Err(PathError::new(path, "unexpected ']'"));
            }
            _ => {
                if after_bracket {
                    return Err(PathError::new(path, "expected '.' or '[' after ']'"));
                }
                buf.push(c);
            }
        }
    }

    if !buf.is_empty() {
        tokens.push(PathToken::Key(buf));
    } else if !after_bracket {
        return Err(PathError::new(path, "path ends with '.'"));
    }

    Ok(tokens)
}

fn parse_bracket(
    path: &str,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<PathToken, PathError> {
    let quote = match chars.peek() {
        Some(&q @ ('\'' | '"')) => {
            chars.next();
            Some(q)
        }
        _ => None,
    };

    let mut content = String::new();
    if let Some(quote) = quote {
        let mut closed = false;
        for c in chars.by_ref() {
            if c == quote {
                closed = true;
                break;
            }
            content.push(c);
        }
        if !closed {
            return Err(PathError::new(path, "unterminated quoted key"));
        }
        match chars.next() {
            Some(']') => Ok(PathToken::Key(content)),
            _ => Err(PathError::new(path, "expected ']' after quoted key")),
        }
    } else {
        let mut closed = false;
        for c in chars.by_ref() {
            if c == ']' {
                closed = true;
                break;
            }
            content.push(c);
        }
        if !closed {
            return Err(PathError::new(path, "unterminated index"));
        }
        content
            .trim()
            .parse::<usize>()
            .map(PathToken::Index)
            .map_err(|_| PathError::new(path, "index must be a non-negative integer"))
    }
}

/// Evaluate compiled path tokens against one element.
///
/// Returns zero or one value; a key or index that does not resolve yields
/// `None`, as does traversing into a non-container.
pub fn get_path<'a>(value: &'a JsonValue, tokens: &[PathToken]) -> Option<&'a JsonValue> {
    let mut current = value;
    for token in tokens {
        current = match token {
            PathToken::Key(key) => current.as_object()?.get(key)?,
            PathToken::Index(index) => current.as_array()?.get(*index)?,
        };
    }
    Some(current)
}

/// Evaluate a dot-path (`a.b.c`) against one element.
///
/// The template-only dialect: segments are object keys, nothing else.
pub fn get_dot_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let mut current = value;
    for segment in path.split('.') {
        if segment.is_empty() {
            return None;
        }
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
