// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Named-parameter binding for positional-parameter SQL.
//!
//! Templates are written with `:name` markers and rewritten to `$1`, `$2`, ...
//! with one bound value per marker occurrence, in left-to-right order. Values
//! never enter the query text.
//!
//! # Marker grammar
//!
//! - `:` followed by `[A-Za-z_]` and then any `[A-Za-z0-9_]`, matched greedily
//! - `::` (PostgreSQL cast) is never a marker, and neither is `:2` in `arr[1:2]`
//! - markers are left verbatim inside `'string literals'`, `E'escape strings'`
//!   (backslash escapes honoured), `"quoted identifiers"`, `$$dollar$$` or
//!   `$tag$...$tag$` bodies, `-- line comments` and nested `/* block comments */`
//!
//! # Examples
//!
//! ```rust
//! use nearscan::{Params, QueryTemplate};
//!
//! let template = QueryTemplate::parse(
//!     "SELECT * FROM receipts WHERE receiver = :account OR predecessor = :account",
//! )?;
//! let bound = template.bind(&Params::new().with("account", "alice.near"))?;
//!
//! assert_eq!(
//!     bound.text(),
//!     "SELECT * FROM receipts WHERE receiver = $1 OR predecessor = $2"
//! );
//! assert_eq!(bound.len(), 2);
//! # Ok::<(), nearscan::QueryError>(())
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;

use tokio_postgres::types::ToSql;

use crate::errors::QueryError;

/// A value that can be bound to a positional query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    /// `TEXT` / `VARCHAR`
    Text(String),
    /// `INT4`
    Int(i32),
    /// `INT8`
    BigInt(i64),
    /// `BOOL`
    Bool(bool),
}

impl SqlValue {
    /// Borrows the inner value as a driver parameter.
    pub fn as_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            SqlValue::Text(v) => v,
            SqlValue::Int(v) => v,
            SqlValue::BigInt(v) => v,
            SqlValue::Bool(v) => v,
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::BigInt(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

/// Source of values for named markers.
///
/// Implemented by the [`Params`] map and by typed parameter records, so a query
/// call site states its parameters as a struct instead of assembling a map.
pub trait NamedParams {
    /// Returns the value bound to `name`, or `None` if the name is unbound.
    fn lookup(&self, name: &str) -> Option<SqlValue>;
}

/// Ad-hoc named parameter map.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: HashMap<String, SqlValue>,
}

impl Params {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, replacing any previous binding.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Binds `name` to `value` in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) {
        self.values.insert(name.into(), value.into());
    }
}

impl NamedParams for Params {
    fn lookup(&self, name: &str) -> Option<SqlValue> {
        self.values.get(name).cloned()
    }
}

impl<T: NamedParams + ?Sized> NamedParams for &T {
    fn lookup(&self, name: &str) -> Option<SqlValue> {
        (**self).lookup(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Marker(String),
}

/// A query template scanned once for `:name` markers.
///
/// Parse templates at startup (or lazily into a static) and bind per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    pieces: Vec<Piece>,
}

impl QueryTemplate {
    /// Scans `template` for markers.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Unterminated`] if a quoted literal, quoted
    /// identifier, dollar-quoted body or block comment is never closed.
    pub fn parse(template: &str) -> Result<Self, QueryError> {
        let bytes = template.as_bytes();
        let mut pieces = Vec::new();
        let mut literal_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'\'' => i = skip_quoted(bytes, i, "string literal")?,
                b'"' => i = skip_quoted(bytes, i, "quoted identifier")?,
                b'E' | b'e'
                    if bytes.get(i + 1) == Some(&b'\'') && !follows_identifier(bytes, i) =>
                {
                    i = skip_escape_string(bytes, i + 1)?;
                }
                b'$' if !follows_identifier(bytes, i) => i = skip_dollar_quoted(bytes, i)?,
                b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_line_comment(bytes, i),
                b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i)?,
                b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
                b':' => {
                    let start = i + 1;
                    if !bytes.get(start).is_some_and(|b| is_marker_start(*b)) {
                        // `arr[1:2]` and `: ` stay text
                        i += 1;
                        continue;
                    }
                    let len = bytes[start..]
                        .iter()
                        .take_while(|b| is_marker_char(**b))
                        .count();
                    let end = start + len;
                    if literal_start < i {
                        pieces.push(Piece::Literal(template[literal_start..i].to_string()));
                    }
                    pieces.push(Piece::Marker(template[start..end].to_string()));
                    literal_start = end;
                    i = end;
                }
                _ => i += 1,
            }
        }

        if literal_start < bytes.len() {
            pieces.push(Piece::Literal(template[literal_start..].to_string()));
        }

        Ok(Self { pieces })
    }

    /// Marker names in occurrence order, duplicates included.
    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Marker(name) => Some(name.as_str()),
            Piece::Literal(_) => None,
        })
    }

    /// Number of marker occurrences (and therefore of bound values).
    pub fn marker_count(&self) -> usize {
        self.markers().count()
    }

    /// Rewrites markers to positional placeholders and collects their values.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MissingParameter`] for the first marker with no
    /// value in `params`.
    pub fn bind(&self, params: &impl NamedParams) -> Result<BoundQuery, QueryError> {
        let mut text = String::new();
        let mut values = Vec::with_capacity(self.marker_count());

        for piece in &self.pieces {
            match piece {
                Piece::Literal(literal) => text.push_str(literal),
                Piece::Marker(name) => {
                    let position = values.len() + 1;
                    let value = params
                        .lookup(name)
                        .ok_or_else(|| QueryError::missing(name.as_str(), position))?;
                    // Writing to a String cannot fail.
                    let _ = write!(text, "${position}");
                    values.push(value);
                }
            }
        }

        Ok(BoundQuery { text, values })
    }
}

/// Parses and binds `template` in one step.
///
/// Prefer [`QueryTemplate`] for templates executed repeatedly.
pub fn bind(template: &str, params: &impl NamedParams) -> Result<BoundQuery, QueryError> {
    QueryTemplate::parse(template)?.bind(params)
}

/// Executable query text with its positional values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundQuery {
    text: String,
    values: Vec<SqlValue>,
}

impl BoundQuery {
    /// Query text with `$n` placeholders.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Bound values; `values()[j]` belongs to placeholder `$j+1`.
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Number of positional parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the query takes no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values as driver parameters, in placeholder order.
    pub fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values.iter().map(SqlValue::as_sql).collect()
    }
}

fn is_marker_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_marker_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// True when the byte before `at` continues an identifier, as in `name$1` or `typee'`.
fn follows_identifier(bytes: &[u8], at: usize) -> bool {
    at > 0 && (is_marker_char(bytes[at - 1]) || bytes[at - 1] == b'$')
}

/// Returns the index just past the closing quote. A doubled quote is an escape.
fn skip_quoted(bytes: &[u8], open: usize, kind: &'static str) -> Result<usize, QueryError> {
    let quote = bytes[open];
    let mut j = open + 1;
    while j < bytes.len() {
        if bytes[j] == quote {
            if bytes.get(j + 1) == Some(&quote) {
                j += 2;
                continue;
            }
            return Ok(j + 1);
        }
        j += 1;
    }
    Err(QueryError::Unterminated { kind, offset: open })
}

fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| *b == b'\n')
        .map_or(bytes.len(), |offset| start + offset + 1)
}

/// `E'...'` strings: a backslash escapes the next byte, and `''` still works.
fn skip_escape_string(bytes: &[u8], open: usize) -> Result<usize, QueryError> {
    let mut j = open + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\'' if bytes.get(j + 1) == Some(&b'\'') => j += 2,
            b'\'' => return Ok(j + 1),
            _ => j += 1,
        }
    }
    Err(QueryError::Unterminated {
        kind: "string literal",
        offset: open - 1,
    })
}

/// Skips `$$...$$` or `$tag$...$tag$`. A `$` that does not open a valid tag
/// (such as a `$1` placeholder) is plain text.
fn skip_dollar_quoted(bytes: &[u8], open: usize) -> Result<usize, QueryError> {
    let tag_start = open + 1;
    let tag_len = match bytes.get(tag_start) {
        Some(b'$') => 0,
        Some(b) if is_marker_start(*b) => bytes[tag_start..]
            .iter()
            .take_while(|b| is_marker_char(**b))
            .count(),
        _ => return Ok(open + 1),
    };
    let body_start = tag_start + tag_len;
    if bytes.get(body_start) != Some(&b'$') {
        return Ok(open + 1);
    }

    let delimiter = &bytes[open..=body_start];
    bytes[body_start + 1..]
        .windows(delimiter.len())
        .position(|window| window == delimiter)
        .map(|offset| body_start + 1 + offset + delimiter.len())
        .ok_or(QueryError::Unterminated {
            kind: "dollar-quoted string",
            offset: open,
        })
}

/// Block comments nest in PostgreSQL.
fn skip_block_comment(bytes: &[u8], open: usize) -> Result<usize, QueryError> {
    let mut depth = 0usize;
    let mut j = open;
    while j + 1 < bytes.len() {
        match (bytes[j], bytes[j + 1]) {
            (b'/', b'*') => {
                depth += 1;
                j += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                j += 2;
                if depth == 0 {
                    return Ok(j);
                }
            }
            _ => j += 1,
        }
    }
    Err(QueryError::Unterminated {
        kind: "block comment",
        offset: open,
    })
}
