//! Pattern parsing: classify `/`-separated tokens into segment variants.
//!
//! | Token   | Segment                 |
//! |---------|-------------------------|
//! | `pages` | [`Segment::Literal`]    |
//! | `:id`   | [`Segment::Named`]      |
//! | `?page` | [`Segment::Optional`]   |
//! | `*rest` | [`Segment::Wildcard`]   |
//!
//! Segments are classified once at registration time. Matching and path
//! generation branch on the variant and never look at marker characters again.

use crate::error::RouteError;

/// One classified token of a registration pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches the exact text
    Literal(String),
    /// Required capture (`:name`)
    Named(String),
    /// Optional trailing capture (`?name`)
    Optional(String),
    /// Trailing variadic capture (`*name`, name may be empty)
    Wildcard(String),
}

impl Segment {
    /// Classify a single token.
    ///
    /// Fails with [`RouteError::MissingParameterName`] when a `:` or `?`
    /// marker has nothing after it. An empty wildcard name is accepted here;
    /// it only matters when generating paths from name-keyed data.
    pub fn classify(token: &str) -> Result<Self, RouteError> {
        let segment = match token.as_bytes().first() {
            Some(b':') => Segment::Named(param_name(token)?),
            Some(b'?') => Segment::Optional(param_name(token)?),
            Some(b'*') => Segment::Wildcard(token[1..].to_string()),
            _ => Segment::Literal(token.to_string()),
        };
        Ok(segment)
    }

    /// `true` for every variant except [`Segment::Literal`].
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Segment::Literal(_))
    }
}

fn param_name(token: &str) -> Result<String, RouteError> {
    let name = &token[1..];
    if name.is_empty() {
        return Err(RouteError::MissingParameterName);
    }
    Ok(name.to_string())
}

/// A validated, classified registration pattern.
///
/// Invariants: once an optional segment appears every following segment is
/// optional or a wildcard, and a wildcard is always the last segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse an already sanitized pattern string.
    ///
    /// Tokens are checked left to right, so the first violation in the
    /// pattern is the one reported.
    pub fn parse(source: &str) -> Result<Self, RouteError> {
        let mut segments: Vec<Segment> = Vec::new();
        let mut in_optional = false;

        for token in split(source) {
            if matches!(segments.last(), Some(Segment::Wildcard(_))) {
                return Err(RouteError::InvalidWildcardParameter);
            }
            let segment = Segment::classify(token)?;
            match segment {
                Segment::Optional(_) => in_optional = true,
                Segment::Literal(_) | Segment::Named(_) if in_optional => {
                    return Err(RouteError::InvalidOptionalParameter);
                }
                _ => {}
            }
            segments.push(segment);
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The sanitized pattern text, e.g. `pages/:id/?tab`
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Classified segments in order
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of capturing segments
    #[must_use]
    pub fn dynamic_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_dynamic()).count()
    }
}

/// Collapse repeated separators and trim leading and trailing ones.
///
/// `"//pages///5/"` becomes `"pages/5"`.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for part in raw.split('/').filter(|p| !p.is_empty()) {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(part);
    }
    out
}

/// Split a sanitized path into segments. The empty path has none.
pub fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|p| !p.is_empty())
}

/// Join a scope prefix and a pattern into one sanitized pattern.
#[must_use]
pub fn join(prefix: &str, pattern: &str) -> String {
    sanitize(&format!("{prefix}/{pattern}"))
}
