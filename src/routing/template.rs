//! Path template compilation and matching.
//!
//! # Responsibilities
//! - Parse a pattern such as `/max/:num/:num` into literal and parameter segments
//! - Match a concrete path against the compiled segments
//! - Yield the raw (still percent-encoded) captures in template order
//!
//! # Design Decisions
//! - Segment-wise comparison instead of a regex; a parameter segment behaves like `([^/]+)`
//! - Segment count is fixed: no wildcards, no optional segments
//! - Duplicate parameter names are allowed and positional

use std::fmt;

use thiserror::Error;

/// Marker that introduces a named parameter segment.
pub const PARAM_MARKER: char = ':';

/// Errors raised while compiling a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The pattern does not start with `/`.
    #[error("template '{0}' must start with '/'")]
    MissingLeadingSlash(String),

    /// A `:` segment without a name.
    #[error("template '{pattern}' has an unnamed parameter at segment {index}")]
    EmptyParameterName { pattern: String, index: usize },
}

/// One compiled segment of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    pattern: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    /// Compile a pattern into a template.
    pub fn parse(pattern: &str) -> Result<Self, TemplateError> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(TemplateError::MissingLeadingSlash(pattern.to_string()));
        };

        let mut segments = Vec::new();
        for (index, raw) in rest.split('/').enumerate() {
            match raw.strip_prefix(PARAM_MARKER) {
                Some("") => {
                    return Err(TemplateError::EmptyParameterName {
                        pattern: pattern.to_string(),
                        index,
                    })
                }
                Some(name) => segments.push(Segment::Param(name.to_string())),
                None => segments.push(Segment::Literal(raw.to_string())),
            }
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    /// The pattern this template was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in template order (duplicates included).
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn param_count(&self) -> usize {
        self.params().count()
    }

    /// Match a concrete path.
    ///
    /// Returns the raw captured segments in template order, or `None` when the
    /// segment count differs, a literal differs, or a parameter segment is empty.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<&'p str>> {
        let rest = path.strip_prefix('/')?;
        let mut parts = rest.split('/');
        let mut captures = Vec::with_capacity(self.param_count());

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) => {
                    if literal.as_bytes() != part.as_bytes() {
                        return None;
                    }
                }
                Segment::Param(_) => {
                    if part.is_empty() {
                        return None;
                    }
                    captures.push(part);
                }
            }
        }

        // Extra segments on the path mean a different shape.
        if parts.next().is_some() {
            return None;
        }

        Some(captures)
    }

    /// Returns true if `path` matches this template.
    pub fn matches(&self, path: &str) -> bool {
        self.captures(path).is_some()
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let template = RouteTemplate::parse("/max/:num/:num").unwrap();
        assert_eq!(
            template.segments(),
            &[
                Segment::Literal("max".into()),
                Segment::Param("num".into()),
                Segment::Param("num".into()),
            ]
        );
        assert_eq!(template.params().collect::<Vec<_>>(), vec!["num", "num"]);
        assert_eq!(template.pattern(), "/max/:num/:num");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(
            RouteTemplate::parse("foo/:id"),
            Err(TemplateError::MissingLeadingSlash("foo/:id".into()))
        );
        assert!(matches!(
            RouteTemplate::parse("/foo/:/bar"),
            Err(TemplateError::EmptyParameterName { index: 1, .. })
        ));
    }

    #[test]
    fn test_captures_in_template_order() {
        let template = RouteTemplate::parse("/users/:id/posts/:post").unwrap();
        assert_eq!(
            template.captures("/users/7/posts/hello%20world"),
            Some(vec!["7", "hello%20world"])
        );
    }

    #[test]
    fn test_segment_count_must_match() {
        let template = RouteTemplate::parse("/foo/:age").unwrap();
        assert!(template.matches("/foo/42"));
        assert!(!template.matches("/foo"));
        assert!(!template.matches("/foo/42/extra"));
        assert!(!template.matches("/foo/42/"));
        assert!(!template.matches("/foo/"));
    }

    #[test]
    fn test_literal_mismatch() {
        let template = RouteTemplate::parse("/foo/:age").unwrap();
        assert!(!template.matches("/Foo/42"));
        assert!(!template.matches("/bar/42"));
        assert!(!template.matches("foo/42"));
    }

    #[test]
    fn test_literal_only_template() {
        let template = RouteTemplate::parse("/bar").unwrap();
        assert_eq!(template.captures("/bar"), Some(vec![]));
        assert!(!template.matches("/bar/baz"));

        let root = RouteTemplate::parse("/").unwrap();
        assert!(root.matches("/"));
        assert!(!root.matches("/bar"));
    }

    #[test]
    fn test_matches_any_equal_shape() {
        let template = RouteTemplate::parse("/a/:x/b/:y/c").unwrap();
        for (x, y) in [("1", "2"), ("one", "two"), ("-1.5", "true")] {
            let path = format!("/a/{x}/b/{y}/c");
            assert_eq!(template.captures(&path), Some(vec![x, y]));
        }
        assert!(!template.matches("/a/1/B/2/c"));
        assert!(!template.matches("/a/1/b/2"));
    }
}
