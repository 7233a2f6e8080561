//! # Path References
//!
//! A [`PathRef`] names another value by the field segments leading to
//! it. It holds only the path, never the value: resolution happens at
//! processing time against the tracker tree (see
//! [`TrackerTree::resolve`](crate::TrackerTree::resolve)), because the
//! referenced value may not exist yet, may already have been transformed,
//! or may be declared after the field that refers to it.

use serde::{Deserialize, Serialize};

/// A deferred pointer to a sibling or ancestor value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathRef {
    segments: Vec<String>,
}

impl PathRef {
    /// Build a reference from explicit segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a dotted path such as `"billing.country"`.
    ///
    /// Empty segments are dropped, so `"a..b"` and `"a.b"` are the same
    /// reference.
    pub fn parse(dotted: &str) -> Self {
        Self::new(dotted.split('.').filter(|s| !s.is_empty()))
    }

    /// The ordered field-name segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first segment, which decides the scope the lookup starts in.
    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Whether the path has no segments (it resolves to nothing).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<&str> for PathRef {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

impl std::fmt::Display for PathRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ref({})", self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_dots() {
        let r = PathRef::parse("billing.country");
        assert_eq!(r.segments(), &["billing".to_string(), "country".to_string()]);
        assert_eq!(r.first(), Some("billing"));
    }

    #[test]
    fn test_parse_drops_empty_segments() {
        assert_eq!(PathRef::parse("a..b"), PathRef::new(["a", "b"]));
        assert!(PathRef::parse("").is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(PathRef::new(["a", "b"]).to_string(), "ref(a.b)");
    }

    #[test]
    fn test_serializes_as_segment_list() {
        let json = serde_json::to_string(&PathRef::new(["x", "y"])).unwrap();
        assert_eq!(json, r#"["x","y"]"#);
    }
}
