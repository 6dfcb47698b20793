//! Response paths.
//!
//! The same vocabulary is used for server-reported `errors[].path` entries and
//! for client-side hydration failures, so both can be reported uniformly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        Self::Field(s)
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self::Field(s.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

/// A location inside a response, from the root of `data` down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponsePath(Vec<PathSegment>);

impl ResponsePath {
    /// Creates an empty (root) path.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }

    /// Returns a copy of this path extended by one segment.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    /// Returns the last field name on the path, skipping list indices.
    pub fn last_field(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|segment| match segment {
            PathSegment::Field(name) => Some(name.as_str()),
            PathSegment::Index(_) => None,
        })
    }
}

impl From<Vec<PathSegment>> for ResponsePath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for ResponsePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for ResponsePath {
    /// Renders as `user.friends[2].name`; the root renders as `<root>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let path: ResponsePath = vec![
            PathSegment::from("user"),
            PathSegment::from("friends"),
            PathSegment::from(2usize),
            PathSegment::from("name"),
        ]
        .into();
        assert_eq!(path.to_string(), "user.friends[2].name");
        assert_eq!(ResponsePath::root().to_string(), "<root>");
    }

    #[test]
    fn test_serializes_like_server_paths() {
        let path = ResponsePath::root().child("items").child(0usize);
        assert_eq!(
            serde_json::to_value(&path).unwrap(),
            serde_json::json!(["items", 0])
        );

        let parsed: ResponsePath = serde_json::from_value(serde_json::json!(["a", 3, "b"])).unwrap();
        assert_eq!(parsed, ResponsePath::root().child("a").child(3usize).child("b"));
    }

    #[test]
    fn test_last_field_skips_indices() {
        let path = ResponsePath::root().child("items").child(4usize);
        assert_eq!(path.last_field(), Some("items"));
        assert_eq!(ResponsePath::root().last_field(), None);
    }
}
