//! Structured field paths.
//!
//! Every leaf of a nested form record is addressed by a [`FieldPath`]: the
//! sequence of object keys leading from the record root to the leaf. Paths
//! render and parse in the familiar colon form (`address:city`), but the colon
//! is only a presentation format. Internally a path is a list of segments, so a
//! key that happens to contain `:` never aliases another path.

use std::fmt;

use smallvec::SmallVec;

use crate::error::FormError;

/// Separator used by the textual form of a [`FieldPath`].
pub const SEPARATOR: char = ':';

/// Identifier for one leaf value in the flattened field keyspace.
///
/// A path always has at least one segment. Ordering is lexicographic over
/// segments, which places a path directly before the paths it prefixes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(SmallVec<[Box<str>; 4]>);

impl FieldPath {
    /// Create a path from its segments.
    ///
    /// Returns [`FormError::EmptyPath`] if `segments` yields nothing.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Box<str>>,
    {
        let segments: SmallVec<[Box<str>; 4]> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(FormError::EmptyPath);
        }
        Ok(FieldPath(segments))
    }

    /// A single-segment (top-level) path.
    pub fn root(segment: impl Into<Box<str>>) -> Self {
        let mut segments = SmallVec::new();
        segments.push(segment.into());
        FieldPath(segments)
    }

    /// Extend this path by one segment.
    pub fn child(&self, segment: impl Into<Box<str>>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        FieldPath(segments)
    }

    pub fn segments(&self) -> &[Box<str>] {
        &self.0
    }

    /// The top-level segment, used to classify a field.
    pub fn top(&self) -> &str {
        self.0.first().map_or("", |segment| segment.as_ref())
    }

    /// The terminal segment.
    pub fn leaf(&self) -> &str {
        self.0.last().map_or("", |segment| segment.as_ref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A path built through the public constructors is never empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` is a strict prefix of `other` (`a` of `a:b`).
    pub fn is_prefix_of(&self, other: &FieldPath) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldPath({self})")
    }
}

/// Parses the colon form. `""` is the single empty segment.
impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        FieldPath(value.split(SEPARATOR).map(Box::<str>::from).collect())
    }
}

impl From<String> for FieldPath {
    fn from(value: String) -> Self {
        FieldPath::from(value.as_str())
    }
}

impl From<&FieldPath> for FieldPath {
    fn from(value: &FieldPath) -> Self {
        value.clone()
    }
}
