use thiserror::Error;

use crate::path::FieldPath;

/// Errors surfaced by form initialization.
///
/// Ordinary edits and reads never fail: unknown paths degrade to empty
/// entries. Only building the field keyspace can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// One field path is a strict prefix of another (`a` and `a:b`), so the
    /// nested record cannot be reassembled unambiguously.
    #[error("field `{prefix}` collides with nested field `{path}`")]
    PathCollision { prefix: FieldPath, path: FieldPath },
    /// A path was built from zero segments.
    #[error("field path has no segments")]
    EmptyPath,
}
