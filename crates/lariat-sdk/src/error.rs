//! Errors raised at the marshalling boundary.

use thiserror::Error;

/// A slot could not be decoded as the requested native type.
///
/// Carries enough for a caller to render a useful diagnostic without
/// touching the stack again. Decoding never consumes slots, so after this
/// error the stack is exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value at slot {index} (got: {got} | expected: {expected})")]
pub struct MarshalError {
    /// The slot index as the caller gave it.
    pub index: i32,
    /// Runtime tag name of what is actually there.
    pub got: &'static str,
    /// Diagnostic name of the requested native type.
    pub expected: &'static str,
}

impl MarshalError {
    pub fn new(index: i32, got: &'static str, expected: &'static str) -> Self {
        Self {
            index,
            got,
            expected,
        }
    }
}
