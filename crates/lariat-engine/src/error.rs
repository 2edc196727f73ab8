//! Error types for the engine.
//!
//! Two channels exist: `RuntimeError` travels *inside* the VM toward the
//! nearest protected-call boundary, while `Fault` is the outcome code that
//! boundary reports to native callers.

use thiserror::Error;

/// Outcome of a protected call that did not complete normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    /// The call raised a runtime error. Exactly one error value (a string
    /// with a captured traceback) is left on the stack.
    #[error("runtime error")]
    Runtime,

    /// The call's results would not fit in the stack capacity. The stack
    /// has been cleared entirely.
    #[error("out of memory")]
    OutOfMemory,

    /// The boundary could not even leave its single error value. The stack
    /// has been cleared entirely.
    #[error("error while handling error")]
    ErrorInHandler,
}

/// A runtime error unwinding toward the nearest protected-call boundary.
///
/// Frames crossed on the way up are recorded so the boundary can render a
/// traceback into the single error value it leaves on the stack.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RuntimeError {
    /// Human-readable description of the fault.
    pub message: String,
    /// Call frames recorded while unwinding, innermost first.
    pub frames: Vec<String>,
}

impl RuntimeError {
    /// Create an error with no recorded frames.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frames: Vec::new(),
        }
    }

    /// Record a frame while unwinding through it.
    pub fn in_frame(mut self, frame: impl Into<String>) -> Self {
        self.frames.push(frame.into());
        self
    }

    /// Render the message with the captured traceback appended.
    pub fn with_traceback(&self) -> String {
        let mut out = self.message.clone();
        out.push_str("\nstack traceback:");
        for frame in &self.frames {
            out.push_str("\n\t");
            out.push_str(frame);
        }
        out
    }
}

/// Error produced while loading a chunk.
#[derive(Debug, Clone, Error)]
#[error("{chunk}:{line}: {message}")]
pub struct SyntaxError {
    /// Name the chunk was loaded under.
    pub chunk: String,
    /// 1-based source line of the offending token.
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traceback_rendering() {
        let err = RuntimeError::new("attempt to call a nil value")
            .in_frame("in function 'inner'")
            .in_frame("in main chunk");

        let rendered = err.with_traceback();
        assert!(rendered.starts_with("attempt to call a nil value"));
        assert!(rendered.contains("stack traceback:"));
        assert!(rendered.contains("in function 'inner'"));
        assert!(rendered.contains("in main chunk"));
    }

    #[test]
    fn syntax_error_display() {
        let err = SyntaxError {
            chunk: "test".to_string(),
            line: 3,
            message: "unexpected symbol near ';'".to_string(),
        };
        assert_eq!(err.to_string(), "test:3: unexpected symbol near ';'");
    }
}
