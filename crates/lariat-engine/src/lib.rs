//! Lariat engine: the VM substrate underneath the marshalling SDK.
//!
//! Provides the tagged value model, the 1-indexed evaluation stack with
//! frame-relative addressing for native calls, the globals table, chunk
//! loading for a small script language, and the protected-call boundary
//! that converts runtime errors into reportable outcomes.
//!
//! The typed boundary — codecs, call bridges and the stack facade — lives
//! in `lariat-sdk`; this crate only deals in raw `Value`s.

pub mod error;
mod interp;
pub mod parser;
pub mod table;
pub mod value;
pub mod vm;

pub use error::{Fault, RuntimeError, SyntaxError};
pub use table::Table;
pub use value::{Function, NativeFn, OpaqueRef, ScriptFn, TypeTag, Value};
pub use vm::Vm;
