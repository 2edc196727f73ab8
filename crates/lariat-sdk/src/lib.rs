//! Lariat SDK: the typed marshalling layer between native Rust and the VM
//! stack.
//!
//! The engine deals in raw tagged `Value`s; this crate maps statically
//! typed Rust values onto those slots and back. The pieces:
//!
//! - [`Category`] — the classification every boundary type resolves to.
//! - [`ToStack`] / [`FromStack`] — the codec traits, implemented for
//!   scalars, raw pointers, derived aggregates and handles. Types without
//!   an impl are rejected at compile time.
//! - [`bridge`] — wraps a plain Rust function as a VM trampoline, with
//!   arity and slot requirements computed from its signature.
//! - [`FuncRef`] / [`TableRef`] — handles to VM-resident values, valid
//!   across frames.
//! - [`StackExt`] — typed push/get/is/call/register over a `Vm`.
//!
//! ```no_run
//! use lariat_engine::Vm;
//! use lariat_sdk::StackExt;
//!
//! let mut vm = Vm::new();
//! vm.register("add", |a: i32, b: i32| a + b);
//! vm.execute("demo", "return add(40, 2)").ok();
//! assert_eq!(vm.get::<i32>(-1), Ok(42));
//! ```

pub mod aggregate;
pub mod bridge;
pub mod classify;
pub mod convert;
pub mod error;
pub mod facade;
pub mod handles;
pub mod opaque;
pub mod registry;
pub mod scalar;

pub use aggregate::{Aggregate, MAX_AGGREGATE_FIELDS};
pub use bridge::{bridge, ArgPack, CallRequirement, NativeFunction, ParamPack};
pub use classify::Category;
pub use convert::{slot_count_of, type_name_of, FromStack, ToStack};
pub use error::MarshalError;
pub use facade::StackExt;
pub use handles::{FuncRef, TableRef};
pub use registry::{fingerprint_of, short_name};

// Re-exported so downstream code (and the derive expansion) needs only one
// crate in scope.
pub use lariat_engine::{
    Fault, Function, NativeFn, OpaqueRef, RuntimeError, Table, TypeTag, Value, Vm,
};
