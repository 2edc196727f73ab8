//! Typed operations over a VM context.
//!
//! The facade is an extension trait rather than a wrapper type, so typed
//! and raw access interleave freely on the same `Vm`. All typed operations
//! are thin: the codec traits do the work, the facade only routes.

use lariat_engine::{Function, NativeFn, RuntimeError, Value, Vm};

use crate::bridge::{bridge, ArgPack, NativeFunction, ParamPack};
use crate::convert::{FromStack, ToStack};
use crate::error::MarshalError;
use crate::handles::{FuncRef, TableRef};

/// Typed stack access for a VM context.
pub trait StackExt {
    /// Encode a value onto the top of the current frame.
    fn push<T: ToStack>(&mut self, value: T);

    /// Whether the slot(s) at `index` would decode as `T`.
    fn is<T: FromStack>(&self, index: i32) -> bool;

    /// Decode the slot(s) at `index` without consuming them.
    fn get<T: FromStack>(&self, index: i32) -> Result<T, MarshalError>;

    /// Bridge a Rust function and push it as a callable value.
    fn push_fn<F, A, R>(&mut self, f: F)
    where
        F: NativeFunction<A, R> + 'static,
        A: ParamPack + 'static,
        R: ToStack + 'static;

    /// Push an already-built trampoline as a callable value. The escape
    /// hatch for functions that want the raw frame.
    fn push_raw_fn(&mut self, f: NativeFn);

    /// Bridge a Rust function and bind it to a global name, making it
    /// callable from script.
    fn register<F, A, R>(&mut self, name: &str, f: F)
    where
        F: NativeFunction<A, R> + 'static,
        A: ParamPack + 'static,
        R: ToStack + 'static;

    /// Call the function on top of the stack with typed arguments,
    /// consuming it and decoding the first result.
    fn call<A, R>(&mut self, args: A) -> Result<R, RuntimeError>
    where
        A: ArgPack,
        R: FromStack;

    /// Call a held function handle with typed arguments.
    fn call_ref<A, R>(&mut self, func: &FuncRef, args: A) -> Result<R, RuntimeError>
    where
        A: ArgPack,
        R: FromStack;

    /// The globals table as a handle.
    fn globals_ref(&self) -> TableRef;
}

impl StackExt for Vm {
    fn push<T: ToStack>(&mut self, value: T) {
        value.push(self);
    }

    fn is<T: FromStack>(&self, index: i32) -> bool {
        T::is(self, index)
    }

    fn get<T: FromStack>(&self, index: i32) -> Result<T, MarshalError> {
        T::get(self, index)
    }

    fn push_fn<F, A, R>(&mut self, f: F)
    where
        F: NativeFunction<A, R> + 'static,
        A: ParamPack + 'static,
        R: ToStack + 'static,
    {
        self.push_raw_fn(bridge(f));
    }

    fn push_raw_fn(&mut self, f: NativeFn) {
        self.push_value(Value::Function(Function::Native(f)));
    }

    fn register<F, A, R>(&mut self, name: &str, f: F)
    where
        F: NativeFunction<A, R> + 'static,
        A: ParamPack + 'static,
        R: ToStack + 'static,
    {
        self.globals()
            .borrow_mut()
            .raw_set(name, Value::Function(Function::Native(bridge(f))));
    }

    fn call<A, R>(&mut self, args: A) -> Result<R, RuntimeError>
    where
        A: ArgPack,
        R: FromStack,
    {
        let func: FuncRef = self
            .get(-1)
            .map_err(|err| RuntimeError::new(err.to_string()))?;
        self.pop(1);
        func.call(self, args)
    }

    fn call_ref<A, R>(&mut self, func: &FuncRef, args: A) -> Result<R, RuntimeError>
    where
        A: ArgPack,
        R: FromStack,
    {
        func.call(self, args)
    }

    fn globals_ref(&self) -> TableRef {
        TableRef::globals(self)
    }
}
