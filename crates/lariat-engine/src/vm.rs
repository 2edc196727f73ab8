//! The VM context: evaluation stack, globals, chunk loading and the
//! protected-call boundary.
//!
//! Slot indexing follows the classic value-stack convention: 1-based from
//! the bottom of the current frame, negative relative to the top. Native
//! invocations run in their own frame, so a trampoline only ever observes
//! its own arguments and nested native↔VM calls keep slot accounting local.
//!
//! A `Vm` and its stack must be confined to one thread at a time; nothing
//! here locks.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Fault, RuntimeError};
use crate::interp;
use crate::parser::parse_chunk;
use crate::table::Table;
use crate::value::{Function, NativeFn, ScriptFn, TypeTag, Value};

/// Script call depth bound; exceeding it is a runtime fault rather than a
/// native stack overflow.
const MAX_CALL_DEPTH: usize = 200;

/// Slots a protected call may leave on the stack.
const DEFAULT_STACK_LIMIT: usize = 1_000_000;

/// One VM context.
pub struct Vm {
    stack: Vec<Value>,
    /// Frame base of the innermost native frame, as a raw stack position.
    base: usize,
    globals: Rc<RefCell<Table>>,
    depth: usize,
    /// Stack capacity, checked at the protected-call boundary.
    limit: usize,
}

impl Vm {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            base: 0,
            globals: Rc::new(RefCell::new(Table::new())),
            depth: 0,
            limit: DEFAULT_STACK_LIMIT,
        }
    }

    /// A context with a custom stack capacity.
    pub fn with_stack_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::new()
        }
    }

    /// The globals table, shared by every chunk this context runs.
    pub fn globals(&self) -> Rc<RefCell<Table>> {
        self.globals.clone()
    }

    // ========================================================================
    // Stack primitives
    // ========================================================================

    /// Number of slots in the current frame.
    pub fn stack_size(&self) -> usize {
        self.stack.len() - self.base
    }

    /// Resolve a possibly-negative index against the current top.
    ///
    /// Returns the 1-based frame slot, or `None` when the index is outside
    /// the current stack extent (including index 0, which is never valid).
    pub fn absolute(&self, index: i32) -> Option<usize> {
        let size = self.stack_size() as i64;
        let index = index as i64;
        let abs = if index < 0 { size + index + 1 } else { index };
        if abs >= 1 && abs <= size {
            Some(abs as usize)
        } else {
            None
        }
    }

    fn position(&self, abs: usize) -> usize {
        self.base + abs - 1
    }

    /// Borrow the value in a slot; `None` when the index is out of range.
    pub fn value_at(&self, index: i32) -> Option<&Value> {
        self.absolute(index).map(|abs| &self.stack[self.position(abs)])
    }

    /// Runtime tag of a slot; `TypeTag::None` when out of range.
    pub fn type_tag(&self, index: i32) -> TypeTag {
        self.value_at(index).map(Value::tag).unwrap_or(TypeTag::None)
    }

    pub fn is_tag(&self, index: i32, tag: TypeTag) -> bool {
        self.type_tag(index) == tag
    }

    /// Append one value to the current frame.
    pub fn push_value(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Copy an existing slot to the top. Returns false when the index is
    /// out of range (nothing is pushed).
    pub fn push_slot(&mut self, index: i32) -> bool {
        match self.value_at(index).cloned() {
            Some(value) => {
                self.stack.push(value);
                true
            }
            None => false,
        }
    }

    /// Remove and return the top slot of the current frame.
    pub fn pop_value(&mut self) -> Option<Value> {
        if self.stack.len() > self.base {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Drop `n` slots from the top, clamped to the current frame.
    pub fn pop(&mut self, n: usize) {
        let keep = self.stack.len().saturating_sub(n).max(self.base);
        self.stack.truncate(keep);
    }

    /// Remove one slot, shifting the slots above it down. Returns false
    /// when the index is out of range.
    pub fn remove(&mut self, index: i32) -> bool {
        match self.absolute(index) {
            Some(abs) => {
                let position = self.position(abs);
                self.stack.remove(position);
                true
            }
            None => false,
        }
    }

    /// Move the top slot into the given position, shifting the slots above
    /// it up. Returns false when the index is out of range or the frame is
    /// empty.
    pub fn insert(&mut self, index: i32) -> bool {
        let Some(abs) = self.absolute(index) else {
            return false;
        };
        if self.stack.len() == self.base {
            return false;
        }
        let top = self.stack.len() - 1;
        let value = self.stack.remove(top);
        self.stack.insert(self.position(abs), value);
        true
    }

    /// Drop every slot of the current frame.
    pub fn clear(&mut self) {
        self.stack.truncate(self.base);
    }

    /// Drop every slot of every frame. The fail-clean path for
    /// unrecoverable faults.
    fn clear_all(&mut self) {
        self.stack.clear();
        self.base = 0;
    }

    // ========================================================================
    // Chunk loading
    // ========================================================================

    /// Compile a chunk and push it as a zero-parameter function.
    ///
    /// On a syntax error the error message is pushed instead and
    /// `Fault::Runtime` is reported, mirroring the protected-call
    /// convention of one error value on the stack.
    pub fn load(&mut self, name: &str, source: &str) -> Result<(), Fault> {
        match parse_chunk(name, source) {
            Ok(body) => {
                let chunk = ScriptFn {
                    name: Some(name.to_string()),
                    params: Vec::new(),
                    body,
                };
                self.push_value(Value::Function(Function::Script(Rc::new(chunk))));
                Ok(())
            }
            Err(err) => {
                self.push_value(Value::str(err.to_string()));
                Err(Fault::Runtime)
            }
        }
    }

    /// Load a chunk and run it under a protected call.
    pub fn execute(&mut self, name: &str, source: &str) -> Result<usize, Fault> {
        self.load(name, source)?;
        self.protected_call(0)
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// Invoke the callable sitting below its `nargs` argument slots,
    /// converting any runtime error into a reportable outcome.
    ///
    /// On success the callee and arguments are replaced by the results and
    /// the result count is returned. On `Fault::Runtime` exactly one error
    /// value — the message with a captured traceback — replaces them.
    ///
    /// The stack capacity is enforced here: results that would exceed it
    /// report `Fault::OutOfMemory`, and when not even the single error
    /// value fits, `Fault::ErrorInHandler`. Both clear the stack entirely.
    pub fn protected_call(&mut self, nargs: usize) -> Result<usize, Fault> {
        let size = self.stack_size();
        if nargs + 1 > size {
            self.push_value(Value::str(format!(
                "attempt to call a missing value (stack size: {} | arguments: {})",
                size, nargs
            )));
            return Err(Fault::Runtime);
        }

        let callee_position = self.position(size - nargs);
        let args = self.stack.split_off(callee_position + 1);
        // the size guard above ensures the callee slot exists
        let callee = self.stack.pop().unwrap_or(Value::Nil);

        match self.call_value(callee, args) {
            Ok(results) => {
                if self.stack.len() + results.len() > self.limit {
                    self.clear_all();
                    return Err(Fault::OutOfMemory);
                }
                let count = results.len();
                self.stack.extend(results);
                Ok(count)
            }
            Err(err) => {
                self.stack.truncate(callee_position);
                if self.stack.len() + 1 > self.limit {
                    self.clear_all();
                    return Err(Fault::ErrorInHandler);
                }
                self.push_value(Value::str(err.with_traceback()));
                Err(Fault::Runtime)
            }
        }
    }

    /// Dispatch a call on an already-materialized callee. Used by the
    /// protected-call boundary and by the interpreter's call expressions
    /// (which stay unprotected so errors reach the nearest boundary).
    pub(crate) fn call_value(
        &mut self,
        callee: Value,
        args: Vec<Value>,
    ) -> Result<Vec<Value>, RuntimeError> {
        match callee {
            Value::Function(Function::Native(f)) => self.call_native(&f, args),
            Value::Function(Function::Script(f)) => self.call_script(&f, args),
            other => Err(RuntimeError::new(format!(
                "attempt to call a {} value",
                other.type_name()
            ))),
        }
    }

    /// Run a trampoline in a fresh frame holding exactly its arguments.
    fn call_native(
        &mut self,
        f: &NativeFn,
        args: Vec<Value>,
    ) -> Result<Vec<Value>, RuntimeError> {
        let saved_base = self.base;
        self.base = self.stack.len();
        self.stack.extend(args);

        let outcome = f(self);

        let result = match outcome {
            Ok(count) => {
                let count = count.min(self.stack_size());
                let results = self.stack.split_off(self.stack.len() - count);
                Ok(results)
            }
            Err(err) => Err(err.in_frame("in native function")),
        };

        self.stack.truncate(self.base);
        self.base = saved_base;
        result
    }

    fn call_script(
        &mut self,
        f: &Rc<ScriptFn>,
        args: Vec<Value>,
    ) -> Result<Vec<Value>, RuntimeError> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::new("stack overflow"));
        }
        self.depth += 1;
        let result = interp::run_function(self, f, args);
        self.depth -= 1;

        result.map_err(|err| {
            err.in_frame(match &f.name {
                Some(name) => format!("in function '{}'", name),
                None => "in anonymous function".to_string(),
            })
        })
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}
