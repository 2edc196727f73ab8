//! Handles to VM-resident values.
//!
//! A handle keeps its referent alive by holding the same shared reference
//! the VM holds, so it stays valid across native call frames and stack
//! manipulation — unlike a raw slot index, which shifts whenever the frame
//! does. Decoding a handle from a slot clones the reference; the slot can
//! be popped immediately afterwards.

use std::cell::RefCell;
use std::rc::Rc;

use lariat_engine::{Function, RuntimeError, Table, TypeTag, Value, Vm};

use crate::bridge::ArgPack;
use crate::classify::Category;
use crate::convert::{FromStack, ToStack};
use crate::error::MarshalError;

// ============================================================================
// Functions
// ============================================================================

/// A handle to a VM callable.
#[derive(Clone)]
pub struct FuncRef {
    func: Function,
}

impl FuncRef {
    /// Call with typed arguments under a protected call, decoding the first
    /// result as `R`.
    ///
    /// The result slots are consumed; on error the single error value the
    /// boundary left behind is consumed too and returned as the message.
    pub fn call<A, R>(&self, vm: &mut Vm, args: A) -> Result<R, RuntimeError>
    where
        A: ArgPack,
        R: FromStack,
    {
        vm.push_value(Value::Function(self.func.clone()));
        args.push_all(vm);

        match vm.protected_call(A::SLOTS) {
            Ok(count) => {
                if count < R::SLOT_COUNT {
                    vm.pop(count);
                    return Err(RuntimeError::new(format!(
                        "invalid results (expected: {} | returned: {})",
                        R::SLOT_COUNT,
                        count,
                    )));
                }
                let base = (vm.stack_size() - count + 1) as i32;
                let result =
                    R::get(vm, base).map_err(|err| RuntimeError::new(err.to_string()));
                vm.pop(count);
                result
            }
            Err(fault) => {
                let message = match vm.pop_value() {
                    Some(Value::Str(s)) => s.to_string(),
                    _ => fault.to_string(),
                };
                Err(RuntimeError::new(message))
            }
        }
    }
}

impl ToStack for FuncRef {
    const CATEGORY: Category = Category::Handle;

    fn push(self, vm: &mut Vm) {
        vm.push_value(Value::Function(self.func));
    }
}

impl FromStack for FuncRef {
    const CATEGORY: Category = Category::Handle;

    fn is(vm: &Vm, index: i32) -> bool {
        vm.is_tag(index, TypeTag::Function)
    }

    fn get(vm: &Vm, index: i32) -> Result<Self, MarshalError> {
        match vm.value_at(index) {
            Some(Value::Function(f)) => Ok(FuncRef { func: f.clone() }),
            Some(other) => Err(MarshalError::new(
                index,
                other.type_name(),
                Self::type_name(),
            )),
            None => Err(MarshalError::new(
                index,
                TypeTag::None.name(),
                Self::type_name(),
            )),
        }
    }

    fn type_name() -> &'static str {
        "function"
    }
}

// ============================================================================
// Tables
// ============================================================================

/// A handle to a VM table.
#[derive(Clone)]
pub struct TableRef {
    table: Rc<RefCell<Table>>,
}

impl TableRef {
    /// Create a fresh table, not yet reachable from any slot or global.
    pub fn new() -> Self {
        Self {
            table: Rc::new(RefCell::new(Table::new())),
        }
    }

    /// The context's globals table.
    pub fn globals(vm: &Vm) -> Self {
        Self {
            table: vm.globals(),
        }
    }

    /// Fetch a field raw; missing fields read as nil.
    pub fn get_value(&self, key: &str) -> Value {
        self.table.borrow().raw_get(key)
    }

    /// Store a field raw. Nil removes the entry.
    pub fn set_value(&self, key: &str, value: Value) {
        self.table.borrow_mut().raw_set(key, value);
    }

    /// Fetch a field decoded as a single-slot native type. The VM stack is
    /// used as scratch space and restored before returning.
    pub fn get<T: FromStack>(&self, vm: &mut Vm, key: &str) -> Result<T, MarshalError> {
        vm.push_value(self.get_value(key));
        let result = T::get(vm, -1);
        vm.pop(1);
        result
    }

    /// Store a field encoded from a single-slot native type.
    pub fn set<T: ToStack>(&self, vm: &mut Vm, key: &str, value: T) {
        value.push(vm);
        if let Some(encoded) = vm.pop_value() {
            self.set_value(key, encoded);
        }
    }

    /// Visit every entry. Iteration order is unspecified.
    pub fn map<F>(&self, mut f: F)
    where
        F: FnMut(&str, &Value),
    {
        for (key, value) in self.table.borrow().iter() {
            f(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.table.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.borrow().is_empty()
    }
}

impl Default for TableRef {
    fn default() -> Self {
        Self::new()
    }
}

impl ToStack for TableRef {
    const CATEGORY: Category = Category::Handle;

    fn push(self, vm: &mut Vm) {
        vm.push_value(Value::Table(self.table));
    }
}

impl FromStack for TableRef {
    const CATEGORY: Category = Category::Handle;

    fn is(vm: &Vm, index: i32) -> bool {
        vm.is_tag(index, TypeTag::Table)
    }

    fn get(vm: &Vm, index: i32) -> Result<Self, MarshalError> {
        match vm.value_at(index) {
            Some(Value::Table(t)) => Ok(TableRef { table: t.clone() }),
            Some(other) => Err(MarshalError::new(
                index,
                other.type_name(),
                Self::type_name(),
            )),
            None => Err(MarshalError::new(
                index,
                TypeTag::None.name(),
                Self::type_name(),
            )),
        }
    }

    fn type_name() -> &'static str {
        "table"
    }
}
