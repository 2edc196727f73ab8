//! Scalar codecs: booleans, the integer and number families, text and the
//! void unit.
//!
//! All numeric types ride the VM's unified `f64` slot format. The narrow
//! integers (everything that fits `f64` exactly with room to spare) are
//! classified `Integer`; the wide ones and the floats are `Number`. Both
//! families share one codec — the split shows up in classification queries
//! and in diagnostic names ("integer" vs "number"), never in the wire
//! format.

use lariat_engine::{TypeTag, Value, Vm};

use crate::classify::Category;
use crate::convert::{FromStack, ToStack};
use crate::error::MarshalError;

// ============================================================================
// Void
// ============================================================================

/// `()` occupies zero slots: pushing is a no-op and decoding always
/// succeeds without looking at the stack. This is what lets `fn(..) -> ()`
/// bridge cleanly as a zero-result native function.
impl ToStack for () {
    const CATEGORY: Category = Category::Void;
    const SLOT_COUNT: usize = 0;

    fn push(self, _vm: &mut Vm) {}
}

impl FromStack for () {
    const CATEGORY: Category = Category::Void;
    const SLOT_COUNT: usize = 0;

    fn is(_vm: &Vm, _index: i32) -> bool {
        true
    }

    fn get(_vm: &Vm, _index: i32) -> Result<Self, MarshalError> {
        Ok(())
    }

    fn type_name() -> &'static str {
        "nil"
    }
}

// ============================================================================
// Boolean
// ============================================================================

impl ToStack for bool {
    const CATEGORY: Category = Category::Boolean;

    fn push(self, vm: &mut Vm) {
        vm.push_value(Value::Bool(self));
    }
}

/// Booleans accept nil in addition to true/false: an absent value reads as
/// false, the way VM truthiness treats it. Decoding applies truthiness to
/// whatever the slot holds.
impl FromStack for bool {
    const CATEGORY: Category = Category::Boolean;

    fn is(vm: &Vm, index: i32) -> bool {
        matches!(vm.type_tag(index), TypeTag::Boolean | TypeTag::Nil)
    }

    fn get(vm: &Vm, index: i32) -> Result<Self, MarshalError> {
        match vm.value_at(index) {
            Some(value) => Ok(value.truthy()),
            None => Err(MarshalError::new(
                index,
                TypeTag::None.name(),
                Self::type_name(),
            )),
        }
    }

    fn type_name() -> &'static str {
        "boolean"
    }
}

// ============================================================================
// Integers and numbers
// ============================================================================

macro_rules! numeric_codec {
    ($category:expr, $name:literal => $($ty:ty),+) => {$(
        impl ToStack for $ty {
            const CATEGORY: Category = $category;

            fn push(self, vm: &mut Vm) {
                vm.push_value(Value::Number(self as f64));
            }
        }

        impl FromStack for $ty {
            const CATEGORY: Category = $category;

            fn is(vm: &Vm, index: i32) -> bool {
                vm.is_tag(index, TypeTag::Number)
            }

            fn get(vm: &Vm, index: i32) -> Result<Self, MarshalError> {
                match vm.value_at(index) {
                    Some(Value::Number(n)) => Ok(*n as $ty),
                    other => Err(MarshalError::new(
                        index,
                        other.map(Value::type_name).unwrap_or(TypeTag::None.name()),
                        Self::type_name(),
                    )),
                }
            }

            fn type_name() -> &'static str {
                $name
            }
        }
    )+};
}

numeric_codec!(Category::Integer, "integer" => i8, i16, i32, u8, u16);
numeric_codec!(Category::Number, "number" => i64, u32, u64, isize, usize, f32, f64);

// ============================================================================
// Text
// ============================================================================

impl ToStack for &str {
    const CATEGORY: Category = Category::Text;

    fn push(self, vm: &mut Vm) {
        vm.push_value(Value::str(self));
    }
}

impl ToStack for String {
    const CATEGORY: Category = Category::Text;

    fn push(self, vm: &mut Vm) {
        vm.push_value(Value::str(self));
    }
}

/// Decoding copies the bytes out of VM-owned storage; the returned string
/// stays valid no matter what happens to the stack afterwards.
impl FromStack for String {
    const CATEGORY: Category = Category::Text;

    fn is(vm: &Vm, index: i32) -> bool {
        vm.is_tag(index, TypeTag::String)
    }

    fn get(vm: &Vm, index: i32) -> Result<Self, MarshalError> {
        match vm.value_at(index) {
            Some(Value::Str(s)) => Ok(s.to_string()),
            other => Err(MarshalError::new(
                index,
                other.map(Value::type_name).unwrap_or(TypeTag::None.name()),
                Self::type_name(),
            )),
        }
    }

    fn type_name() -> &'static str {
        "string"
    }
}
