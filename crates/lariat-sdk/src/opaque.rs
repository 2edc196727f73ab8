//! Opaque pointer codec.
//!
//! Raw pointers to any `'static` native type cross the boundary as opaque
//! references: the pointer plus the fingerprint of its compile-time type.
//! No ownership moves — the pointee's lifetime stays with the native
//! caller, and the VM never dereferences the pointer. Decoding under a
//! different type fails on the fingerprint check instead of handing back a
//! mistyped pointer.

use lariat_engine::{OpaqueRef, TypeTag, Value, Vm};

use crate::classify::Category;
use crate::convert::{FromStack, ToStack};
use crate::error::MarshalError;
use crate::registry::{fingerprint_of, short_name};

macro_rules! pointer_codec {
    ($($ptr:ty => $cast:ty),+) => {$(
        impl<T: 'static> ToStack for $ptr {
            const CATEGORY: Category = Category::OpaquePointer;

            fn push(self, vm: &mut Vm) {
                vm.push_value(Value::Opaque(OpaqueRef {
                    fingerprint: fingerprint_of::<T>(),
                    ptr: self as *mut (),
                }));
            }
        }

        impl<T: 'static> FromStack for $ptr {
            const CATEGORY: Category = Category::OpaquePointer;

            fn is(vm: &Vm, index: i32) -> bool {
                matches!(
                    vm.value_at(index),
                    Some(Value::Opaque(r)) if r.fingerprint == fingerprint_of::<T>()
                )
            }

            fn get(vm: &Vm, index: i32) -> Result<Self, MarshalError> {
                match vm.value_at(index) {
                    Some(Value::Opaque(r)) if r.fingerprint == fingerprint_of::<T>() => {
                        Ok(r.ptr as $cast as $ptr)
                    }
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
                short_name::<T>()
            }
        }
    )+};
}

pointer_codec!(*mut T => *mut T, *const T => *mut T);

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget {
        level: i32,
    }

    struct Gadget;

    #[test]
    fn pointer_round_trips_through_a_slot() {
        let mut widget = Widget { level: 7 };
        let ptr: *mut Widget = &mut widget;

        let mut vm = Vm::new();
        ptr.push(&mut vm);

        assert!(<*mut Widget>::is(&vm, 1));
        let back = <*mut Widget>::get(&vm, 1).unwrap();
        assert_eq!(back, ptr);
        assert_eq!(unsafe { (*back).level }, 7);
    }

    #[test]
    fn fingerprint_guards_against_type_confusion() {
        let mut widget = Widget { level: 0 };
        let ptr: *mut Widget = &mut widget;

        let mut vm = Vm::new();
        ptr.push(&mut vm);

        assert!(!<*mut Gadget>::is(&vm, 1));
        let err = <*mut Gadget>::get(&vm, 1).unwrap_err();
        assert_eq!(err.got, "userdata");
        assert_eq!(err.expected, "Gadget");
    }

    #[test]
    fn const_pointers_share_the_fingerprint() {
        let widget = Widget { level: 1 };
        let ptr: *const Widget = &widget;

        let mut vm = Vm::new();
        ptr.push(&mut vm);

        // mut and const views of the same pointee type interconvert
        assert!(<*const Widget>::is(&vm, 1));
        assert!(<*mut Widget>::is(&vm, 1));
        assert_eq!(<*const Widget>::get(&vm, 1).unwrap(), ptr);
    }

    #[test]
    fn non_pointer_slot_is_rejected() {
        let mut vm = Vm::new();
        vm.push_value(Value::Number(1.0));
        let err = <*mut Widget>::get(&vm, 1).unwrap_err();
        assert_eq!(err.got, "number");
        assert_eq!(err.expected, "Widget");
    }
}
