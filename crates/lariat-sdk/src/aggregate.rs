//! Aggregate marshalling.
//!
//! A plain struct with up to [`MAX_AGGREGATE_FIELDS`] named fields can
//! derive `Aggregate` and cross the boundary decomposed into consecutive
//! slots, one run of slots per field in declaration order. There is no
//! struct-level header on the stack: an aggregate of two numbers is
//! indistinguishable from two numbers pushed by hand, and `is` checks are
//! purely structural.
//!
//! Nested aggregates work by the same recursion: the slot footprint of a
//! field is whatever its own codec declares.

pub use lariat_derive::Aggregate;

/// Marker for derived aggregate types.
pub trait Aggregate {
    /// Number of declared fields. The slot footprint is the sum of the
    /// fields' footprints, which can exceed this when fields nest.
    const FIELD_COUNT: usize;
}

/// Upper bound on the number of fields a derived aggregate may declare.
/// Exceeding it is a compile error in the derive, not a runtime fault.
pub const MAX_AGGREGATE_FIELDS: usize = 10;

#[cfg(test)]
mod tests {
    use lariat_engine::{TypeTag, Value, Vm};

    use crate::classify::Category;
    use crate::convert::{FromStack, ToStack};
    use crate::error::MarshalError;

    // Hand-rolled impls mirroring what the derive expands to; the derive
    // itself is exercised by the integration tests.
    #[derive(Debug, PartialEq)]
    struct Pair {
        x: f32,
        y: f32,
    }

    impl super::Aggregate for Pair {
        const FIELD_COUNT: usize = 2;
    }

    impl ToStack for Pair {
        const CATEGORY: Category = Category::Aggregate;
        const SLOT_COUNT: usize = <f32 as ToStack>::SLOT_COUNT + <f32 as ToStack>::SLOT_COUNT;

        fn push(self, vm: &mut Vm) {
            self.x.push(vm);
            self.y.push(vm);
        }
    }

    impl FromStack for Pair {
        const CATEGORY: Category = Category::Aggregate;
        const SLOT_COUNT: usize =
            <f32 as FromStack>::SLOT_COUNT + <f32 as FromStack>::SLOT_COUNT;

        fn is(vm: &Vm, index: i32) -> bool {
            let Some(base) = vm.absolute(index) else {
                return false;
            };
            if base + <Self as FromStack>::SLOT_COUNT - 1 > vm.stack_size() {
                return false;
            }
            let mut cursor = base as i32;
            if !<f32 as FromStack>::is(vm, cursor) {
                return false;
            }
            cursor += <f32 as FromStack>::SLOT_COUNT as i32;
            <f32 as FromStack>::is(vm, cursor)
        }

        fn get(vm: &Vm, index: i32) -> Result<Self, MarshalError> {
            let base = vm
                .absolute(index)
                .ok_or_else(|| MarshalError::new(index, TypeTag::None.name(), Self::type_name()))?;
            let mut cursor = base as i32;
            let x = <f32 as FromStack>::get(vm, cursor)?;
            cursor += <f32 as FromStack>::SLOT_COUNT as i32;
            let y = <f32 as FromStack>::get(vm, cursor)?;
            Ok(Pair { x, y })
        }

        fn type_name() -> &'static str {
            "Pair"
        }
    }

    #[test]
    fn fields_land_in_consecutive_slots() {
        let mut vm = Vm::new();
        Pair { x: 10.0, y: 20.0 }.push(&mut vm);

        assert_eq!(vm.stack_size(), 2);
        assert!(matches!(vm.value_at(1), Some(Value::Number(n)) if *n == 10.0));
        assert!(matches!(vm.value_at(2), Some(Value::Number(n)) if *n == 20.0));
    }

    #[test]
    fn round_trip() {
        let mut vm = Vm::new();
        Pair { x: 1.5, y: -2.5 }.push(&mut vm);

        assert!(Pair::is(&vm, 1));
        assert_eq!(Pair::get(&vm, 1).unwrap(), Pair { x: 1.5, y: -2.5 });
    }

    #[test]
    fn is_fails_fast_on_a_wrong_field() {
        let mut vm = Vm::new();
        vm.push_value(Value::Number(1.0));
        vm.push_value(Value::str("oops"));

        assert!(!Pair::is(&vm, 1));
    }

    #[test]
    fn is_rejects_a_short_stack() {
        let mut vm = Vm::new();
        vm.push_value(Value::Number(1.0));

        // only one of the two required slots exists
        assert!(!Pair::is(&vm, 1));
        assert!(!Pair::is(&vm, 5));
    }
}
