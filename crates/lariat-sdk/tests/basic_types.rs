//! Scalar codecs through the typed facade.

use lariat_sdk::{
    slot_count_of, type_name_of, Category, FromStack, StackExt, ToStack, TypeTag, Vm,
};

#[test]
fn scalars_round_trip() {
    let mut vm = Vm::new();

    vm.push(true);
    vm.push(100u8);
    vm.push(-40000i32);
    vm.push(3.25f64);
    vm.push("some text");

    assert_eq!(vm.stack_size(), 5);
    assert_eq!(vm.get::<bool>(1), Ok(true));
    assert_eq!(vm.get::<u8>(2), Ok(100));
    assert_eq!(vm.get::<i32>(3), Ok(-40000));
    assert_eq!(vm.get::<f64>(4), Ok(3.25));
    assert_eq!(vm.get::<String>(5).unwrap(), "some text");
}

#[test]
fn negative_indices_decode_from_the_top() {
    let mut vm = Vm::new();
    vm.push(1i32);
    vm.push("top");

    assert!(vm.is::<String>(-1));
    assert!(vm.is::<i32>(-2));
    assert_eq!(vm.get::<String>(-1).unwrap(), "top");
}

#[test]
fn is_checks_never_mutate() {
    let mut vm = Vm::new();
    vm.push(5i16);

    assert!(vm.is::<i16>(1));
    assert!(vm.is::<f32>(1));
    assert!(!vm.is::<String>(1));
    assert!(!vm.is::<bool>(1));
    assert_eq!(vm.stack_size(), 1);
    assert_eq!(vm.type_tag(1), TypeTag::Number);
}

#[test]
fn integer_and_number_families_share_the_slot_format() {
    let mut vm = Vm::new();
    vm.push(7i8);

    // a narrow integer decodes under any numeric type
    assert_eq!(vm.get::<i64>(1), Ok(7));
    assert_eq!(vm.get::<f32>(1), Ok(7.0));
    assert_eq!(vm.get::<u16>(1), Ok(7));

    assert_eq!(<i8 as ToStack>::CATEGORY, Category::Integer);
    assert_eq!(<u16 as ToStack>::CATEGORY, Category::Integer);
    assert_eq!(<i64 as ToStack>::CATEGORY, Category::Number);
    assert_eq!(<u32 as ToStack>::CATEGORY, Category::Number);
    assert_eq!(<f64 as ToStack>::CATEGORY, Category::Number);
}

#[test]
fn mismatch_reports_got_and_expected() {
    let mut vm = Vm::new();
    vm.push("not a number");

    let err = vm.get::<i32>(1).unwrap_err();
    assert_eq!(err.got, "string");
    assert_eq!(err.expected, "integer");

    let err = vm.get::<u64>(1).unwrap_err();
    assert_eq!(err.expected, "number");

    let err = vm.get::<String>(9).unwrap_err();
    assert_eq!(err.got, "no value");
}

#[test]
fn diagnostic_names_and_footprints() {
    assert_eq!(type_name_of::<bool>(), "boolean");
    assert_eq!(type_name_of::<i32>(), "integer");
    assert_eq!(type_name_of::<u16>(), "integer");
    assert_eq!(type_name_of::<u32>(), "number");
    assert_eq!(type_name_of::<f64>(), "number");
    assert_eq!(type_name_of::<String>(), "string");

    assert_eq!(slot_count_of::<i32>(), 1);
    assert_eq!(slot_count_of::<()>(), 0);
    assert_eq!(<() as FromStack>::SLOT_COUNT, 0);
}
