//! Chunks that return callables, invoked natively with typed arguments.

use lariat_sdk::{StackExt, TypeTag, Vm};

#[test]
fn chunk_result_is_callable_with_typed_arguments() {
    let mut vm = Vm::new();
    assert_eq!(
        vm.execute("code", "return function(value) return value + 100 end"),
        Ok(1)
    );
    assert_eq!(vm.type_tag(-1), TypeTag::Function);

    let result: i32 = vm.call((100i32,)).unwrap();
    assert_eq!(result, 200);
    assert_eq!(vm.stack_size(), 0);
}

#[test]
fn string_results_copy_out() {
    let mut vm = Vm::new();
    assert_eq!(
        vm.execute("code", "return function(n) return 'value: ' .. n end"),
        Ok(1)
    );

    let result: String = vm.call((200i32,)).unwrap();
    assert_eq!(result, "value: 200");
}

#[test]
fn contexts_do_not_share_globals() {
    let mut a = Vm::new();
    let mut b = Vm::new();

    assert_eq!(a.execute("a", "x = 1\nreturn x"), Ok(1));
    assert_eq!(b.execute("b", "x = 2\nreturn x"), Ok(1));
    assert_eq!(a.get::<i32>(-1), Ok(1));
    assert_eq!(b.get::<i32>(-1), Ok(2));
}
