//! Derived aggregates: field decomposition, structural checks, bridging.

use lariat_sdk::{Aggregate, FromStack, StackExt, ToStack, TypeTag, Vm};

#[derive(Aggregate, Debug, Clone, Copy, PartialEq)]
struct Vec2 {
    x: f32,
    y: f32,
}

#[derive(Aggregate, Debug, Clone, Copy, PartialEq)]
struct Vec3 {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Aggregate, Debug, Clone, PartialEq)]
struct Player {
    name: String,
    alive: bool,
    position: Vec2,
}

#[test]
fn fields_decompose_into_consecutive_slots() {
    let mut vm = Vm::new();
    vm.push(Vec2 { x: 10.0, y: 20.0 });

    assert_eq!(vm.stack_size(), 2);
    assert_eq!(vm.type_tag(1), TypeTag::Number);
    assert_eq!(vm.type_tag(2), TypeTag::Number);
    assert_eq!(vm.get::<f32>(1), Ok(10.0));
    assert_eq!(vm.get::<f32>(2), Ok(20.0));
}

#[test]
fn round_trip() {
    let mut vm = Vm::new();
    let v = Vec2 { x: 1.5, y: -2.5 };
    vm.push(v);

    assert!(vm.is::<Vec2>(1));
    assert_eq!(vm.get::<Vec2>(1), Ok(v));
}

#[test]
fn wider_aggregate_is_rejected_structurally() {
    let mut vm = Vm::new();
    vm.push(Vec2 { x: 1.0, y: 2.0 });

    // only two slots exist, Vec3 needs three
    assert!(!vm.is::<Vec3>(1));
    assert!(vm.get::<Vec3>(1).is_err());
}

#[test]
fn same_width_aggregate_with_different_fields_is_rejected() {
    #[derive(Aggregate)]
    struct Tagged {
        label: String,
        size: f32,
    }

    let mut vm = Vm::new();
    vm.push(Vec2 { x: 1.0, y: 2.0 });

    // same slot width, wrong field types
    assert!(!vm.is::<Tagged>(1));
    assert!(vm.is::<Vec2>(1));
}

#[test]
fn mismatched_field_fails_fast() {
    let mut vm = Vm::new();
    vm.push(1.0f32);
    vm.push("not a number");

    assert!(!vm.is::<Vec2>(1));
}

#[test]
fn nested_aggregates_flatten() {
    assert_eq!(<Player as Aggregate>::FIELD_COUNT, 3);
    assert_eq!(<Player as ToStack>::SLOT_COUNT, 4);

    let player = Player {
        name: "rook".to_string(),
        alive: true,
        position: Vec2 { x: 3.0, y: 4.0 },
    };

    let mut vm = Vm::new();
    vm.push(player.clone());
    assert_eq!(vm.stack_size(), 4);
    assert_eq!(vm.type_tag(1), TypeTag::String);
    assert_eq!(vm.type_tag(2), TypeTag::Boolean);

    assert!(vm.is::<Player>(1));
    assert_eq!(vm.get::<Player>(1), Ok(player));
}

#[test]
fn aggregates_bridge_as_multiple_slots() {
    let mut vm = Vm::new();
    vm.push_fn(|v: Vec2, scale: f32| Vec2 {
        x: v.x * scale,
        y: v.y * scale,
    });

    let scaled: Vec2 = vm.call((Vec2 { x: 1.0, y: 2.0 }, 10.0f32)).unwrap();
    assert_eq!(scaled, Vec2 { x: 10.0, y: 20.0 });
    assert_eq!(vm.stack_size(), 0);
}

#[test]
fn aggregate_results_come_back_decomposed() {
    let mut vm = Vm::new();
    vm.register("origin", || Vec2 { x: 0.0, y: 0.0 });

    assert_eq!(vm.execute("test", "return origin()"), Ok(2));
    assert_eq!(vm.stack_size(), 2);
    assert_eq!(vm.get::<Vec2>(1), Ok(Vec2 { x: 0.0, y: 0.0 }));
}

#[test]
fn type_name_is_the_struct_name() {
    assert_eq!(lariat_sdk::type_name_of::<Vec2>(), "Vec2");
}
