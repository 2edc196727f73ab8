//! The native→VM call bridge.
//!
//! `bridge` wraps an ordinary Rust function into a trampoline the VM can
//! invoke: a closure that decodes the frame's slots into the function's
//! parameter types, calls it, and encodes the result back. The stack
//! requirement — argument count and total slot footprint — is computed from
//! the parameter types as a constant, so a function whose signature uses an
//! unsupported type simply fails the trait bounds here and never compiles.
//!
//! Validation is all-or-nothing: the slot count is checked first, then each
//! parameter is tag-checked in order, and the wrapped function runs only
//! after every check passed. A rejected call leaves no observable effect
//! beyond the error.

use std::rc::Rc;

use lariat_engine::{NativeFn, RuntimeError, Vm};

use crate::convert::{FromStack, ToStack};

/// What a bridged function demands of the stack before it will run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallRequirement {
    /// Number of declared parameters.
    pub arguments: usize,
    /// Total slots those parameters decode from.
    pub slots: usize,
}

/// A tuple of encodable values, pushed left to right as call arguments.
pub trait ArgPack {
    /// Total slots the pack occupies once pushed.
    const SLOTS: usize;

    fn push_all(self, vm: &mut Vm);
}

/// A tuple of decodable values, read out of a call frame.
pub trait ParamPack: Sized {
    const REQUIREMENT: CallRequirement;

    /// Decode the whole frame, fail-fast and side-effect free.
    fn decode(vm: &Vm) -> Result<Self, RuntimeError>;
}

/// A function bridgeable at some arity. Implemented for `Fn` up to eight
/// parameters; `A` is the parameter tuple, `R` the result.
pub trait NativeFunction<A, R> {
    fn invoke(&self, args: A) -> R;
}

fn decode_param<T: FromStack>(
    vm: &Vm,
    cursor: &mut i32,
    ordinal: &mut usize,
    required: usize,
) -> Result<T, RuntimeError> {
    if !T::is(vm, *cursor) {
        return Err(RuntimeError::new(format!(
            "invalid argument {} (got: {} | expected: {}) -> stack (size: {} | required: {})",
            ordinal,
            vm.type_tag(*cursor).name(),
            T::type_name(),
            vm.stack_size(),
            required,
        )));
    }
    let value = T::get(vm, *cursor).map_err(|err| RuntimeError::new(err.to_string()))?;
    *cursor += T::SLOT_COUNT as i32;
    *ordinal += 1;
    Ok(value)
}

macro_rules! impl_packs {
    (@count) => { 0 };
    (@count $head:ident $($tail:ident)*) => { 1 + impl_packs!(@count $($tail)*) };
    ($($ty:ident),*) => {
        impl<$($ty: ToStack),*> ArgPack for ($($ty,)*) {
            const SLOTS: usize = 0 $(+ $ty::SLOT_COUNT)*;

            #[allow(non_snake_case)]
            fn push_all(self, vm: &mut Vm) {
                let ($($ty,)*) = self;
                let _ = &vm;
                $($ty.push(vm);)*
            }
        }

        impl<$($ty: FromStack),*> ParamPack for ($($ty,)*) {
            const REQUIREMENT: CallRequirement = CallRequirement {
                arguments: impl_packs!(@count $($ty)*),
                slots: 0 $(+ $ty::SLOT_COUNT)*,
            };

            #[allow(unused_variables, unused_mut)]
            fn decode(vm: &Vm) -> Result<Self, RuntimeError> {
                let mut cursor = 1i32;
                let mut ordinal = 1usize;
                Ok(($(
                    decode_param::<$ty>(vm, &mut cursor, &mut ordinal, Self::REQUIREMENT.slots)?,
                )*))
            }
        }

        impl<F, R, $($ty),*> NativeFunction<($($ty,)*), R> for F
        where
            F: Fn($($ty),*) -> R,
        {
            #[allow(non_snake_case)]
            fn invoke(&self, ($($ty,)*): ($($ty,)*)) -> R {
                self($($ty),*)
            }
        }
    };
}

impl_packs!();
impl_packs!(A1);
impl_packs!(A1, A2);
impl_packs!(A1, A2, A3);
impl_packs!(A1, A2, A3, A4);
impl_packs!(A1, A2, A3, A4, A5);
impl_packs!(A1, A2, A3, A4, A5, A6);
impl_packs!(A1, A2, A3, A4, A5, A6, A7);
impl_packs!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Wrap a Rust function as a VM trampoline.
///
/// The returned closure owns the function; the VM keeps it alive for as
/// long as the corresponding function value is reachable.
pub fn bridge<F, A, R>(f: F) -> NativeFn
where
    F: NativeFunction<A, R> + 'static,
    A: ParamPack + 'static,
    R: ToStack + 'static,
{
    Rc::new(move |vm: &mut Vm| {
        let required = A::REQUIREMENT;
        if vm.stack_size() != required.slots {
            return Err(RuntimeError::new(format!(
                "invalid arguments (expected: {} | stack size: {})",
                required.slots,
                vm.stack_size(),
            )));
        }
        let args = A::decode(vm)?;
        let result = f.invoke(args);
        result.push(vm);
        Ok(R::SLOT_COUNT)
    })
}
