//! The two codec traits every boundary type implements.
//!
//! A type usable at the boundary implements `ToStack` (native → slots),
//! `FromStack` (slots → native), or both. The associated constants make a
//! type's category and slot footprint available at compile time, which is
//! what lets the call bridge compute its stack requirement as a constant
//! and reject unsupported types before anything runs.

use lariat_engine::Vm;

use crate::classify::Category;
use crate::error::MarshalError;

/// Encode a native value into stack slots.
pub trait ToStack {
    /// Marshalling category this type resolves to.
    const CATEGORY: Category;

    /// How many slots one value occupies. Scalars take one, `()` takes
    /// zero, aggregates take one per field, recursively.
    const SLOT_COUNT: usize = 1;

    /// Push the value onto the current frame, appending exactly
    /// `SLOT_COUNT` slots.
    fn push(self, vm: &mut Vm);
}

/// Decode a native value from stack slots.
pub trait FromStack: Sized {
    const CATEGORY: Category;
    const SLOT_COUNT: usize = 1;

    /// Whether the slot(s) starting at `index` would decode as `Self`.
    /// A cheap tag inspection; no value is constructed and nothing on the
    /// stack changes.
    fn is(vm: &Vm, index: i32) -> bool;

    /// Decode from the slot(s) starting at `index`. Does not consume the
    /// slots; popping is the caller's decision.
    fn get(vm: &Vm, index: i32) -> Result<Self, MarshalError>;

    /// Name used for this type in mismatch diagnostics.
    fn type_name() -> &'static str;
}

/// Diagnostic name of a decodable type.
pub fn type_name_of<T: FromStack>() -> &'static str {
    T::type_name()
}

/// Slot footprint of an encodable type.
pub const fn slot_count_of<T: ToStack>() -> usize {
    T::SLOT_COUNT
}
