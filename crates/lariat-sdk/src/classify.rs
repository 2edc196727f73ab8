//! Marshalling categories.
//!
//! Every native type usable at the boundary resolves to exactly one
//! category through the `CATEGORY` constant on its codec impls. A type
//! with no impl has no category and is rejected at compile time by the
//! trait bounds on the facade and the call bridge — there is no runtime
//! fallback.

/// How a native type crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// `()` — occupies zero slots.
    Void,
    /// `bool` — one boolean slot.
    Boolean,
    /// Signed integers narrower than 64 bits and unsigned narrower than
    /// 32 bits; round-trip through the VM's unified number format.
    Integer,
    /// Floats, and integers at or above the wide thresholds.
    Number,
    /// String types; the codec copies bytes in both directions.
    Text,
    /// Non-owned pointers to native types, tagged with a fingerprint.
    OpaquePointer,
    /// Plain structs decomposed into consecutive slots, one per field.
    Aggregate,
    /// VM-resident callables and tables held by reference.
    Handle,
}

impl Category {
    /// Diagnostic name, matching what `type_name()` reports for scalars.
    pub const fn name(self) -> &'static str {
        match self {
            Category::Void => "nil",
            Category::Boolean => "boolean",
            Category::Integer => "integer",
            Category::Number => "number",
            Category::Text => "string",
            Category::OpaquePointer => "userdata",
            Category::Aggregate => "aggregate",
            Category::Handle => "handle",
        }
    }
}
