//! Type fingerprints for opaque pointers.
//!
//! Every native type carried as an opaque pointer gets a process-local
//! `u32` identity, handed out lazily from a monotonic counter keyed by
//! `TypeId`. Fingerprints mean nothing across processes or builds; they
//! exist only so a decode can refuse a pointer pushed under a different
//! compile-time type.

use std::any::{type_name, TypeId};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

static FINGERPRINTS: Lazy<Mutex<FxHashMap<TypeId, u32>>> =
    Lazy::new(|| Mutex::new(FxHashMap::default()));

/// The fingerprint of `T`, allocating one on first use.
///
/// Stable for the lifetime of the process: every call with the same `T`
/// returns the same value, and distinct types never collide.
pub fn fingerprint_of<T: 'static>() -> u32 {
    let mut map = FINGERPRINTS.lock();
    let next = map.len() as u32 + 1;
    *map.entry(TypeId::of::<T>()).or_insert(next)
}

/// The unqualified name of `T`, for diagnostics.
pub fn short_name<T>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
