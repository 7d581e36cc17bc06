//! Type-erased values plus the "safe numeric cast" rules from the
//! blackboard's type-locking contract. Grounded on the
//! original engine's `downcast_ref::<T>()`-based blackboard values, extended
//! with the canonical-numeric-form trick so that casts between two
//! *different* arithmetic types can be checked without knowing either type
//! in advance.

use std::any::{Any, TypeId};
use std::fmt::Debug;

/// A numeric value reduced to one of three canonical forms, used to check
/// safe casts between arithmetic types that the blackboard doesn't know
/// about ahead of time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Canonical {
    Signed(i128),
    Unsigned(u128),
    Float(f64),
    Bool(bool),
}

/// Tries to reduce an erased value to its `Canonical` numeric form. Returns
/// `None` if `value`'s concrete type isn't one this crate treats as
/// arithmetic.
pub fn to_canonical(value: &dyn Any) -> Option<Canonical> {
    macro_rules! try_signed {
        ($($t:ty),*) => {
            $(if let Some(v) = value.downcast_ref::<$t>() {
                return Some(Canonical::Signed(*v as i128));
            })*
        };
    }
    macro_rules! try_unsigned {
        ($($t:ty),*) => {
            $(if let Some(v) = value.downcast_ref::<$t>() {
                return Some(Canonical::Unsigned(*v as u128));
            })*
        };
    }

    if let Some(v) = value.downcast_ref::<bool>() {
        return Some(Canonical::Bool(*v));
    }
    if let Some(v) = value.downcast_ref::<f32>() {
        return Some(Canonical::Float(*v as f64));
    }
    if let Some(v) = value.downcast_ref::<f64>() {
        return Some(Canonical::Float(*v));
    }
    try_signed!(i8, i16, i32, i64, i128, isize);
    try_unsigned!(u8, u16, u32, u64, u128, usize);

    None
}

/// Implemented by every arithmetic type the blackboard knows how to safely
/// cast into. `from_canonical` enforces a lossless-widening rule: widening
/// always succeeds, while narrowing that would overflow, truncate a
/// fractional part, or send a negative value into an unsigned target fails.
pub trait FromCanonical: Sized {
    /// Default is `None`: types with no sensible numeric interpretation
    /// (e.g. `String`) just opt in with an empty `impl` block and always
    /// miss this fallback, which is the desired behavior.
    fn from_canonical(_value: Canonical) -> Option<Self> {
        None
    }
}

impl FromCanonical for String {}

macro_rules! impl_from_canonical_signed {
    ($($t:ty),*) => {
        $(impl FromCanonical for $t {
            fn from_canonical(value: Canonical) -> Option<Self> {
                match value {
                    Canonical::Signed(v) => <$t>::try_from(v).ok(),
                    Canonical::Unsigned(v) => <$t>::try_from(v).ok(),
                    Canonical::Float(v) => {
                        if v.fract() != 0.0 {
                            return None;
                        }
                        if v < (<$t>::MIN as f64) || v > (<$t>::MAX as f64) {
                            return None;
                        }
                        Some(v as $t)
                    }
                    Canonical::Bool(v) => Some(v as $t),
                }
            }
        })*
    };
}

macro_rules! impl_from_canonical_unsigned {
    ($($t:ty),*) => {
        $(impl FromCanonical for $t {
            fn from_canonical(value: Canonical) -> Option<Self> {
                match value {
                    Canonical::Signed(v) => <$t>::try_from(v).ok(),
                    Canonical::Unsigned(v) => <$t>::try_from(v).ok(),
                    Canonical::Float(v) => {
                        if v.fract() != 0.0 || v < 0.0 {
                            return None;
                        }
                        if v > (<$t>::MAX as f64) {
                            return None;
                        }
                        Some(v as $t)
                    }
                    Canonical::Bool(v) => Some(v as $t),
                }
            }
        })*
    };
}

impl_from_canonical_signed!(i8, i16, i32, i64, i128, isize);
impl_from_canonical_unsigned!(u8, u16, u32, u64, u128, usize);

impl FromCanonical for f32 {
    fn from_canonical(value: Canonical) -> Option<Self> {
        match value {
            Canonical::Signed(v) => Some(v as f32),
            Canonical::Unsigned(v) => Some(v as f32),
            Canonical::Float(v) => Some(v as f32),
            Canonical::Bool(v) => Some(v as u8 as f32),
        }
    }
}

impl FromCanonical for f64 {
    fn from_canonical(value: Canonical) -> Option<Self> {
        match value {
            Canonical::Signed(v) => Some(v as f64),
            Canonical::Unsigned(v) => Some(v as f64),
            Canonical::Float(v) => Some(v),
            Canonical::Bool(v) => Some(v as u8 as f64),
        }
    }
}

impl FromCanonical for bool {
    fn from_canonical(value: Canonical) -> Option<Self> {
        match value {
            Canonical::Signed(v) => Some(v != 0),
            Canonical::Unsigned(v) => Some(v != 0),
            Canonical::Float(v) => Some(v != 0.0),
            Canonical::Bool(v) => Some(v),
        }
    }
}

/// The blackboard's "BT::Any" escape hatch. A port or entry
/// typed as `Dynamic` accepts a write of any `'static + Send` value without
/// going through the type-lock checks at all.
pub struct Dynamic(pub Box<dyn Any + Send>);

impl Debug for Dynamic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Dynamic").finish()
    }
}

impl Dynamic {
    pub fn new<T: Any + Send + 'static>(value: T) -> Self {
        Dynamic(Box::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

/// Helper for comparing a stored `TypeId` against `Dynamic`'s own type, used
/// by the blackboard to recognize the escape hatch regardless of the
/// generic parameter the caller used.
pub(crate) fn is_dynamic_type(id: TypeId) -> bool {
    id == TypeId::of::<Dynamic>()
}

/// Parses `value` into whichever locked type `type_id` names, so a `String`
/// write to an already-typed blackboard entry can go through that type's
/// `FromString` converter instead of being rejected outright. Returns `None`
/// if `type_id` isn't one of the types this crate knows how to parse a
/// string into (in which case the caller should treat it as a failed
/// conversion, not a silent no-op).
pub(crate) fn parse_string_into_locked(type_id: TypeId, value: &str) -> Option<Box<dyn Any + Send>> {
    macro_rules! try_type {
        ($($t:ty),*) => {
            $(if type_id == TypeId::of::<$t>() {
                return crate::basic_types::FromString::from_string(value)
                    .ok()
                    .map(|v: $t| Box::new(v) as Box<dyn Any + Send>);
            })*
        };
    }

    try_type!(bool, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);
    None
}
