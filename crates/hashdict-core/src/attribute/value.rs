//! Typed access to attribute maps.

use bytes::Bytes;

use super::map::{AttributeMap, ValueMap};
use crate::types::{Decimal128, Decimal32, Decimal64, Value};

mod private {
    pub trait Sealed {}
}

/// A Rust type that typed getters can return.
///
/// Implemented for every storable kind: `u8`..`u128`, `i8`..`i64`, `f32`,
/// `f64`, [`Decimal32`], [`Decimal64`], [`Decimal128`] and `String`. Decimal
/// getters return the raw scaled integer; the scale is part of the
/// attribute type.
pub trait AttributeValue: private::Sealed + Clone + Send + Sync + 'static {
    /// Representation inside the map.
    type Stored;

    /// Name used in type-mismatch errors.
    const TYPE_NAME: &'static str;

    /// Selects the matching map instantiation, if the attribute has this type.
    fn map(map: &AttributeMap) -> Option<&ValueMap<Self::Stored>>;

    /// Converts a stored value to the output representation.
    fn from_stored(stored: &Self::Stored) -> Self;

    /// Extracts a value of this type from a dynamic value.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_primitive_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl private::Sealed for $ty {}

            impl AttributeValue for $ty {
                type Stored = $ty;

                const TYPE_NAME: &'static str = stringify!($variant);

                fn map(map: &AttributeMap) -> Option<&ValueMap<$ty>> {
                    match map {
                        AttributeMap::$variant(m) => Some(m),
                        _ => None,
                    }
                }

                fn from_stored(stored: &$ty) -> Self {
                    *stored
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! impl_decimal_value {
    ($($ty:ident),* $(,)?) => {
        $(
            impl private::Sealed for $ty {}

            impl AttributeValue for $ty {
                type Stored = $ty;

                const TYPE_NAME: &'static str = stringify!($ty);

                fn map(map: &AttributeMap) -> Option<&ValueMap<$ty>> {
                    match map {
                        AttributeMap::$ty(m) => Some(m),
                        _ => None,
                    }
                }

                fn from_stored(stored: &$ty) -> Self {
                    *stored
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$ty(v, _) => Some(*v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_primitive_value!(
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    u128 => UInt128,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
);

impl_decimal_value!(Decimal32, Decimal64, Decimal128);

impl private::Sealed for String {}

impl AttributeValue for String {
    type Stored = Bytes;

    const TYPE_NAME: &'static str = "String";

    fn map(map: &AttributeMap) -> Option<&ValueMap<Bytes>> {
        match map {
            AttributeMap::String(m) => Some(m),
            _ => None,
        }
    }

    fn from_stored(stored: &Bytes) -> Self {
        String::from_utf8_lossy(stored).into_owned()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}
