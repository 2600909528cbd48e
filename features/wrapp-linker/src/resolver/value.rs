use std::{any::type_name, sync::Arc};

use crate::{errors::DefaultError, resolver::SlotValue, slot::ViewValue, types::TypeInfo};

/// Primitive slots are filled with a copy of a registered value, or parsed from a default literal
macro_rules! literal_values {
    ($($ty:ty),* $(,)?) => {$(
        impl SlotValue for $ty {
            fn provided_by() -> TypeInfo {
                TypeInfo::of::<$ty>()
            }

            fn from_view(view: ViewValue) -> Option<Self> {
                view.downcast::<Arc<$ty>>().ok().map(|value| **value)
            }

            fn from_literal(literal: &str) -> Result<Self, DefaultError> {
                literal
                    .trim()
                    .parse::<$ty>()
                    .map_err(|error| DefaultError::Parse {
                        slot_type: type_name::<$ty>(),
                        reason: error.to_string(),
                    })
            }
        }
    )*};
}

literal_values!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool
);

/// Strings take the default literal verbatim
impl SlotValue for String {
    fn provided_by() -> TypeInfo {
        TypeInfo::of::<String>()
    }

    fn from_view(view: ViewValue) -> Option<Self> {
        view.downcast::<Arc<String>>()
            .ok()
            .map(|value| String::clone(&value))
    }

    fn from_literal(literal: &str) -> Result<Self, DefaultError> {
        Ok(literal.to_string())
    }
}
