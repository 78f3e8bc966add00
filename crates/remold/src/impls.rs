//! [`Mold`] implementations for the standard shapes: scalars, strings,
//! sequences and byte vectors, string-keyed maps, options, boxes, dynamic
//! slots, and [`Value`] itself.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;

use crate::mold::{
    FloatTarget, IntTarget, MapTarget, Mold, OptionTarget, SeqTarget, Target, UintTarget,
};
use crate::value::{Kind, MapEntry, Value};

macro_rules! int_mold {
    ($($ty:ty => $variant:ident, $label:literal;)*) => {$(
        impl Mold for $ty {
            fn kind() -> Kind {
                Kind::Int
            }

            fn label() -> &'static str {
                $label
            }

            fn shape(&self) -> Kind {
                Kind::Int
            }

            fn type_label(&self) -> &'static str {
                $label
            }

            fn as_target(&mut self) -> Target<'_> {
                Target::Int(IntTarget::$variant(self))
            }

            #[allow(clippy::unnecessary_cast)]
            fn to_value(&self) -> Value {
                Value::Int(*self as i64)
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }
        }
    )*};
}

int_mold! {
    i8 => I8, "i8";
    i16 => I16, "i16";
    i32 => I32, "i32";
    i64 => I64, "i64";
    isize => Isize, "isize";
}

macro_rules! uint_mold {
    ($($ty:ty => $variant:ident, $label:literal, $bytes:literal;)*) => {$(
        impl Mold for $ty {
            fn kind() -> Kind {
                Kind::Uint
            }

            fn label() -> &'static str {
                $label
            }

            fn shape(&self) -> Kind {
                Kind::Uint
            }

            fn type_label(&self) -> &'static str {
                $label
            }

            fn as_target(&mut self) -> Target<'_> {
                Target::Uint(UintTarget::$variant(self))
            }

            #[allow(clippy::unnecessary_cast)]
            fn to_value(&self) -> Value {
                Value::Uint(*self as u64)
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }

            fn is_byte_scalar() -> bool {
                $bytes
            }
        }
    )*};
}

uint_mold! {
    u8 => U8, "u8", true;
    u16 => U16, "u16", false;
    u32 => U32, "u32", false;
    u64 => U64, "u64", false;
    usize => Usize, "usize", false;
}

macro_rules! float_mold {
    ($($ty:ty => $variant:ident, $label:literal;)*) => {$(
        impl Mold for $ty {
            fn kind() -> Kind {
                Kind::Float
            }

            fn label() -> &'static str {
                $label
            }

            fn shape(&self) -> Kind {
                Kind::Float
            }

            fn type_label(&self) -> &'static str {
                $label
            }

            fn as_target(&mut self) -> Target<'_> {
                Target::Float(FloatTarget::$variant(self))
            }

            fn to_value(&self) -> Value {
                Value::Float(f64::from(*self))
            }

            fn is_zero(&self) -> bool {
                *self == 0.0
            }
        }
    )*};
}

float_mold! {
    f32 => F32, "f32";
    f64 => F64, "f64";
}

impl Mold for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn label() -> &'static str {
        "bool"
    }

    fn shape(&self) -> Kind {
        Kind::Bool
    }

    fn type_label(&self) -> &'static str {
        "bool"
    }

    fn as_target(&mut self) -> Target<'_> {
        Target::Bool(self)
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

impl Mold for String {
    fn kind() -> Kind {
        Kind::String
    }

    fn label() -> &'static str {
        "String"
    }

    fn shape(&self) -> Kind {
        Kind::String
    }

    fn type_label(&self) -> &'static str {
        "String"
    }

    fn as_target(&mut self) -> Target<'_> {
        Target::String(self)
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Mold for Value {
    fn kind() -> Kind {
        Kind::Any
    }

    fn label() -> &'static str {
        "Value"
    }

    fn shape(&self) -> Kind {
        Kind::Any
    }

    fn type_label(&self) -> &'static str {
        "Value"
    }

    fn as_target(&mut self) -> Target<'_> {
        Target::Any(self)
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn is_zero(&self) -> bool {
        self.is_null()
    }
}

impl<T: Mold + Default> Mold for Vec<T> {
    fn kind() -> Kind {
        if T::is_byte_scalar() {
            Kind::Bytes
        } else {
            Kind::Seq
        }
    }

    fn label() -> &'static str {
        if T::is_byte_scalar() {
            "bytes"
        } else {
            "sequence"
        }
    }

    fn shape(&self) -> Kind {
        Self::kind()
    }

    fn type_label(&self) -> &'static str {
        Self::label()
    }

    fn as_target(&mut self) -> Target<'_> {
        Target::Seq(self)
    }

    fn to_value(&self) -> Value {
        if T::is_byte_scalar() {
            let bytes = self
                .iter()
                .map(|e| match e.to_value() {
                    Value::Uint(b) => b as u8,
                    _ => 0,
                })
                .collect();
            Value::Bytes(bytes)
        } else {
            Value::Seq(self.iter().map(Mold::to_value).collect())
        }
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Mold + Default> SeqTarget for Vec<T> {
    fn len(&self) -> usize {
        self.len()
    }

    fn slot(&mut self, index: usize) -> Option<&mut dyn Mold> {
        self.get_mut(index).map(|e| e as &mut dyn Mold)
    }

    fn push_default(&mut self) -> &mut dyn Mold {
        self.push(T::default());
        let index = self.len() - 1;
        &mut self[index]
    }

    fn truncate(&mut self, len: usize) {
        self.truncate(len);
    }

    fn wants_bytes(&self) -> bool {
        T::is_byte_scalar()
    }

    fn set_bytes(&mut self, bytes: &[u8]) {
        self.clear();
        for &byte in bytes {
            self.push(T::default());
            let index = self.len() - 1;
            if let Target::Uint(mut slot) = self[index].as_target() {
                let _ = slot.set(u64::from(byte));
            }
        }
    }
}

macro_rules! map_mold {
    ($($map:ident),*) => {$(
        impl<T: Mold + Default> Mold for $map<String, T> {
            fn kind() -> Kind {
                Kind::Map
            }

            fn label() -> &'static str {
                "map"
            }

            fn shape(&self) -> Kind {
                Kind::Map
            }

            fn type_label(&self) -> &'static str {
                "map"
            }

            fn as_target(&mut self) -> Target<'_> {
                Target::Map(self)
            }

            fn to_value(&self) -> Value {
                Value::Map(
                    self.iter()
                        .map(|(k, v)| MapEntry {
                            key: Value::String(k.clone()),
                            value: v.to_value(),
                        })
                        .collect(),
                )
            }

            fn is_zero(&self) -> bool {
                self.is_empty()
            }
        }

        impl<T: Mold + Default> MapTarget for $map<String, T> {
            fn len(&self) -> usize {
                self.len()
            }

            fn clear(&mut self) {
                self.clear();
            }

            fn slot(&mut self, key: String) -> &mut dyn Mold {
                let slot = self.entry(key).or_insert_with(T::default);
                *slot = T::default();
                slot
            }
        }
    )*};
}

map_mold!(HashMap, BTreeMap, IndexMap);

impl<T: Mold + Default> Mold for Option<T> {
    fn kind() -> Kind {
        Kind::Option
    }

    fn label() -> &'static str {
        "option"
    }

    fn shape(&self) -> Kind {
        Kind::Option
    }

    fn type_label(&self) -> &'static str {
        "option"
    }

    fn as_target(&mut self) -> Target<'_> {
        Target::Option(self)
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

impl<T: Mold + Default> OptionTarget for Option<T> {
    fn is_some(&self) -> bool {
        self.is_some()
    }

    fn materialize(&mut self) -> &mut dyn Mold {
        self.get_or_insert_with(T::default)
    }

    fn clear(&mut self) {
        *self = None;
    }

    fn inner_shape(&self) -> Kind {
        T::kind()
    }

    fn inner_label(&self) -> &'static str {
        T::label()
    }
}

impl<T: Mold> Mold for Box<T> {
    fn kind() -> Kind {
        T::kind()
    }

    fn label() -> &'static str {
        T::label()
    }

    fn shape(&self) -> Kind {
        (**self).shape()
    }

    fn type_label(&self) -> &'static str {
        (**self).type_label()
    }

    fn as_target(&mut self) -> Target<'_> {
        (**self).as_target()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn is_byte_scalar() -> bool {
        T::is_byte_scalar()
    }
}

impl Mold for Box<dyn Mold> {
    fn kind() -> Kind {
        Kind::Any
    }

    fn label() -> &'static str {
        "dynamic"
    }

    fn shape(&self) -> Kind {
        Kind::Any
    }

    fn type_label(&self) -> &'static str {
        "dynamic"
    }

    fn as_target(&mut self) -> Target<'_> {
        Target::Dynamic(Some(&mut **self))
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }
}

/// A dynamic slot that may be empty.
///
/// Holding a value, it decodes like the value itself: the engine writes into
/// the held concrete type. Empty, it cannot receive non-null input (there is
/// no type to build), and when squashed it contributes no fields.
#[derive(Default)]
pub struct Dyn(pub Option<Box<dyn Mold>>);

impl Dyn {
    /// An empty slot.
    pub fn empty() -> Self {
        Self(None)
    }

    /// A slot holding `value`.
    pub fn of(value: impl Mold + 'static) -> Self {
        Self(Some(Box::new(value)))
    }

    /// Borrow the held value.
    pub fn get(&self) -> Option<&dyn Mold> {
        self.0.as_deref()
    }
}

impl std::fmt::Debug for Dyn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(held) => f.debug_tuple("Dyn").field(&held.to_value()).finish(),
            None => f.write_str("Dyn(<empty>)"),
        }
    }
}

impl Mold for Dyn {
    fn kind() -> Kind {
        Kind::Any
    }

    fn label() -> &'static str {
        "dynamic"
    }

    fn shape(&self) -> Kind {
        Kind::Any
    }

    fn type_label(&self) -> &'static str {
        "dynamic"
    }

    fn as_target(&mut self) -> Target<'_> {
        match &mut self.0 {
            Some(held) => Target::Dynamic(Some(&mut **held)),
            None => Target::Dynamic(None),
        }
    }

    fn to_value(&self) -> Value {
        match &self.0 {
            Some(held) => held.to_value(),
            None => Value::Null,
        }
    }

    fn is_zero(&self) -> bool {
        self.0.is_none()
    }
}
