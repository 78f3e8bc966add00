//! The reflection seam between typed Rust values and the decode engine.
//!
//! Rust has no runtime reflection, so the engine works against [`Mold`], an
//! object-safe trait implemented by every decodable type. A mold reports its
//! shape, snapshots itself into a [`Value`], and — the part the engine
//! actually writes through — exposes a borrowed, width-erased view of itself
//! as a [`Target`].
//!
//! Composite shapes hand out further trait objects ([`StructTarget`],
//! [`SeqTarget`], [`MapTarget`], [`OptionTarget`]) so the engine can walk
//! arbitrarily nested targets without knowing any concrete type.

use crate::value::{Kind, Value};

/// A type the decode engine can read from and write into.
///
/// Implemented by `#[derive(Mold)]` for annotated structs and by this crate
/// for scalars, strings, byte vectors, sequences, string-keyed maps,
/// options, boxes, and [`Value`] itself.
pub trait Mold {
    /// Kind of target this type decodes as.
    fn kind() -> Kind
    where
        Self: Sized;

    /// Short type label for diagnostics and hook dispatch.
    fn label() -> &'static str
    where
        Self: Sized;

    /// Object-safe mirror of [`Mold::kind`].
    fn shape(&self) -> Kind;

    /// Object-safe mirror of [`Mold::label`].
    fn type_label(&self) -> &'static str;

    /// Borrow this value as a writable decode target.
    fn as_target(&mut self) -> Target<'_>;

    /// Snapshot this value into the loose value model.
    fn to_value(&self) -> Value;

    /// Whether this value equals its declared zero value.
    fn is_zero(&self) -> bool;

    /// Marker distinguishing byte vectors from other sequences. Only `u8`
    /// returns true.
    fn is_byte_scalar() -> bool
    where
        Self: Sized,
    {
        false
    }
}

/// A writable, width-erased view of a target value.
pub enum Target<'a> {
    /// Boolean slot.
    Bool(&'a mut bool),

    /// Signed integer slot of any width.
    Int(IntTarget<'a>),

    /// Unsigned integer slot of any width.
    Uint(UintTarget<'a>),

    /// Floating point slot.
    Float(FloatTarget<'a>),

    /// String slot.
    String(&'a mut String),

    /// Sequence target.
    Seq(&'a mut dyn SeqTarget),

    /// String-keyed map target.
    Map(&'a mut dyn MapTarget),

    /// Struct target with annotated fields.
    Struct(&'a mut dyn StructTarget),

    /// Optional target.
    Option(&'a mut dyn OptionTarget),

    /// Dynamic target: decode into whatever value it currently holds.
    /// `None` means the slot is empty and nothing can be decoded into it.
    Dynamic(Option<&'a mut dyn Mold>),

    /// Catch-all target that receives the converted value wholesale.
    Any(&'a mut Value),
}

/// A scalar did not fit the width of its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOverflow {
    /// Label of the slot's concrete type.
    pub type_label: &'static str,
}

/// Width-erased signed integer slot with checked assignment.
pub enum IntTarget<'a> {
    /// `i8` slot.
    I8(&'a mut i8),
    /// `i16` slot.
    I16(&'a mut i16),
    /// `i32` slot.
    I32(&'a mut i32),
    /// `i64` slot.
    I64(&'a mut i64),
    /// `isize` slot.
    Isize(&'a mut isize),
}

impl IntTarget<'_> {
    /// Store a value, failing when it does not fit the slot's width.
    pub fn set(&mut self, value: i64) -> Result<(), SlotOverflow> {
        let overflow = |type_label| SlotOverflow { type_label };
        match self {
            IntTarget::I8(slot) => **slot = i8::try_from(value).map_err(|_| overflow("i8"))?,
            IntTarget::I16(slot) => **slot = i16::try_from(value).map_err(|_| overflow("i16"))?,
            IntTarget::I32(slot) => **slot = i32::try_from(value).map_err(|_| overflow("i32"))?,
            IntTarget::I64(slot) => **slot = value,
            IntTarget::Isize(slot) => {
                **slot = isize::try_from(value).map_err(|_| overflow("isize"))?
            }
        }
        Ok(())
    }

    /// Current value widened to `i64`.
    pub fn get(&self) -> i64 {
        match self {
            IntTarget::I8(slot) => i64::from(**slot),
            IntTarget::I16(slot) => i64::from(**slot),
            IntTarget::I32(slot) => i64::from(**slot),
            IntTarget::I64(slot) => **slot,
            IntTarget::Isize(slot) => **slot as i64,
        }
    }

    /// Label of the slot's concrete type.
    pub fn type_label(&self) -> &'static str {
        match self {
            IntTarget::I8(_) => "i8",
            IntTarget::I16(_) => "i16",
            IntTarget::I32(_) => "i32",
            IntTarget::I64(_) => "i64",
            IntTarget::Isize(_) => "isize",
        }
    }
}

/// Width-erased unsigned integer slot with checked assignment.
pub enum UintTarget<'a> {
    /// `u8` slot.
    U8(&'a mut u8),
    /// `u16` slot.
    U16(&'a mut u16),
    /// `u32` slot.
    U32(&'a mut u32),
    /// `u64` slot.
    U64(&'a mut u64),
    /// `usize` slot.
    Usize(&'a mut usize),
}

impl UintTarget<'_> {
    /// Store a value, failing when it does not fit the slot's width.
    pub fn set(&mut self, value: u64) -> Result<(), SlotOverflow> {
        let overflow = |type_label| SlotOverflow { type_label };
        match self {
            UintTarget::U8(slot) => **slot = u8::try_from(value).map_err(|_| overflow("u8"))?,
            UintTarget::U16(slot) => **slot = u16::try_from(value).map_err(|_| overflow("u16"))?,
            UintTarget::U32(slot) => **slot = u32::try_from(value).map_err(|_| overflow("u32"))?,
            UintTarget::U64(slot) => **slot = value,
            UintTarget::Usize(slot) => {
                **slot = usize::try_from(value).map_err(|_| overflow("usize"))?
            }
        }
        Ok(())
    }

    /// Current value widened to `u64`.
    pub fn get(&self) -> u64 {
        match self {
            UintTarget::U8(slot) => u64::from(**slot),
            UintTarget::U16(slot) => u64::from(**slot),
            UintTarget::U32(slot) => u64::from(**slot),
            UintTarget::U64(slot) => **slot,
            UintTarget::Usize(slot) => **slot as u64,
        }
    }

    /// Label of the slot's concrete type.
    pub fn type_label(&self) -> &'static str {
        match self {
            UintTarget::U8(_) => "u8",
            UintTarget::U16(_) => "u16",
            UintTarget::U32(_) => "u32",
            UintTarget::U64(_) => "u64",
            UintTarget::Usize(_) => "usize",
        }
    }
}

/// Width-erased floating point slot.
pub enum FloatTarget<'a> {
    /// `f32` slot.
    F32(&'a mut f32),
    /// `f64` slot.
    F64(&'a mut f64),
}

impl FloatTarget<'_> {
    /// Store a value. Narrowing to `f32` rounds; floats have no overflow
    /// failure here, out-of-range magnitudes become infinities.
    pub fn set(&mut self, value: f64) {
        match self {
            FloatTarget::F32(slot) => **slot = value as f32,
            FloatTarget::F64(slot) => **slot = value,
        }
    }

    /// Current value widened to `f64`.
    pub fn get(&self) -> f64 {
        match self {
            FloatTarget::F32(slot) => f64::from(**slot),
            FloatTarget::F64(slot) => **slot,
        }
    }

    /// Label of the slot's concrete type.
    pub fn type_label(&self) -> &'static str {
        match self {
            FloatTarget::F32(_) => "f32",
            FloatTarget::F64(_) => "f64",
        }
    }
}

/// A struct exposing its annotated fields as writable slots.
pub trait StructTarget {
    /// Short name of the struct type.
    fn type_name(&self) -> &'static str;

    /// Borrow every field at once, in declaration order.
    fn fields(&mut self) -> Vec<FieldSlot<'_>>;
}

/// One writable struct field plus its declaration-site annotations.
pub struct FieldSlot<'a> {
    /// Rust field identifier.
    pub name: &'static str,

    /// Raw annotation strings, keyed by namespace.
    pub tags: &'static [(&'static str, &'static str)],

    /// The field itself.
    pub value: &'a mut dyn Mold,
}

/// A growable sequence of homogeneous elements.
pub trait SeqTarget {
    /// Current element count.
    fn len(&self) -> usize;

    /// Check for emptiness.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow an existing element.
    fn slot(&mut self, index: usize) -> Option<&mut dyn Mold>;

    /// Append a default element and borrow it.
    fn push_default(&mut self) -> &mut dyn Mold;

    /// Drop elements past `len`.
    fn truncate(&mut self, len: usize);

    /// Whether the element type is the byte scalar, enabling the wholesale
    /// byte path.
    fn wants_bytes(&self) -> bool {
        false
    }

    /// Replace the entire contents with raw bytes. Only called when
    /// [`SeqTarget::wants_bytes`] is true.
    fn set_bytes(&mut self, _bytes: &[u8]) {}
}

/// A string-keyed map of homogeneous values.
pub trait MapTarget {
    /// Current entry count.
    fn len(&self) -> usize;

    /// Check for emptiness.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry.
    fn clear(&mut self);

    /// Install a fresh default value under `key`, replacing any existing
    /// entry, and borrow it. Map decoding always builds elements from
    /// scratch; merging happens at the map level, not inside elements.
    fn slot(&mut self, key: String) -> &mut dyn Mold;
}

/// An optional value.
pub trait OptionTarget {
    /// Whether a value is present.
    fn is_some(&self) -> bool;

    /// Insert the default value if absent, then borrow the contents.
    /// Existing contents are kept, so decoding into `Some` merges.
    fn materialize(&mut self) -> &mut dyn Mold;

    /// Reset to `None`.
    fn clear(&mut self);

    /// Kind of the wrapped type.
    fn inner_shape(&self) -> Kind;

    /// Label of the wrapped type.
    fn inner_label(&self) -> &'static str;
}

/// Shape summary of a target, handed to hooks for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetShape {
    /// Kind of the target.
    pub kind: Kind,

    /// Label of the target's concrete type.
    pub type_label: &'static str,
}

impl TargetShape {
    /// Shape of a target value.
    pub fn of(target: &dyn Mold) -> Self {
        Self {
            kind: target.shape(),
            type_label: target.type_label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_target_checked_set() {
        let mut v: i8 = 0;
        let mut slot = IntTarget::I8(&mut v);

        assert!(slot.set(127).is_ok());
        assert_eq!(slot.get(), 127);

        let err = slot.set(128).unwrap_err();
        assert_eq!(err.type_label, "i8");
        // Failed stores leave the previous value in place.
        assert_eq!(v, 127);
    }

    #[test]
    fn test_uint_target_checked_set() {
        let mut v: u16 = 0;
        let mut slot = UintTarget::U16(&mut v);

        assert!(slot.set(65535).is_ok());
        assert!(slot.set(65536).is_err());
        assert_eq!(v, 65535);
    }

    #[test]
    fn test_float_target_narrowing() {
        let mut v: f32 = 0.0;
        let mut slot = FloatTarget::F32(&mut v);
        slot.set(2.5);
        assert_eq!(slot.type_label(), "f32");
        assert_eq!(slot.get(), 2.5);
        assert_eq!(v, 2.5);
    }
}
