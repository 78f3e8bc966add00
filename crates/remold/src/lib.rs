//! Decode loosely typed values into annotated Rust structs, and back.
//!
//! `remold` populates statically declared types from the kind of dynamic
//! tree that deserializing JSON, YAML, or TOML produces — nested maps,
//! sequences, and scalars — without per-field assignment code. The engine
//! resolves struct fields through a small tag mini-language (aliases,
//! `squash` flattening, `remain` collection, `omitempty`/`omitzero`),
//! converts scalars through a strict or weakly typed rule table, runs a
//! user-supplied hook pipeline on every value node, aggregates
//! path-qualified errors instead of stopping at the first one, and reports
//! which source keys were consumed, ignored, or left target fields unset.
//!
//! The reverse direction uses the same engine: decoding an annotated struct
//! into a map target applies the tags and produces the struct's loose
//! representation.
//!
//! ```
//! use remold::{decode, MapEntry, Mold, Value};
//!
//! #[derive(Default, Mold)]
//! struct Person {
//!     name: String,
//!     age: i64,
//! }
//!
//! let source = Value::Map(vec![
//!     MapEntry::new("name", "Mitchell"),
//!     MapEntry::new("age", 91i64),
//! ]);
//!
//! let mut person = Person::default();
//! decode(&source, &mut person).unwrap();
//! assert_eq!(person.name, "Mitchell");
//! assert_eq!(person.age, 91);
//! ```

mod coerce;
mod decoder;
mod error;
mod field;
mod hook;
mod impls;
mod json;
mod metadata;
mod mold;
mod value;

pub use decoder::{
    decode, decode_with_metadata, weak_decode, weak_decode_with_metadata, Decoder, DecoderConfig,
    MatchNameFn,
};
pub use error::{DecodeError, DecodeErrorKind, DecodeErrors, FieldPath, PathSegment};
pub use hook::{hook_fn, hooks, Hook};
pub use impls::Dyn;
pub use metadata::Metadata;
pub use mold::{
    FieldSlot, FloatTarget, IntTarget, MapTarget, Mold, OptionTarget, SeqTarget, SlotOverflow,
    StructTarget, Target, TargetShape, UintTarget,
};
pub use value::{Kind, MapEntry, Record, RecordField, Value};

pub use remold_derive::Mold;
