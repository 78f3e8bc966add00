//! The decode engine.
//!
//! A single depth-first walk over a source [`Value`] and a target [`Mold`],
//! driven by the target's shape. Every node runs the null gate, then the
//! configured hook, then dispatches: scalars through the coercion table,
//! containers through the structural rules, structs through field
//! resolution. Recoverable problems never abort the walk; they accumulate in
//! a [`DecodeErrors`] aggregate and siblings keep decoding. Consumed,
//! unused, and unset paths land in a per-call [`Metadata`].

use crate::coerce::{self, Unfit};
use crate::error::{DecodeError, DecodeErrorKind, DecodeErrors, FieldPath};
use crate::field::{self, DecodePlan, ResolveConfig};
use crate::hook::Hook;
use crate::metadata::Metadata;
use crate::mold::{MapTarget, Mold, SeqTarget, StructTarget, Target, TargetShape};
use crate::value::{Kind, MapEntry, Value};

/// Predicate deciding whether a source key feeds a target field.
pub type MatchNameFn = Box<dyn Fn(&str, &str) -> bool>;

/// Decoder configuration, immutable for the lifetime of a decode call.
pub struct DecoderConfig {
    /// Annotation namespace read for aliases and options.
    pub tag_name: String,

    /// Extra option literal treated as `squash`.
    pub squash_option: String,

    /// Permit the lossy weak-mode conversions.
    pub weakly_typed: bool,

    /// Fail when a source key matches no field and no remainder absorbs it.
    pub error_unused: bool,

    /// Fail when a target field receives no source key.
    pub error_unset: bool,

    /// Exempt `Option`-typed fields from `error_unset`.
    pub allow_unset_option: bool,

    /// Zero targets before writing: containers are cleared instead of
    /// merged, and null input zeroes instead of preserving.
    pub zero_fields: bool,

    /// Deliver null values to the hook instead of short-circuiting.
    pub decode_nil: bool,

    /// Treat fields without a tag in the selected namespace as skipped.
    pub ignore_untagged_fields: bool,

    /// Key-to-field predicate. `None` means ASCII case-insensitive equality.
    pub match_name: Option<MatchNameFn>,

    /// Transformation run on every visited value node.
    pub hook: Option<Box<dyn Hook>>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            tag_name: "remold".to_string(),
            squash_option: "squash".to_string(),
            weakly_typed: false,
            error_unused: false,
            error_unset: false,
            allow_unset_option: false,
            zero_fields: false,
            decode_nil: false,
            ignore_untagged_fields: false,
            match_name: None,
            hook: None,
        }
    }
}

/// A configured decoder.
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Build a decoder from its configuration.
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// The configuration this decoder runs with.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode `source` into `target`.
    pub fn decode(&self, source: &dyn Mold, target: &mut dyn Mold) -> Result<(), DecodeErrors> {
        let mut metadata = Metadata::new();
        self.decode_with_metadata(source, target, &mut metadata)
    }

    /// Decode `source` into `target`, recording what was consumed, ignored,
    /// and left unset into `metadata`.
    pub fn decode_with_metadata(
        &self,
        source: &dyn Mold,
        target: &mut dyn Mold,
        metadata: &mut Metadata,
    ) -> Result<(), DecodeErrors> {
        let value = source.to_value();
        let mut engine = Engine {
            config: &self.config,
            path: FieldPath::root(),
            errors: DecodeErrors::new(),
            metadata,
        };
        engine.node(value, target);
        engine.errors.into_result()
    }
}

/// Decode `source` into `target` with the strict default configuration.
pub fn decode(source: &dyn Mold, target: &mut dyn Mold) -> Result<(), DecodeErrors> {
    Decoder::new(DecoderConfig::default()).decode(source, target)
}

/// Decode `source` into `target` with weak typing enabled.
pub fn weak_decode(source: &dyn Mold, target: &mut dyn Mold) -> Result<(), DecodeErrors> {
    let config = DecoderConfig {
        weakly_typed: true,
        ..DecoderConfig::default()
    };
    Decoder::new(config).decode(source, target)
}

/// Strict decode that also reports metadata.
pub fn decode_with_metadata(
    source: &dyn Mold,
    target: &mut dyn Mold,
    metadata: &mut Metadata,
) -> Result<(), DecodeErrors> {
    Decoder::new(DecoderConfig::default()).decode_with_metadata(source, target, metadata)
}

/// Weak decode that also reports metadata.
pub fn weak_decode_with_metadata(
    source: &dyn Mold,
    target: &mut dyn Mold,
    metadata: &mut Metadata,
) -> Result<(), DecodeErrors> {
    let config = DecoderConfig {
        weakly_typed: true,
        ..DecoderConfig::default()
    };
    Decoder::new(config).decode_with_metadata(source, target, metadata)
}

struct Engine<'c, 'm> {
    config: &'c DecoderConfig,
    path: FieldPath,
    errors: DecodeErrors,
    metadata: &'m mut Metadata,
}

impl Engine<'_, '_> {
    /// Decode one value node into one target. The recursive driver.
    fn node(&mut self, mut value: Value, target: &mut dyn Mold) {
        let config = self.config;

        if value.is_null() {
            if config.zero_fields {
                zero(target);
                self.record_key();
            }
            // Null short-circuits (preserving the target) unless the
            // configuration routes nulls through a hook.
            if !(config.decode_nil && config.hook.is_some()) {
                return;
            }
        }

        if let Some(hook) = config.hook.as_deref() {
            let shape = TargetShape::of(target);
            match hook.run(value, &shape) {
                Ok(out) => value = out,
                Err(error) => {
                    let path = self.path.render();
                    self.errors.push(error.with_path(path));
                    return;
                }
            }
        }

        // A null produced by the hook zeroes the target.
        if value.is_null() {
            zero(target);
            return;
        }

        let found = value.kind();
        let weak = config.weakly_typed;
        match target.as_target() {
            Target::Bool(slot) => match coerce::to_bool(&value, weak) {
                Ok(b) => {
                    *slot = b;
                    self.record_key();
                }
                Err(unfit) => self.unfit(unfit, "bool", found),
            },
            Target::Int(mut slot) => match coerce::to_int(&value, weak) {
                Ok(n) => match slot.set(n) {
                    Ok(()) => self.record_key(),
                    Err(overflow) => self.fail(DecodeErrorKind::OutOfRange {
                        value: n.to_string(),
                        target: overflow.type_label,
                    }),
                },
                Err(unfit) => {
                    let label = slot.type_label();
                    self.unfit(unfit, label, found);
                }
            },
            Target::Uint(mut slot) => match coerce::to_uint(&value, weak) {
                Ok(n) => match slot.set(n) {
                    Ok(()) => self.record_key(),
                    Err(overflow) => self.fail(DecodeErrorKind::OutOfRange {
                        value: n.to_string(),
                        target: overflow.type_label,
                    }),
                },
                Err(unfit) => {
                    let label = slot.type_label();
                    self.unfit(unfit, label, found);
                }
            },
            Target::Float(mut slot) => match coerce::to_float(&value, weak) {
                Ok(f) => {
                    slot.set(f);
                    self.record_key();
                }
                Err(unfit) => {
                    let label = slot.type_label();
                    self.unfit(unfit, label, found);
                }
            },
            Target::String(slot) => match coerce::to_string_value(&value, weak) {
                Ok(s) => {
                    *slot = s;
                    self.record_key();
                }
                Err(unfit) => self.unfit(unfit, "String", found),
            },
            Target::Seq(seq) => self.seq_node(value, seq),
            Target::Map(map) => self.map_node(value, map),
            Target::Struct(st) => self.struct_node(value, st),
            // Options materialize and re-enter; the hook sees the inner
            // shape too, matching the original's pointer behavior.
            Target::Option(opt) => {
                let inner = opt.materialize();
                self.node(value, inner);
            }
            Target::Dynamic(Some(held)) => self.node(value, held),
            Target::Dynamic(None) => self.fail(DecodeErrorKind::EmptyDynamic),
            Target::Any(slot) => {
                *slot = value;
                self.record_key();
            }
        }
    }

    fn seq_node(&mut self, value: Value, seq: &mut dyn SeqTarget) {
        let weak = self.config.weakly_typed;

        if seq.wants_bytes() {
            match &value {
                Value::Bytes(bytes) => {
                    seq.set_bytes(bytes);
                    self.record_key();
                    return;
                }
                Value::String(s) => {
                    seq.set_bytes(s.as_bytes());
                    self.record_key();
                    return;
                }
                other if weak => {
                    if let Ok(s) = coerce::to_string_value(other, true) {
                        seq.set_bytes(s.as_bytes());
                        self.record_key();
                        return;
                    }
                }
                _ => {}
            }
        }

        let items: Vec<Value> = match value {
            Value::Seq(items) => items,
            Value::Bytes(bytes) => bytes.into_iter().map(|b| Value::Uint(u64::from(b))).collect(),
            Value::Map(entries) if weak && entries.is_empty() => Vec::new(),
            Value::String(s) if weak && s.is_empty() => Vec::new(),
            // Weak mode lifts a lone scalar or map into a one-element
            // sequence.
            other if weak => vec![other],
            other => {
                self.fail(DecodeErrorKind::SourceMustBeSeq {
                    found: other.kind(),
                });
                return;
            }
        };

        if self.config.zero_fields {
            seq.truncate(items.len());
        }

        for (index, item) in items.into_iter().enumerate() {
            self.path.push_index(index);
            if index < seq.len() {
                if let Some(slot) = seq.slot(index) {
                    self.node(item, slot);
                }
            } else {
                let slot = seq.push_default();
                self.node(item, slot);
            }
            self.path.pop();
        }

        self.record_key();
    }

    fn map_node(&mut self, value: Value, map: &mut dyn MapTarget) {
        let config = self.config;

        let entries: Vec<MapEntry> = match value {
            Value::Map(entries) => entries,
            Value::Record(record) => {
                let rcfg = resolve_config(config);
                let (entries, errors) = field::visible_entries(&record, &rcfg);
                self.resolution_errors(errors);
                entries
            }
            // Weak mode merges a sequence of maps into the target,
            // element by element.
            Value::Seq(items) if config.weakly_typed => {
                if config.zero_fields {
                    map.clear();
                }
                for (index, item) in items.into_iter().enumerate() {
                    self.path.push_index(index);
                    match item {
                        Value::Map(entries) => self.map_entries(entries, map),
                        Value::Record(record) => {
                            let rcfg = resolve_config(config);
                            let (entries, errors) = field::visible_entries(&record, &rcfg);
                            self.resolution_errors(errors);
                            self.map_entries(entries, map);
                        }
                        other => self.fail(DecodeErrorKind::ExpectedMap {
                            found: other.kind(),
                        }),
                    }
                    self.path.pop();
                }
                self.record_key();
                return;
            }
            other => {
                self.fail(DecodeErrorKind::ExpectedMap {
                    found: other.kind(),
                });
                return;
            }
        };

        if config.zero_fields {
            map.clear();
        }
        self.map_entries(entries, map);
        self.record_key();
    }

    /// Merge entries into a map target: hook and stringify each key, then
    /// decode each value into a fresh element slot. Target keys absent from
    /// the source stay untouched.
    fn map_entries(&mut self, entries: Vec<MapEntry>, map: &mut dyn MapTarget) {
        let config = self.config;

        for entry in entries {
            let mut key_value = entry.key;
            if let Some(hook) = config.hook.as_deref() {
                let shape = TargetShape {
                    kind: Kind::String,
                    type_label: "String",
                };
                match hook.run(key_value, &shape) {
                    Ok(out) => key_value = out,
                    Err(error) => {
                        let path = self.path.render();
                        self.errors.push(error.with_path(path));
                        continue;
                    }
                }
            }

            let found = key_value.kind();
            let key = match coerce::to_string_value(&key_value, config.weakly_typed) {
                Ok(key) => key,
                Err(unfit) => {
                    self.unfit(unfit, "String", found);
                    continue;
                }
            };

            let slot = map.slot(key.clone());
            self.path.push_key(key);
            self.node(entry.value, slot);
            self.path.pop();
        }
    }

    fn struct_node(&mut self, value: Value, target: &mut dyn StructTarget) {
        let config = self.config;

        let entries: Vec<MapEntry> = match value {
            Value::Map(entries) => entries,
            Value::Record(record) => {
                let rcfg = resolve_config(config);
                let (entries, errors) = field::visible_entries(&record, &rcfg);
                self.resolution_errors(errors);
                entries
            }
            other => {
                self.fail(DecodeErrorKind::ExpectedMap {
                    found: other.kind(),
                });
                return;
            }
        };

        let rcfg = resolve_config(config);
        let DecodePlan {
            fields,
            remainder,
            errors,
        } = field::resolve(target, &rcfg);
        self.resolution_errors(errors);

        let mut used = vec![false; entries.len()];
        let mut unset_names: Vec<String> = Vec::new();

        for field in fields {
            let mut matched = false;
            for (index, entry) in entries.iter().enumerate() {
                let Some(key) = key_text(&entry.key) else {
                    continue;
                };
                if !self.matches(&key, &field.name) {
                    continue;
                }
                used[index] = true;
                matched = true;
                self.path.push_field(field.name.as_str());
                self.node(entry.value.clone(), field.slot);
                self.path.pop();
                break;
            }

            if !matched {
                self.path.push_field(field.name.as_str());
                let path = self.path.render();
                self.metadata.record_unset(path);
                self.path.pop();
                if !(config.allow_unset_option && field.shape == Kind::Option) {
                    unset_names.push(field.name);
                }
            }
        }

        let unmatched: Vec<MapEntry> = entries
            .into_iter()
            .zip(used)
            .filter_map(|(entry, was_used)| (!was_used).then_some(entry))
            .collect();

        if let Some((name, slot)) = remainder {
            if !unmatched.is_empty() {
                self.path.push_field(name.as_str());
                self.node(Value::Map(unmatched), slot);
                self.path.pop();
            }
        } else if !unmatched.is_empty() {
            let mut keys: Vec<String> = unmatched
                .iter()
                .map(|entry| {
                    key_text(&entry.key).unwrap_or_else(|| entry.key.kind().label().to_string())
                })
                .collect();
            for key in &keys {
                self.path.push_field(key.as_str());
                let path = self.path.render();
                self.metadata.record_unused(path);
                self.path.pop();
            }
            if config.error_unused {
                keys.sort();
                self.fail(DecodeErrorKind::UnusedKeys { keys });
            }
        }

        if config.error_unset && !unset_names.is_empty() {
            unset_names.sort();
            self.fail(DecodeErrorKind::UnsetFields {
                fields: unset_names,
            });
        }

        self.record_key();
    }

    fn matches(&self, key: &str, field: &str) -> bool {
        match &self.config.match_name {
            Some(matcher) => matcher(key, field),
            None => key.eq_ignore_ascii_case(field),
        }
    }

    fn record_key(&mut self) {
        if !self.path.is_root() {
            self.metadata.record_key(self.path.render());
        }
    }

    fn fail(&mut self, kind: DecodeErrorKind) {
        let path = self.path.render();
        self.errors.push(DecodeError::new(kind).with_path(path));
    }

    fn unfit(&mut self, unfit: Unfit, target: &'static str, found: Kind) {
        let kind = match unfit {
            Unfit::Unconvertible => DecodeErrorKind::UnconvertibleType {
                expected: target,
                found,
            },
            Unfit::Parse { message } => DecodeErrorKind::Parse { target, message },
            Unfit::OutOfRange { value } => DecodeErrorKind::OutOfRange { value, target },
        };
        self.fail(kind);
    }

    fn resolution_errors(&mut self, errors: Vec<(String, DecodeErrorKind)>) {
        for (name, kind) in errors {
            self.path.push_field(name.as_str());
            self.fail(kind);
            self.path.pop();
        }
    }
}

fn resolve_config(config: &DecoderConfig) -> ResolveConfig<'_> {
    ResolveConfig {
        tag_name: &config.tag_name,
        squash_option: &config.squash_option,
        ignore_untagged: config.ignore_untagged_fields,
    }
}

/// Reset a target to its zero state.
fn zero(target: &mut dyn Mold) {
    match target.as_target() {
        Target::Bool(slot) => *slot = false,
        Target::Int(mut slot) => {
            let _ = slot.set(0);
        }
        Target::Uint(mut slot) => {
            let _ = slot.set(0);
        }
        Target::Float(mut slot) => slot.set(0.0),
        Target::String(slot) => slot.clear(),
        Target::Seq(seq) => seq.truncate(0),
        Target::Map(map) => map.clear(),
        Target::Struct(st) => {
            for slot in st.fields() {
                zero(slot.value);
            }
        }
        Target::Option(opt) => opt.clear(),
        Target::Dynamic(Some(held)) => zero(held),
        Target::Dynamic(None) => {}
        Target::Any(slot) => *slot = Value::Null,
    }
}

/// Render a struct-source key for name matching. Composite keys have no
/// rendering and can only reach a remainder field.
fn key_text(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(s) => Some(s.clone()),
        Value::Int(n) => Some(n.to_string()),
        Value::Uint(n) => Some(n.to_string()),
        Value::Float(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DecoderConfig::default();
        assert_eq!(config.tag_name, "remold");
        assert_eq!(config.squash_option, "squash");
        assert!(!config.weakly_typed);
        assert!(config.hook.is_none());
    }

    #[test]
    fn test_scalar_identity_decode() {
        let mut target = 0i64;
        decode(&Value::Int(42), &mut target).unwrap();
        assert_eq!(target, 42);
    }

    #[test]
    fn test_null_preserves_target_by_default() {
        let mut target = "keep".to_string();
        decode(&Value::Null, &mut target).unwrap();
        assert_eq!(target, "keep");
    }

    #[test]
    fn test_null_zeroes_with_zero_fields() {
        let config = DecoderConfig {
            zero_fields: true,
            ..DecoderConfig::default()
        };
        let mut target = "gone".to_string();
        Decoder::new(config).decode(&Value::Null, &mut target).unwrap();
        assert_eq!(target, "");
    }

    #[test]
    fn test_zero_resets_every_shape() {
        let mut b = true;
        zero(&mut b);
        assert!(!b);

        let mut v = vec![1i64, 2];
        zero(&mut v);
        assert!(v.is_empty());

        let mut o = Some(5i64);
        zero(&mut o);
        assert!(o.is_none());

        let mut any = Value::Int(9);
        zero(&mut any);
        assert!(any.is_null());
    }

    #[test]
    fn test_root_scalar_never_lands_in_keys() {
        let mut metadata = Metadata::new();
        let mut target = 0i64;
        decode_with_metadata(&Value::Int(1), &mut target, &mut metadata).unwrap();
        assert!(metadata.keys.is_empty());
    }

    #[test]
    fn test_key_text_renders_scalar_keys_only() {
        assert_eq!(key_text(&Value::String("a".to_string())), Some("a".to_string()));
        assert_eq!(key_text(&Value::Int(3)), Some("3".to_string()));
        assert_eq!(key_text(&Value::Bool(true)), Some("true".to_string()));
        assert_eq!(key_text(&Value::Seq(vec![])), None);
    }
}
