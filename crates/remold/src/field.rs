//! Field annotations and resolution of struct targets into decode plans.
//!
//! Annotations use a small comma-separated mini-language in the value of a
//! namespace tag: `"<alias>[,<option>...]"`. The alias (possibly empty)
//! renames the field for matching and encoding; `-` removes the field
//! entirely. Recognized options are `squash`, `remain`, `omitempty`,
//! `omitzero`, and whatever extra name the decoder's `squash_option`
//! designates. Unknown options are ignored.
//!
//! Raw tag strings travel with every [`FieldSlot`] and record snapshot;
//! nothing is parsed at derive time, so the tag namespace and squash option
//! stay runtime-configurable.

use crate::error::DecodeErrorKind;
use crate::mold::{FieldSlot, Mold, OptionTarget, StructTarget, Target};
use crate::value::{Kind, MapEntry, Record, Value};

/// Parsed annotation of a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FieldOptions {
    /// Replacement name for matching and encoding.
    pub alias: Option<String>,

    /// Field removed from decoding and encoding.
    pub skip: bool,

    /// Flatten this struct-typed field into its parent.
    pub squash: bool,

    /// Collect source keys no other field matched.
    pub remain: bool,

    /// Encode: drop the field when its value is empty.
    pub omit_empty: bool,

    /// Encode: drop the field when it holds its declared zero value.
    pub omit_zero: bool,
}

/// Pick the raw tag for the given namespace.
pub(crate) fn select_tag<'t>(
    tags: &'t [(&'static str, &'static str)],
    tag_name: &str,
) -> Option<&'t str> {
    tags.iter()
        .find(|(ns, _)| *ns == tag_name)
        .map(|(_, raw)| *raw)
}

/// Parse one raw tag string.
pub(crate) fn parse_tag(raw: &str, squash_option: &str) -> FieldOptions {
    let mut parts = raw.split(',');
    let alias = parts.next().unwrap_or("");

    if alias == "-" {
        return FieldOptions {
            skip: true,
            ..FieldOptions::default()
        };
    }

    let mut opts = FieldOptions {
        alias: (!alias.is_empty()).then(|| alias.to_string()),
        ..FieldOptions::default()
    };
    for part in parts {
        if part == "squash" || part == squash_option {
            opts.squash = true;
        } else if part == "remain" {
            opts.remain = true;
        } else if part == "omitempty" {
            opts.omit_empty = true;
        } else if part == "omitzero" {
            opts.omit_zero = true;
        }
    }
    opts
}

/// The subset of decoder configuration resolution needs.
pub(crate) struct ResolveConfig<'c> {
    pub tag_name: &'c str,
    pub squash_option: &'c str,
    pub ignore_untagged: bool,
}

/// One matchable field of a flattened struct target.
pub(crate) struct BoundField<'a> {
    /// Effective name: alias if present, else the field identifier.
    pub name: String,

    /// Shape of the slot, captured before borrowing it as a target.
    pub shape: Kind,

    /// Writable slot.
    pub slot: &'a mut dyn Mold,
}

/// A struct target flattened into matchable fields.
pub(crate) struct DecodePlan<'a> {
    pub fields: Vec<BoundField<'a>>,
    /// Remainder slot with its effective name.
    pub remainder: Option<(String, &'a mut dyn Mold)>,
    /// Resolution problems, as (field identifier, error kind); the engine
    /// attaches path context.
    pub errors: Vec<(String, DecodeErrorKind)>,
}

/// Flatten a struct target according to its annotations. Squashed fields
/// splice their inner fields in place, depth first, in declaration order.
pub(crate) fn resolve<'a>(
    target: &'a mut dyn StructTarget,
    config: &ResolveConfig<'_>,
) -> DecodePlan<'a> {
    let mut plan = DecodePlan {
        fields: Vec::new(),
        remainder: None,
        errors: Vec::new(),
    };
    collect(target.fields(), config, &mut plan);
    plan
}

fn collect<'a>(slots: Vec<FieldSlot<'a>>, config: &ResolveConfig<'_>, plan: &mut DecodePlan<'a>) {
    for slot in slots {
        let raw = select_tag(slot.tags, config.tag_name);
        if raw.is_none() && config.ignore_untagged {
            continue;
        }
        let opts = raw
            .map(|r| parse_tag(r, config.squash_option))
            .unwrap_or_default();
        if opts.skip {
            continue;
        }

        if opts.squash {
            splice_squash(slot, config, plan);
            continue;
        }

        let name = opts.alias.unwrap_or_else(|| slot.name.to_string());

        if opts.remain {
            if plan.remainder.is_none() {
                plan.remainder = Some((name, slot.value));
            }
            continue;
        }

        let shape = slot.value.shape();
        plan.fields.push(BoundField {
            name,
            shape,
            slot: slot.value,
        });
    }
}

fn splice_squash<'a>(
    slot: FieldSlot<'a>,
    config: &ResolveConfig<'_>,
    plan: &mut DecodePlan<'a>,
) {
    let shape = slot.value.shape();
    match Mold::as_target(slot.value) {
        Target::Struct(inner) => collect(inner.fields(), config, plan),
        Target::Option(option) => {
            if option.inner_shape() == Kind::Struct {
                // Materialize eagerly so an absent embedded record still
                // contributes bindable fields.
                if let Target::Struct(inner) = Mold::as_target(OptionTarget::materialize(option)) {
                    collect(inner.fields(), config, plan);
                }
            } else {
                plan.errors.push((
                    slot.name.to_string(),
                    DecodeErrorKind::InvalidSquash {
                        found: option.inner_shape(),
                    },
                ));
            }
        }
        Target::Dynamic(Some(held)) => {
            let held_shape = held.shape();
            if let Target::Struct(inner) = Mold::as_target(held) {
                collect(inner.fields(), config, plan);
            } else {
                plan.errors.push((
                    slot.name.to_string(),
                    DecodeErrorKind::InvalidSquash { found: held_shape },
                ));
            }
        }
        // An empty dynamic slot has no fields to contribute.
        Target::Dynamic(None) => {}
        _ => {
            plan.errors.push((
                slot.name.to_string(),
                DecodeErrorKind::InvalidSquash { found: shape },
            ));
        }
    }
}

/// Apply annotations to a record snapshot, producing the entries it encodes
/// to: aliases applied, skipped fields dropped, squashed records spliced,
/// the remainder map flattened, `omitempty`/`omitzero` filtering done.
pub(crate) fn visible_entries(
    record: &Record,
    config: &ResolveConfig<'_>,
) -> (Vec<MapEntry>, Vec<(String, DecodeErrorKind)>) {
    let mut entries = Vec::new();
    let mut errors = Vec::new();
    collect_entries(record, config, &mut entries, &mut errors);
    (entries, errors)
}

fn collect_entries(
    record: &Record,
    config: &ResolveConfig<'_>,
    entries: &mut Vec<MapEntry>,
    errors: &mut Vec<(String, DecodeErrorKind)>,
) {
    for field in &record.fields {
        let raw = select_tag(field.tags, config.tag_name);
        if raw.is_none() && config.ignore_untagged {
            continue;
        }
        let opts = raw
            .map(|r| parse_tag(r, config.squash_option))
            .unwrap_or_default();
        if opts.skip {
            continue;
        }

        if opts.squash {
            match &field.value {
                Value::Record(inner) => collect_entries(inner, config, entries, errors),
                Value::Null => {}
                other => errors.push((
                    field.name.to_string(),
                    DecodeErrorKind::InvalidSquash {
                        found: other.kind(),
                    },
                )),
            }
            continue;
        }

        if opts.remain {
            match &field.value {
                Value::Map(flat) => entries.extend(flat.iter().cloned()),
                Value::Null => {}
                other => errors.push((
                    field.name.to_string(),
                    DecodeErrorKind::InvalidRemainder {
                        found: other.kind(),
                    },
                )),
            }
            continue;
        }

        if opts.omit_empty && field.value.is_empty_value() {
            continue;
        }
        if opts.omit_zero && field.zero {
            continue;
        }

        let name = opts.alias.unwrap_or_else(|| field.name.to_string());
        entries.push(MapEntry {
            key: Value::String(name),
            value: field.value.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_alias() {
        let opts = parse_tag("bar", "squash");
        assert_eq!(opts.alias.as_deref(), Some("bar"));
        assert!(!opts.skip && !opts.squash && !opts.remain);
    }

    #[test]
    fn test_parse_empty_tag_keeps_field_name() {
        let opts = parse_tag("", "squash");
        assert_eq!(opts.alias, None);
        assert!(!opts.skip);
    }

    #[test]
    fn test_parse_skip_marker() {
        assert!(parse_tag("-", "squash").skip);
        // A literal "-" alias only skips when it is the whole alias part.
        assert_eq!(parse_tag("-x", "squash").alias.as_deref(), Some("-x"));
    }

    #[test]
    fn test_parse_options_without_alias() {
        let opts = parse_tag(",squash", "squash");
        assert_eq!(opts.alias, None);
        assert!(opts.squash);

        let opts = parse_tag(",remain", "squash");
        assert!(opts.remain);
    }

    #[test]
    fn test_parse_alias_with_options() {
        let opts = parse_tag("extra,omitempty,omitzero", "squash");
        assert_eq!(opts.alias.as_deref(), Some("extra"));
        assert!(opts.omit_empty);
        assert!(opts.omit_zero);
    }

    #[test]
    fn test_parse_unknown_options_are_ignored() {
        let opts = parse_tag("bar,what,what", "squash");
        assert_eq!(opts.alias.as_deref(), Some("bar"));
        assert_eq!(
            opts,
            FieldOptions {
                alias: Some("bar".to_string()),
                ..FieldOptions::default()
            }
        );
    }

    #[test]
    fn test_parse_configured_squash_option() {
        let opts = parse_tag("addr,inline", "inline");
        assert!(opts.squash);
        // The literal name keeps working alongside the configured one.
        assert!(parse_tag(",squash", "inline").squash);
    }

    #[test]
    fn test_select_tag_by_namespace() {
        let tags: &[(&str, &str)] = &[("remold", "a"), ("json", "b,squash")];
        assert_eq!(select_tag(tags, "remold"), Some("a"));
        assert_eq!(select_tag(tags, "json"), Some("b,squash"));
        assert_eq!(select_tag(tags, "toml"), None);
    }
}
