//! User-supplied value transformations run before structural decoding.
//!
//! The decoder runs its configured [`Hook`] on every visited value node —
//! the root, each struct field, each sequence element, each map key and
//! value — before dispatching on the target's shape. The hook's output
//! replaces the source value, so a hook can rewrite scalars, synthesize
//! composites, or veto a node by returning an error. A hook that has nothing
//! to say returns its input unchanged.
//!
//! The [`hooks`] module carries the stock combinators and transformations.

use crate::error::DecodeError;
use crate::mold::TargetShape;
use crate::value::Value;

/// A pre-decode transformation stage.
pub trait Hook {
    /// Transform `value` on its way into a target of the given shape.
    fn run(&self, value: Value, target: &TargetShape) -> Result<Value, DecodeError>;
}

impl<F> Hook for F
where
    F: Fn(Value, &TargetShape) -> Result<Value, DecodeError>,
{
    fn run(&self, value: Value, target: &TargetShape) -> Result<Value, DecodeError> {
        self(value, target)
    }
}

/// Identity helper pinning a closure to the [`Hook`] calling convention, so
/// `Box::new(hook_fn(|value, target| ...))` coerces cleanly to
/// `Box<dyn Hook>`.
pub fn hook_fn<F>(f: F) -> F
where
    F: Fn(Value, &TargetShape) -> Result<Value, DecodeError>,
{
    f
}

/// Stock hooks.
pub mod hooks {
    use super::{hook_fn, DecodeError, Hook, Value};
    use crate::error::DecodeErrorKind;
    use crate::value::Kind;

    /// Run `stages` in order, each stage receiving the previous stage's
    /// output. The first error aborts the rest.
    pub fn compose(stages: Vec<Box<dyn Hook>>) -> impl Hook {
        hook_fn(move |mut value, target| {
            for stage in &stages {
                value = stage.run(value, target)?;
            }
            Ok(value)
        })
    }

    /// Return the first stage's success. When every stage fails, fail with
    /// the collected messages.
    pub fn first_success(stages: Vec<Box<dyn Hook>>) -> impl Hook {
        hook_fn(move |value: Value, target| {
            let mut messages = Vec::new();
            for stage in &stages {
                match stage.run(value.clone(), target) {
                    Ok(out) => return Ok(out),
                    Err(error) => messages.push(match error.kind() {
                        DecodeErrorKind::Hook { message } => message.clone(),
                        _ => error.message(),
                    }),
                }
            }
            Err(DecodeError::custom(messages.join("; ")))
        })
    }

    /// Split a string feeding a sequence target on `separator`. The empty
    /// string becomes the empty sequence, not one empty element.
    pub fn split_string(separator: impl Into<String>) -> impl Hook {
        let separator = separator.into();
        hook_fn(move |value, target| {
            if target.kind != Kind::Seq {
                return Ok(value);
            }
            let Value::String(s) = value else {
                return Ok(value);
            };
            if s.is_empty() {
                return Ok(Value::Seq(Vec::new()));
            }
            Ok(Value::Seq(
                s.split(separator.as_str())
                    .map(|part| Value::String(part.to_string()))
                    .collect(),
            ))
        })
    }

    /// Parse a string feeding a scalar target with the standard strict
    /// parsers. A failed parse is a hook error; non-string values and
    /// non-scalar targets pass through untouched.
    pub fn parse_scalar() -> impl Hook {
        hook_fn(|value, target| {
            let Value::String(s) = &value else {
                return Ok(value);
            };
            let cannot = |what: &str, err: &dyn std::fmt::Display| {
                DecodeError::custom(format!("cannot parse '{s}' as {what}: {err}"))
            };
            match target.kind {
                Kind::Bool => s
                    .parse::<bool>()
                    .map(Value::Bool)
                    .map_err(|e| cannot("bool", &e)),
                Kind::Int => s
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|e| cannot("int", &e)),
                Kind::Uint => s
                    .parse::<u64>()
                    .map(Value::Uint)
                    .map_err(|e| cannot("uint", &e)),
                Kind::Float => s
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|e| cannot("float", &e)),
                _ => Ok(value),
            }
        })
    }
}
