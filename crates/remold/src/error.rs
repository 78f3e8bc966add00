//! Path-qualified decode errors and their aggregate.
//!
//! Every recoverable problem is scoped to the field (or element, or map
//! entry) it occurred at and appended to a [`DecodeErrors`] aggregate while
//! decoding continues with siblings. The aggregate renders as a one-line
//! report header followed by one message per error.

use thiserror::Error;

use crate::value::Kind;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Named struct field.
    Field(String),

    /// Sequence index.
    Index(usize),

    /// Map key.
    Key(String),
}

/// Location of a node in the decode target, rendered dotted for fields and
/// bracketed for indices and map keys: `Vbar.Vstring`, `Emails[0]`,
/// `Extra[color]`. The root renders empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether no segments have been pushed.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Descend into a named field.
    pub fn push_field(&mut self, name: impl Into<String>) {
        self.segments.push(PathSegment::Field(name.into()));
    }

    /// Descend into a sequence element.
    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    /// Descend into a map entry.
    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    /// Leave the current segment.
    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Render the current location.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) => write!(f, "[{key}]")?,
            }
        }
        Ok(())
    }
}

/// What went wrong at one node.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeErrorKind {
    /// The source value's shape cannot feed the target type.
    UnconvertibleType {
        /// Label of the target type.
        expected: &'static str,
        /// Kind of the source value.
        found: Kind,
    },

    /// A string failed to parse into the target (weak mode).
    Parse {
        /// Label of the target type.
        target: &'static str,
        /// Parser diagnostic.
        message: String,
    },

    /// A numeric value does not fit the target's width or sign.
    OutOfRange {
        /// Rendering of the offending value.
        value: String,
        /// Label of the target type.
        target: &'static str,
    },

    /// `squash` on a field that is not a struct.
    InvalidSquash {
        /// Kind of the squashed field.
        found: Kind,
    },

    /// `remain` on a field that is not a map (encode direction).
    InvalidRemainder {
        /// Kind of the remainder field.
        found: Kind,
    },

    /// A struct target needs a map- or record-shaped source.
    ExpectedMap {
        /// Kind of the source value.
        found: Kind,
    },

    /// A sequence target needs a sequence source in strict mode.
    SourceMustBeSeq {
        /// Kind of the source value.
        found: Kind,
    },

    /// Non-null input for an empty dynamic slot.
    EmptyDynamic,

    /// Source keys no field matched, with `error_unused` set.
    UnusedKeys {
        /// The offending keys, sorted.
        keys: Vec<String>,
    },

    /// Fields no source key matched, with `error_unset` set.
    UnsetFields {
        /// The offending field names, sorted.
        fields: Vec<String>,
    },

    /// A hook reported failure.
    Hook {
        /// The hook's diagnostic.
        message: String,
    },
}

/// A decode problem scoped to one location.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct DecodeError {
    path: String,
    kind: DecodeErrorKind,
}

impl DecodeError {
    /// An error without location; the engine attaches one where it occurs.
    pub fn new(kind: DecodeErrorKind) -> Self {
        Self {
            path: String::new(),
            kind,
        }
    }

    /// A free-form error, for hook implementations.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(DecodeErrorKind::Hook {
            message: message.into(),
        })
    }

    /// Attach (or replace) the location.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Location this error occurred at. Empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// What went wrong.
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    /// Rendered message, location included.
    pub fn message(&self) -> String {
        let path = &self.path;
        match &self.kind {
            DecodeErrorKind::UnconvertibleType { expected, found } => {
                format!("'{path}' expected type '{expected}', got unconvertible type '{found}'")
            }
            DecodeErrorKind::Parse { target, message } => {
                format!("cannot parse '{path}' as {target}: {message}")
            }
            DecodeErrorKind::OutOfRange { value, target } => {
                format!("'{path}' value {value} overflows target type '{target}'")
            }
            DecodeErrorKind::InvalidSquash { found } => {
                format!("'{path}': unsupported type for squash: {found}")
            }
            DecodeErrorKind::InvalidRemainder { found } => {
                format!("'{path}': remainder field must be a map, got '{found}'")
            }
            DecodeErrorKind::ExpectedMap { found } => {
                format!("'{path}' expected a map, got '{found}'")
            }
            DecodeErrorKind::SourceMustBeSeq { found } => {
                format!("'{path}': source data must be a sequence, got '{found}'")
            }
            DecodeErrorKind::EmptyDynamic => {
                format!("'{path}' cannot decode into an empty dynamic target")
            }
            DecodeErrorKind::UnusedKeys { keys } => {
                format!("'{path}' has invalid keys: {}", keys.join(", "))
            }
            DecodeErrorKind::UnsetFields { fields } => {
                format!("'{path}' has unset fields: {}", fields.join(", "))
            }
            DecodeErrorKind::Hook { message } => {
                format!("error decoding '{path}': {message}")
            }
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Ordered aggregate of every recoverable error one decode produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct DecodeErrors {
    errors: Vec<DecodeError>,
}

impl DecodeErrors {
    pub(crate) fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub(crate) fn push(&mut self, error: DecodeError) {
        self.errors.push(error);
    }

    /// Number of collected errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate the collected errors in occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = &DecodeError> {
        self.errors.iter()
    }

    /// Take ownership of the collected errors.
    pub fn into_vec(self) -> Vec<DecodeError> {
        self.errors
    }

    pub(crate) fn into_result(self) -> Result<(), DecodeErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for DecodeErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "decoding failed due to the following error(s):")?;
        writeln!(f)?;
        let mut first = true;
        for error in &self.errors {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{}", error.message())?;
            first = false;
        }
        Ok(())
    }
}

impl From<DecodeError> for DecodeErrors {
    fn from(error: DecodeError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for DecodeErrors {
    type Item = DecodeError;
    type IntoIter = std::vec::IntoIter<DecodeError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_rendering() {
        let mut path = FieldPath::root();
        assert_eq!(path.render(), "");

        path.push_field("Vbar");
        assert_eq!(path.render(), "Vbar");

        path.push_field("Vstring");
        assert_eq!(path.render(), "Vbar.Vstring");

        path.pop();
        path.push_index(2);
        assert_eq!(path.render(), "Vbar[2]");

        path.push_key("color");
        assert_eq!(path.render(), "Vbar[2][color]");
    }

    #[test]
    fn test_bracket_segment_at_root() {
        let mut path = FieldPath::root();
        path.push_field("Emails");
        path.push_index(0);
        assert_eq!(path.render(), "Emails[0]");
    }

    #[test]
    fn test_unconvertible_message() {
        let error = DecodeError::new(DecodeErrorKind::UnconvertibleType {
            expected: "String",
            found: Kind::Int,
        })
        .with_path("Name");

        assert_eq!(
            error.message(),
            "'Name' expected type 'String', got unconvertible type 'int'"
        );
    }

    #[test]
    fn test_squash_message_names_the_problem() {
        let error = DecodeError::new(DecodeErrorKind::InvalidSquash { found: Kind::Int })
            .with_path("X.Value");

        assert!(error.message().contains("unsupported type for squash"));
    }

    #[test]
    fn test_unused_and_unset_messages() {
        let unused = DecodeError::new(DecodeErrorKind::UnusedKeys {
            keys: vec!["bar".to_string(), "foo".to_string()],
        });
        assert_eq!(unused.message(), "'' has invalid keys: bar, foo");

        let unset = DecodeError::new(DecodeErrorKind::UnsetFields {
            fields: vec!["Vbool".to_string()],
        })
        .with_path("Vbar");
        assert_eq!(unset.message(), "'Vbar' has unset fields: Vbool");
    }

    #[test]
    fn test_report_rendering() {
        let mut errors = DecodeErrors::new();
        errors.push(
            DecodeError::new(DecodeErrorKind::UnconvertibleType {
                expected: "String",
                found: Kind::Int,
            })
            .with_path("Name"),
        );
        errors.push(
            DecodeError::new(DecodeErrorKind::Parse {
                target: "i64",
                message: "invalid digit found in string".to_string(),
            })
            .with_path("Age"),
        );

        insta::assert_snapshot!(errors.to_string(), @r"
        decoding failed due to the following error(s):

        'Name' expected type 'String', got unconvertible type 'int'
        cannot parse 'Age' as i64: invalid digit found in string
        ");
    }
}
