//! Operations and their attributes.
//!
//! An [`Op`] names the kind of computation a node performs (its op type) and
//! carries a sorted attribute map. Attribute keys are sorted so that graph
//! dumps and comparisons are deterministic.

use std::collections::BTreeMap;
use std::fmt;

/// A single typed attribute value on an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Ints(Vec<i64>),
    Float(f32),
    Floats(Vec<f32>),
    Str(String),
}

impl AttrValue {
    /// The integer payload, if this attribute is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The integer-list payload, if this attribute is an `Ints`.
    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            AttrValue::Ints(v) => Some(v),
            _ => None,
        }
    }

    /// The float payload, if this attribute is a `Float`.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The string payload, if this attribute is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Ints(v) => {
                write!(f, "[")?;
                for (i, x) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", x)?;
                }
                write!(f, "]")
            }
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Floats(v) => {
                write!(f, "[")?;
                for (i, x) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", x)?;
                }
                write!(f, "]")
            }
            AttrValue::Str(v) => write!(f, "{:?}", v),
        }
    }
}

/// One operation: an op-type identifier plus its attributes.
///
/// The op type is the identifier conversion passes dispatch on. Attributes
/// are open-ended; each pass validates the ones it consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct Op {
    /// Op-type identifier (for example `"Conv"` or, after lowering, `"conv2d"`).
    pub ty: String,
    /// Attribute map, sorted by key.
    pub attrs: BTreeMap<String, AttrValue>,
}

impl Op {
    /// Create an operation with no attributes.
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            attrs: BTreeMap::new(),
        }
    }

    /// Builder-style attribute insertion.
    pub fn with_attr(mut self, key: impl Into<String>, value: AttrValue) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    /// Look up an attribute by key.
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Insert or replace an attribute.
    pub fn set_attr(&mut self, key: impl Into<String>, value: AttrValue) {
        self.attrs.insert(key.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_accessors_reject_wrong_kind() {
        let op = Op::new("Conv")
            .with_attr("group", AttrValue::Int(1))
            .with_attr("kernel_shape", AttrValue::Ints(vec![3, 3]));

        assert_eq!(op.attr("group").and_then(AttrValue::as_int), Some(1));
        assert_eq!(op.attr("group").and_then(AttrValue::as_ints), None);
        assert_eq!(
            op.attr("kernel_shape").and_then(AttrValue::as_ints),
            Some(&[3, 3][..])
        );
        assert!(op.attr("missing").is_none());
    }

    #[test]
    fn attr_display_is_stable() {
        assert_eq!(AttrValue::Ints(vec![1, 2, 3]).to_string(), "[1, 2, 3]");
        assert_eq!(AttrValue::Str("max".into()).to_string(), "\"max\"");
        assert_eq!(AttrValue::Int(-4).to_string(), "-4");
    }
}
