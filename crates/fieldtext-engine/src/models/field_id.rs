//! Field identifiers and their persisted form.
//!
//! A field id is whatever the host application uses to tell fields apart:
//! an integer, a string, an enum, or a richer struct. The codec never looks
//! inside it; it only stores the [`FieldIdRepr`] the id hands out.
//!
//! Two encodings exist:
//!
//! - [`FieldIdRepr::Primitive`] - a type tag plus a textual value. Used by the
//!   implementations in this module for integers, `bool`, `char` and `String`,
//!   and by enums via [`FieldIdRepr::enum_variant`].
//! - [`FieldIdRepr::Structured`] - a single element with attributes, for ids
//!   that describe themselves.

use std::fmt::Debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldIdError {
    #[error("Expected field id of type {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("Invalid {type_name} value: {value:?}")]
    InvalidValue { type_name: String, value: String },
    #[error("Missing attribute {0} in structured field id")]
    MissingAttribute(String),
}

/// Encoded form of a field id, as stored inside a `FieldType` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldIdRepr {
    /// Generic encoding: enough type information to rebuild the value
    Primitive { type_name: String, value: String },
    /// Self-serialized id: one child element with its attributes, in order
    Structured {
        element: String,
        attributes: Vec<(String, String)>,
    },
}

impl FieldIdRepr {
    pub fn primitive(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        FieldIdRepr::Primitive {
            type_name: type_name.into(),
            value: value.into(),
        }
    }

    /// Generic encoding of a unit enum variant, tagged `enum:<enum_name>`.
    pub fn enum_variant(enum_name: &str, variant: &str) -> Self {
        FieldIdRepr::primitive(format!("enum:{enum_name}"), variant)
    }

    /// Value of a primitive encoding, after checking its type tag.
    pub fn expect_primitive(&self, expected: &str) -> Result<&str, FieldIdError> {
        match self {
            FieldIdRepr::Primitive { type_name, value } if type_name == expected => Ok(value),
            other => Err(FieldIdError::TypeMismatch {
                expected: expected.to_string(),
                found: other.type_label(),
            }),
        }
    }

    /// Variant name of an enum encoding produced by [`FieldIdRepr::enum_variant`].
    pub fn expect_enum_variant(&self, enum_name: &str) -> Result<&str, FieldIdError> {
        self.expect_primitive(&format!("enum:{enum_name}"))
    }

    /// Attribute lookup on a structured encoding with the given element name.
    pub fn structured_attribute(&self, element: &str, name: &str) -> Result<&str, FieldIdError> {
        match self {
            FieldIdRepr::Structured {
                element: found,
                attributes,
            } if found == element => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
                .ok_or_else(|| FieldIdError::MissingAttribute(name.to_string())),
            other => Err(FieldIdError::TypeMismatch {
                expected: format!("<{element}>"),
                found: other.type_label(),
            }),
        }
    }

    fn type_label(&self) -> String {
        match self {
            FieldIdRepr::Primitive { type_name, .. } => type_name.clone(),
            FieldIdRepr::Structured { element, .. } => format!("<{element}>"),
        }
    }
}

/// Identity of a field kind, as listed in a [`crate::FieldCatalog`].
///
/// Equality decides catalog lookups; `encode`/`decode` decide persistence.
pub trait FieldId: Clone + PartialEq + Debug {
    fn encode(&self) -> FieldIdRepr;

    fn decode(repr: &FieldIdRepr) -> Result<Self, FieldIdError>;
}

macro_rules! primitive_field_id {
    ($($ty:ty => $tag:literal),* $(,)?) => {
        $(
            impl FieldId for $ty {
                fn encode(&self) -> FieldIdRepr {
                    FieldIdRepr::primitive($tag, self.to_string())
                }

                fn decode(repr: &FieldIdRepr) -> Result<Self, FieldIdError> {
                    let value = repr.expect_primitive($tag)?;
                    value.trim().parse().map_err(|_| FieldIdError::InvalidValue {
                        type_name: $tag.to_string(),
                        value: value.to_string(),
                    })
                }
            }
        )*
    };
}

primitive_field_id! {
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    usize => "usize",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    bool => "bool",
}

impl FieldId for char {
    fn encode(&self) -> FieldIdRepr {
        FieldIdRepr::primitive("char", self.to_string())
    }

    fn decode(repr: &FieldIdRepr) -> Result<Self, FieldIdError> {
        let value = repr.expect_primitive("char")?;
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(FieldIdError::InvalidValue {
                type_name: "char".to_string(),
                value: value.to_string(),
            }),
        }
    }
}

// Strings are kept verbatim, surrounding whitespace included.
impl FieldId for String {
    fn encode(&self) -> FieldIdRepr {
        FieldIdRepr::primitive("string", self.clone())
    }

    fn decode(repr: &FieldIdRepr) -> Result<Self, FieldIdError> {
        repr.expect_primitive("string").map(str::to_string)
    }
}
