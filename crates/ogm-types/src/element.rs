use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared element type of a property, array, or collection field.
///
/// The element type drives coercion of raw store values and selects the
/// character/string/enum special cases of collection hydration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Boolean,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    Long,
    Float,
    Double,
    Character,
    String,
    Enum(EnumType),
    /// A related domain object of the named type.
    Entity(String),
    /// No declared type; values pass through unchanged.
    Any,
}

impl ElementType {
    /// Returns `true` for [`ElementType::Character`].
    pub fn is_character(&self) -> bool {
        matches!(self, Self::Character)
    }

    /// Human-readable name, used in error messages and logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Character => "character",
            Self::String => "string",
            Self::Enum(e) => &e.name,
            Self::Entity(name) => name,
            Self::Any => "any",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Descriptor of a declared enumeration: its name and permitted variants.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    pub variants: Vec<String>,
}

impl EnumType {
    /// Enum type `name` with the given variant names.
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if `variant` is one of the declared variants.
    pub fn has_variant(&self, variant: &str) -> bool {
        self.variants.iter().any(|v| v == variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_variant_lookup() {
        let colour = EnumType::new("Colour", ["RED", "GREEN"]);
        assert!(colour.has_variant("RED"));
        assert!(!colour.has_variant("red"));
    }

    #[test]
    fn display_uses_declared_names() {
        assert_eq!(ElementType::Long.to_string(), "long");
        assert_eq!(ElementType::Entity("Person".into()).to_string(), "Person");
        assert_eq!(
            ElementType::Enum(EnumType::new("Colour", ["RED"])).to_string(),
            "Colour"
        );
    }

    #[test]
    fn serde_roundtrip() {
        let ty = ElementType::Enum(EnumType::new("Colour", ["RED", "GREEN"]));
        let json = serde_json::to_string(&ty).unwrap();
        let parsed: ElementType = serde_json::from_str(&json).unwrap();
        assert_eq!(ty, parsed);
    }
}
