//! Raw values as read from the store, before normalization.
//!
//! A store read does not always yield a ready-made sequence of [`Value`]s.
//! Array properties arrive as primitive arrays, character arrays are stored
//! as a single string or as an array of one-character strings, and so on.
//! [`RawValues::normalize`] turns every such form into an ordered sequence.

use ogm_types::{CoercionError, Container, ElementType, Value};

use crate::error::MergeResult;

/// The "new" side of a merge, in the form the store produced it.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RawValues {
    /// Nothing was read.
    #[default]
    Absent,
    Values(Vec<Value>),
    Booleans(Vec<bool>),
    Integers(Vec<i32>),
    Longs(Vec<i64>),
    Floats(Vec<f32>),
    Doubles(Vec<f64>),
    Characters(Vec<char>),
    /// A single string.
    Text(String),
    /// An array of strings.
    Strings(Vec<String>),
}

impl RawValues {
    /// Normalize into an ordered sequence of values.
    ///
    /// - primitive arrays are boxed element-wise;
    /// - `Text` is exploded into characters when the element type is
    ///   `Character`, and is a single string element otherwise;
    /// - `Strings` yields the first character of each string when the
    ///   element type is `Character` (an empty string is a coercion
    ///   failure), and string elements otherwise.
    pub fn normalize(self, element_type: &ElementType) -> MergeResult<Vec<Value>> {
        let values = match self {
            Self::Absent => Vec::new(),
            Self::Values(v) => v,
            Self::Booleans(v) => v.into_iter().map(Value::Boolean).collect(),
            Self::Integers(v) => v.into_iter().map(Value::Integer).collect(),
            Self::Longs(v) => v.into_iter().map(Value::Long).collect(),
            Self::Floats(v) => v.into_iter().map(Value::Float).collect(),
            Self::Doubles(v) => v.into_iter().map(Value::Double).collect(),
            Self::Characters(v) => v.into_iter().map(Value::Character).collect(),
            Self::Text(s) if element_type.is_character() => {
                s.chars().map(Value::Character).collect()
            }
            Self::Text(s) => vec![Value::String(s)],
            Self::Strings(v) if element_type.is_character() => v
                .into_iter()
                .map(|s| match s.chars().next() {
                    Some(c) => Ok(Value::Character(c)),
                    None => Err(CoercionError::new(
                        element_type.name(),
                        "\"\"",
                        "empty string has no first character",
                    )),
                })
                .collect::<Result<Vec<_>, CoercionError>>()?,
            // Already well-formed for string and enum elements; anything
            // else is left to coercion.
            Self::Strings(v) => v.into_iter().map(Value::String).collect(),
        };
        Ok(values)
    }

    /// Convert a JSON property value read from the store.
    ///
    /// Homogeneous arrays map to the matching primitive form (integral
    /// numbers to `Longs`, other numbers to `Doubles`); a JSON string maps to
    /// `Text`; a scalar maps to a one-element sequence; `null` is `Absent`.
    /// Nested arrays and objects are not property values and fail coercion.
    pub fn from_json(json: &serde_json::Value) -> MergeResult<Self> {
        use serde_json::Value as Json;

        match json {
            Json::Null => Ok(Self::Absent),
            Json::String(s) => Ok(Self::Text(s.clone())),
            Json::Array(items) => {
                if items.is_empty() {
                    return Ok(Self::Values(Vec::new()));
                }
                if let Some(strings) = items
                    .iter()
                    .map(|i| i.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                {
                    return Ok(Self::Strings(strings));
                }
                if let Some(bools) = items.iter().map(Json::as_bool).collect::<Option<Vec<_>>>() {
                    return Ok(Self::Booleans(bools));
                }
                if let Some(longs) = items.iter().map(Json::as_i64).collect::<Option<Vec<_>>>() {
                    return Ok(Self::Longs(longs));
                }
                if let Some(doubles) = items.iter().map(Json::as_f64).collect::<Option<Vec<_>>>() {
                    return Ok(Self::Doubles(doubles));
                }
                items
                    .iter()
                    .map(json_scalar)
                    .collect::<MergeResult<Vec<_>>>()
                    .map(Self::Values)
            }
            scalar => Ok(Self::Values(vec![json_scalar(scalar)?])),
        }
    }
}

fn json_scalar(json: &serde_json::Value) -> MergeResult<Value> {
    use serde_json::Value as Json;

    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Boolean(*b)),
        Json::Number(n) => Ok(n
            .as_i64()
            .map(Value::Long)
            .unwrap_or_else(|| Value::Double(n.as_f64().unwrap_or(f64::NAN)))),
        Json::String(s) => Ok(Value::String(s.clone())),
        other => Err(CoercionError::new(
            "property value",
            other.to_string(),
            "nested arrays and objects are not property values",
        )
        .into()),
    }
}

impl From<Vec<Value>> for RawValues {
    fn from(values: Vec<Value>) -> Self {
        Self::Values(values)
    }
}

impl From<Option<Vec<Value>>> for RawValues {
    fn from(values: Option<Vec<Value>>) -> Self {
        values.map_or(Self::Absent, Self::Values)
    }
}

impl From<Container> for RawValues {
    fn from(container: Container) -> Self {
        Self::Values(container.into_values())
    }
}

impl From<&str> for RawValues {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<i32>> for RawValues {
    fn from(values: Vec<i32>) -> Self {
        Self::Integers(values)
    }
}

impl From<Vec<i64>> for RawValues {
    fn from(values: Vec<i64>) -> Self {
        Self::Longs(values)
    }
}

impl From<Vec<String>> for RawValues {
    fn from(values: Vec<String>) -> Self {
        Self::Strings(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MergeError;
    use ogm_types::EnumType;
    use serde_json::json;

    // -----------------------------------------------------------------------
    // Normalization
    // -----------------------------------------------------------------------

    #[test]
    fn primitive_arrays_are_boxed_in_order() {
        let values = RawValues::Integers(vec![3, 1, 2])
            .normalize(&ElementType::Integer)
            .unwrap();
        assert_eq!(
            values,
            vec![Value::Integer(3), Value::Integer(1), Value::Integer(2)]
        );

        let flags = RawValues::Booleans(vec![true, false])
            .normalize(&ElementType::Boolean)
            .unwrap();
        assert_eq!(flags, vec![Value::Boolean(true), Value::Boolean(false)]);
    }

    #[test]
    fn wide_and_floating_arrays_are_boxed_in_order() {
        let longs = RawValues::Longs(vec![i64::MAX, -4, 0])
            .normalize(&ElementType::Long)
            .unwrap();
        assert_eq!(
            longs,
            vec![Value::Long(i64::MAX), Value::Long(-4), Value::Long(0)]
        );

        let floats = RawValues::Floats(vec![2.5, -0.5])
            .normalize(&ElementType::Float)
            .unwrap();
        assert_eq!(floats, vec![Value::Float(2.5), Value::Float(-0.5)]);

        let doubles = RawValues::Doubles(vec![1.25, 1e300, 1.25])
            .normalize(&ElementType::Double)
            .unwrap();
        assert_eq!(
            doubles,
            vec![Value::Double(1.25), Value::Double(1e300), Value::Double(1.25)]
        );
    }

    #[test]
    fn character_array_is_boxed_for_any_element() {
        let chars = vec!['z', 'a', '\u{e9}'];
        let expected: Vec<Value> = chars.iter().copied().map(Value::Character).collect();
        for element in [ElementType::Character, ElementType::String, ElementType::Any] {
            let values = RawValues::Characters(chars.clone())
                .normalize(&element)
                .unwrap();
            assert_eq!(values, expected, "{element}");
        }
    }

    #[test]
    fn text_explodes_into_characters() {
        let values = RawValues::from("abc")
            .normalize(&ElementType::Character)
            .unwrap();
        assert_eq!(
            values,
            vec![
                Value::Character('a'),
                Value::Character('b'),
                Value::Character('c')
            ]
        );
    }

    #[test]
    fn empty_text_explodes_to_nothing() {
        let values = RawValues::from("").normalize(&ElementType::Character).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn text_for_string_element_is_single_value() {
        let values = RawValues::from("abc").normalize(&ElementType::String).unwrap();
        assert_eq!(values, vec![Value::from("abc")]);
    }

    #[test]
    fn string_array_to_characters_takes_first_char() {
        let values = RawValues::Strings(vec!["xy".into(), "z".into()])
            .normalize(&ElementType::Character)
            .unwrap();
        assert_eq!(values, vec![Value::Character('x'), Value::Character('z')]);
    }

    #[test]
    fn empty_string_in_character_array_fails() {
        let err = RawValues::Strings(vec!["a".into(), String::new()])
            .normalize(&ElementType::Character)
            .unwrap_err();
        assert!(matches!(err, MergeError::CoercionFailure(_)));
    }

    #[test]
    fn string_array_passes_through_for_enum() {
        let colour = ElementType::Enum(EnumType::new("Colour", ["RED"]));
        let values = RawValues::Strings(vec!["RED".into()])
            .normalize(&colour)
            .unwrap();
        assert_eq!(values, vec![Value::from("RED")]);
    }

    #[test]
    fn absent_is_empty() {
        assert!(RawValues::Absent.normalize(&ElementType::Any).unwrap().is_empty());
        assert!(RawValues::from(None::<Vec<Value>>)
            .normalize(&ElementType::Any)
            .unwrap()
            .is_empty());
    }

    // -----------------------------------------------------------------------
    // JSON
    // -----------------------------------------------------------------------

    #[test]
    fn json_arrays_pick_primitive_form() {
        assert_eq!(
            RawValues::from_json(&json!([1, 2, 3])).unwrap(),
            RawValues::Longs(vec![1, 2, 3])
        );
        assert_eq!(
            RawValues::from_json(&json!([1.5, 2])).unwrap(),
            RawValues::Doubles(vec![1.5, 2.0])
        );
        assert_eq!(
            RawValues::from_json(&json!(["a", "b"])).unwrap(),
            RawValues::Strings(vec!["a".into(), "b".into()])
        );
        assert_eq!(
            RawValues::from_json(&json!([true])).unwrap(),
            RawValues::Booleans(vec![true])
        );
    }

    #[test]
    fn json_mixed_array_becomes_values() {
        assert_eq!(
            RawValues::from_json(&json!([1, "a", null])).unwrap(),
            RawValues::Values(vec![Value::Long(1), Value::from("a"), Value::Null])
        );
    }

    #[test]
    fn json_scalars() {
        assert_eq!(RawValues::from_json(&json!(null)).unwrap(), RawValues::Absent);
        assert_eq!(
            RawValues::from_json(&json!("ab")).unwrap(),
            RawValues::Text("ab".into())
        );
        assert_eq!(
            RawValues::from_json(&json!(7)).unwrap(),
            RawValues::Values(vec![Value::Long(7)])
        );
    }

    #[test]
    fn json_object_is_rejected() {
        let err = RawValues::from_json(&json!({"k": 1})).unwrap_err();
        assert!(matches!(err, MergeError::CoercionFailure(_)));
        let err = RawValues::from_json(&json!([[1], "x"])).unwrap_err();
        assert!(matches!(err, MergeError::CoercionFailure(_)));
    }
}
