use ogm_types::{CoercionError, ElementType, Value};

/// Converts raw values to a declared element type.
///
/// The hydration core only ever calls coercion through this trait; richer
/// codecs (dates, custom converters) plug in by implementing it.
pub trait Coercion: Send + Sync {
    fn coerce(&self, target: &ElementType, value: Value) -> Result<Value, CoercionError>;
}

/// Stock coercion rules.
///
/// - `Null` passes through for every target, as does anything for `Any`.
/// - Integral values widen freely; narrowing `Long` to `Integer` and `Double`
///   to `Float` is range-checked.
/// - Numeric and boolean targets parse strings.
/// - `Character` and `String` convert into one another (one-character
///   strings only for `Character`).
/// - Enum targets accept strings naming a declared variant.
/// - Entity targets accept any entity; the declared type is not checked
///   because related objects may be of a subtype.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCoercion;

fn fail(target: &ElementType, value: &Value, reason: impl Into<String>) -> CoercionError {
    CoercionError::new(target.name(), value.to_string(), reason)
}

fn parse<T>(target: &ElementType, value: &Value, s: &str) -> Result<T, CoercionError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    s.trim()
        .parse::<T>()
        .map_err(|e| fail(target, value, e.to_string()))
}

impl Coercion for DefaultCoercion {
    fn coerce(&self, target: &ElementType, value: Value) -> Result<Value, CoercionError> {
        if value.is_null() {
            return Ok(value);
        }
        match (target, &value) {
            (ElementType::Any, _) => Ok(value),

            (ElementType::Boolean, Value::Boolean(_)) => Ok(value),
            (ElementType::Boolean, Value::String(s)) => {
                Ok(Value::Boolean(parse::<bool>(target, &value, s)?))
            }

            (ElementType::Integer, Value::Integer(_)) => Ok(value),
            (ElementType::Integer, Value::Long(l)) => i32::try_from(*l)
                .map(Value::Integer)
                .map_err(|_| fail(target, &value, "cannot be narrowed without overflow")),
            (ElementType::Integer, Value::String(s)) => {
                Ok(Value::Integer(parse::<i32>(target, &value, s)?))
            }

            (ElementType::Long, Value::Long(_)) => Ok(value),
            (ElementType::Long, Value::Integer(i)) => Ok(Value::Long(i64::from(*i))),
            (ElementType::Long, Value::String(s)) => {
                Ok(Value::Long(parse::<i64>(target, &value, s)?))
            }

            (ElementType::Float, Value::Float(_)) => Ok(value),
            (ElementType::Float, Value::Double(d)) => {
                if d.is_finite() && d.abs() > f64::from(f32::MAX) {
                    Err(fail(target, &value, "cannot be narrowed without overflow"))
                } else {
                    Ok(Value::Float(*d as f32))
                }
            }
            (ElementType::Float, Value::Integer(i)) => Ok(Value::Float(*i as f32)),
            (ElementType::Float, Value::Long(l)) => Ok(Value::Float(*l as f32)),
            (ElementType::Float, Value::String(s)) => {
                Ok(Value::Float(parse::<f32>(target, &value, s)?))
            }

            (ElementType::Double, Value::Double(_)) => Ok(value),
            (ElementType::Double, Value::Float(f)) => Ok(Value::Double(f64::from(*f))),
            (ElementType::Double, Value::Integer(i)) => Ok(Value::Double(f64::from(*i))),
            (ElementType::Double, Value::Long(l)) => Ok(Value::Double(*l as f64)),
            (ElementType::Double, Value::String(s)) => {
                Ok(Value::Double(parse::<f64>(target, &value, s)?))
            }

            (ElementType::Character, Value::Character(_)) => Ok(value),
            (ElementType::Character, Value::String(s)) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Character(c)),
                    _ => Err(fail(target, &value, "expected exactly one character")),
                }
            }

            (ElementType::String, Value::String(_)) => Ok(value),
            (ElementType::String, Value::Character(c)) => Ok(Value::String(c.to_string())),
            (ElementType::String, Value::Enum { variant, .. }) => {
                Ok(Value::String(variant.clone()))
            }

            (ElementType::Enum(decl), Value::Enum { type_name, variant })
                if *type_name == decl.name && decl.has_variant(variant) =>
            {
                Ok(value)
            }
            (ElementType::Enum(decl), Value::String(s)) => {
                if decl.has_variant(s) {
                    Ok(Value::Enum {
                        type_name: decl.name.clone(),
                        variant: s.clone(),
                    })
                } else {
                    Err(fail(target, &value, "not a declared variant"))
                }
            }

            (ElementType::Entity(_), Value::Entity(_)) => Ok(value),

            _ => Err(fail(
                target,
                &value,
                format!("no conversion from {}", value.kind()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogm_types::EnumType;

    fn coerce(target: ElementType, value: impl Into<Value>) -> Result<Value, CoercionError> {
        DefaultCoercion.coerce(&target, value.into())
    }

    // -----------------------------------------------------------------------
    // Numbers
    // -----------------------------------------------------------------------

    #[test]
    fn long_narrows_to_integer_in_range() {
        assert_eq!(coerce(ElementType::Integer, 7i64).unwrap(), Value::Integer(7));
    }

    #[test]
    fn long_narrowing_overflow_fails() {
        let err = coerce(ElementType::Integer, i64::MAX).unwrap_err();
        assert_eq!(err.target, "integer");
        assert!(err.reason.contains("overflow"));
    }

    #[test]
    fn integer_widens_to_long_and_double() {
        assert_eq!(coerce(ElementType::Long, 3i32).unwrap(), Value::Long(3));
        assert_eq!(coerce(ElementType::Double, 3i32).unwrap(), Value::Double(3.0));
    }

    #[test]
    fn double_narrows_to_float() {
        assert_eq!(coerce(ElementType::Float, 1.5f64).unwrap(), Value::Float(1.5));
        assert!(coerce(ElementType::Float, f64::MAX).is_err());
    }

    #[test]
    fn numbers_parse_from_strings() {
        assert_eq!(coerce(ElementType::Long, " 42 ").unwrap(), Value::Long(42));
        assert_eq!(coerce(ElementType::Boolean, "true").unwrap(), Value::Boolean(true));
        assert!(coerce(ElementType::Integer, "forty-two").is_err());
    }

    // -----------------------------------------------------------------------
    // Characters, strings, enums
    // -----------------------------------------------------------------------

    #[test]
    fn single_char_string_becomes_character() {
        assert_eq!(coerce(ElementType::Character, "x").unwrap(), Value::Character('x'));
        assert!(coerce(ElementType::Character, "xy").is_err());
        assert!(coerce(ElementType::Character, "").is_err());
    }

    #[test]
    fn character_becomes_string() {
        assert_eq!(coerce(ElementType::String, 'q').unwrap(), Value::from("q"));
    }

    #[test]
    fn string_becomes_declared_enum_variant() {
        let colour = ElementType::Enum(EnumType::new("Colour", ["RED", "GREEN"]));
        assert_eq!(
            coerce(colour.clone(), "RED").unwrap(),
            Value::Enum {
                type_name: "Colour".into(),
                variant: "RED".into()
            }
        );
        assert!(coerce(colour, "BLUE").is_err());
    }

    // -----------------------------------------------------------------------
    // Pass-through
    // -----------------------------------------------------------------------

    #[test]
    fn null_and_any_pass_through() {
        assert_eq!(coerce(ElementType::Long, Value::Null).unwrap(), Value::Null);
        assert_eq!(coerce(ElementType::Any, "x").unwrap(), Value::from("x"));
    }

    #[test]
    fn unrelated_conversion_fails() {
        let err = coerce(ElementType::Boolean, 1i32).unwrap_err();
        assert!(err.reason.contains("integer"));
    }
}
