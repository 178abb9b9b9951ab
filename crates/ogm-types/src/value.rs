use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::entity::EntityRef;

/// A dynamically typed element value.
///
/// `Value` is `Eq + Hash + Ord` so that it can be held in hash sets and
/// sorted sets. Floating-point values compare by total order, which makes
/// `NaN == NaN` and `-0.0 != 0.0`. Values of different variants order by
/// variant (in declaration order).
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Character(char),
    String(String),
    Enum { type_name: String, variant: String },
    Entity(EntityRef),
}

impl Value {
    /// Short name of the variant, used in coercion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Character(_) => "character",
            Self::String(_) => "string",
            Self::Enum { .. } => "enum",
            Self::Entity(_) => "entity",
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The text of a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integral value widened to `i64`, for `Integer` and `Long`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(i64::from(*i)),
            Self::Long(l) => Some(*l),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Boolean(_) => 1,
            Self::Integer(_) => 2,
            Self::Long(_) => 3,
            Self::Float(_) => 4,
            Self::Double(_) => 5,
            Self::Character(_) => 6,
            Self::String(_) => 7,
            Self::Enum { .. } => 8,
            Self::Entity(_) => 9,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Long(a), Self::Long(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Double(a), Self::Double(b)) => a.total_cmp(b),
            (Self::Character(a), Self::Character(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (
                Self::Enum {
                    type_name: ta,
                    variant: va,
                },
                Self::Enum {
                    type_name: tb,
                    variant: vb,
                },
            ) => ta.cmp(tb).then_with(|| va.cmp(vb)),
            (Self::Entity(a), Self::Entity(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Null => {}
            Self::Boolean(b) => b.hash(state),
            Self::Integer(i) => i.hash(state),
            Self::Long(l) => l.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Double(d) => d.to_bits().hash(state),
            Self::Character(c) => c.hash(state),
            Self::String(s) => s.hash(state),
            Self::Enum { type_name, variant } => {
                type_name.hash(state);
                variant.hash(state);
            }
            Self::Entity(e) => e.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Long(l) => write!(f, "{l}L"),
            Self::Float(x) => write!(f, "{x}f"),
            Self::Double(x) => write!(f, "{x}"),
            Self::Character(c) => write!(f, "'{c}'"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Enum { type_name, variant } => write!(f, "{type_name}::{variant}"),
            Self::Entity(e) => write!(f, "{e:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Character(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<EntityRef> for Value {
    fn from(v: EntityRef) -> Self {
        Self::Entity(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
