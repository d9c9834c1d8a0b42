use crate::descriptor::FieldType;
use crate::instructions::Constant;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One state a field may be in before any guarded write to it succeeds.
///
/// Floating point values are kept as their bit patterns so the type can live in hash sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InitialValue {
    Boolean(bool),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(u32),
    Double(u64),
    String(String),
    Null,
    UnknownPrimitive,
    UnknownReference,
}

impl InitialValue {
    pub fn float(value: f32) -> Self {
        InitialValue::Float(value.to_bits())
    }

    pub fn double(value: f64) -> Self {
        InitialValue::Double(value.to_bits())
    }

    /// The value the JVM assigns to a field of this type before any code runs.
    pub fn default_for(ty: &FieldType) -> Self {
        match ty {
            FieldType::Boolean => InitialValue::Boolean(false),
            FieldType::Char => InitialValue::Char(0),
            FieldType::Byte | FieldType::Short | FieldType::Int => InitialValue::Int(0),
            FieldType::Long => InitialValue::Long(0),
            FieldType::Float => InitialValue::float(0.0),
            FieldType::Double => InitialValue::double(0.0),
            FieldType::Object(_) | FieldType::Array(_) => InitialValue::Null,
        }
    }

    pub fn unknown_for(ty: &FieldType) -> Self {
        if ty.is_primitive() {
            InitialValue::UnknownPrimitive
        } else {
            InitialValue::UnknownReference
        }
    }

    pub fn from_constant(constant: &Constant) -> Self {
        match constant {
            Constant::Int(v) => InitialValue::Int(*v),
            Constant::Long(v) => InitialValue::Long(*v),
            Constant::Float(v) => InitialValue::float(*v),
            Constant::Double(v) => InitialValue::double(*v),
            Constant::String(s) => InitialValue::String(s.clone()),
            Constant::Class(_) => InitialValue::UnknownReference,
        }
    }

    /// Reinterprets an operand-stack value as a value of the field's declared type.
    ///
    /// The JVM pushes booleans, chars, bytes and shorts as ints, so `iconst_0` stored into a
    /// boolean field means `false`.
    pub fn coerce_to(self, ty: &FieldType) -> Self {
        match (self, ty) {
            (InitialValue::Int(v), FieldType::Boolean) => InitialValue::Boolean(v != 0),
            (InitialValue::Int(v), FieldType::Char) => InitialValue::Char(v as u16),
            (InitialValue::Int(v), FieldType::Byte) => InitialValue::Int(i32::from(v as i8)),
            (InitialValue::Int(v), FieldType::Short) => InitialValue::Int(i32::from(v as i16)),
            (value, _) => value,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            InitialValue::Boolean(b) => !b,
            InitialValue::Char(c) => *c == 0,
            InitialValue::Int(v) => *v == 0,
            InitialValue::Long(v) => *v == 0,
            InitialValue::Float(bits) => f32::from_bits(*bits) == 0.0,
            InitialValue::Double(bits) => f64::from_bits(*bits) == 0.0,
            _ => false,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(
            self,
            InitialValue::UnknownPrimitive | InitialValue::UnknownReference
        )
    }
}

impl fmt::Display for InitialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitialValue::Boolean(b) => write!(f, "{}", b),
            InitialValue::Char(c) => write!(f, "'\\u{:04x}'", c),
            InitialValue::Int(v) => write!(f, "{}", v),
            InitialValue::Long(v) => write!(f, "{}L", v),
            InitialValue::Float(bits) => write!(f, "{}F", f32::from_bits(*bits)),
            InitialValue::Double(bits) => write!(f, "{}D", f64::from_bits(*bits)),
            InitialValue::String(s) => write!(f, "{:?}", s),
            InitialValue::Null => write!(f, "null"),
            InitialValue::UnknownPrimitive => write!(f, "<unknown primitive>"),
            InitialValue::UnknownReference => write!(f, "<unknown reference>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_by_type() {
        assert_eq!(
            InitialValue::default_for(&FieldType::Boolean),
            InitialValue::Boolean(false)
        );
        assert_eq!(
            InitialValue::default_for(&FieldType::Char),
            InitialValue::Char(0)
        );
        assert_eq!(
            InitialValue::default_for(&FieldType::Long),
            InitialValue::Long(0)
        );
        assert_eq!(
            InitialValue::default_for(&FieldType::Object("java/lang/String".into())),
            InitialValue::Null
        );
        assert!(InitialValue::default_for(&FieldType::Double).is_zero());
    }

    #[test]
    fn test_int_coercion() {
        assert_eq!(
            InitialValue::Int(1).coerce_to(&FieldType::Boolean),
            InitialValue::Boolean(true)
        );
        assert_eq!(
            InitialValue::Int(65).coerce_to(&FieldType::Char),
            InitialValue::Char(65)
        );
        assert_eq!(
            InitialValue::Int(200).coerce_to(&FieldType::Byte),
            InitialValue::Int(-56)
        );
        assert_eq!(
            InitialValue::Null.coerce_to(&FieldType::Int),
            InitialValue::Null
        );
    }

    #[test]
    fn test_negative_zero_counts_as_zero() {
        assert!(InitialValue::float(-0.0).is_zero());
        assert!(!InitialValue::UnknownPrimitive.is_zero());
        assert!(!InitialValue::Null.is_zero());
        assert!(!InitialValue::UnknownReference.is_known());
    }
}
