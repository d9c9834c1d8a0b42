use crate::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};

/// Declared type of a field, decoded from its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut chars = descriptor.chars().peekable();
        let ty = parse_field_type(descriptor, &mut chars)?;
        if chars.next().is_some() {
            return Err(invalid(descriptor, "trailing characters"));
        }
        Ok(ty)
    }

    pub fn is_primitive(&self) -> bool {
        !self.is_reference()
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, FieldType::Object(_) | FieldType::Array(_))
    }

    pub fn descriptor(&self) -> String {
        self.to_string()
    }
}

impl FromStr for FieldType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        FieldType::parse(s)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Boolean => write!(f, "Z"),
            FieldType::Byte => write!(f, "B"),
            FieldType::Char => write!(f, "C"),
            FieldType::Short => write!(f, "S"),
            FieldType::Int => write!(f, "I"),
            FieldType::Long => write!(f, "J"),
            FieldType::Float => write!(f, "F"),
            FieldType::Double => write!(f, "D"),
            FieldType::Object(name) => write!(f, "L{};", name),
            FieldType::Array(component) => write!(f, "[{}", component),
        }
    }
}

/// Parameter and return types decoded from a method descriptor such as `(ILjava/lang/String;)V`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub returns: Option<FieldType>,
}

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut chars = descriptor.chars().peekable();
        if chars.next() != Some('(') {
            return Err(invalid(descriptor, "expected `(`"));
        }

        let mut params = Vec::new();
        loop {
            match chars.peek() {
                Some(')') => {
                    chars.next();
                    break;
                }
                Some(_) => params.push(parse_field_type(descriptor, &mut chars)?),
                None => return Err(invalid(descriptor, "unterminated parameter list")),
            }
        }

        let returns = if chars.peek() == Some(&'V') {
            chars.next();
            None
        } else {
            Some(parse_field_type(descriptor, &mut chars)?)
        };

        if chars.next().is_some() {
            return Err(invalid(descriptor, "trailing characters"));
        }

        Ok(Self { params, returns })
    }

    pub fn parameter_count(&self) -> usize {
        self.params.len()
    }
}

fn parse_field_type(descriptor: &str, chars: &mut Peekable<Chars<'_>>) -> Result<FieldType> {
    let ty = match chars.next() {
        Some('Z') => FieldType::Boolean,
        Some('B') => FieldType::Byte,
        Some('C') => FieldType::Char,
        Some('S') => FieldType::Short,
        Some('I') => FieldType::Int,
        Some('J') => FieldType::Long,
        Some('F') => FieldType::Float,
        Some('D') => FieldType::Double,
        Some('[') => FieldType::Array(Box::new(parse_field_type(descriptor, chars)?)),
        Some('L') => {
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some(';') => break,
                    Some(c) => name.push(c),
                    None => return Err(invalid(descriptor, "unterminated class name")),
                }
            }
            if name.is_empty() {
                return Err(invalid(descriptor, "empty class name"));
            }
            FieldType::Object(name)
        }
        Some(c) => return Err(invalid(descriptor, &format!("unexpected `{}`", c))),
        None => return Err(invalid(descriptor, "unexpected end")),
    };
    Ok(ty)
}

fn invalid(descriptor: &str, reason: &str) -> AnalysisError {
    AnalysisError::InvalidDescriptor {
        descriptor: descriptor.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_descriptors() {
        assert_eq!(FieldType::parse("I").unwrap(), FieldType::Int);
        assert_eq!(
            FieldType::parse("Ljava/lang/Object;").unwrap(),
            FieldType::Object("java/lang/Object".to_string())
        );
        assert_eq!(
            FieldType::parse("[[J").unwrap(),
            FieldType::Array(Box::new(FieldType::Array(Box::new(FieldType::Long))))
        );
        assert!(FieldType::parse("[[J").unwrap().is_reference());
        assert!(FieldType::parse("Z").unwrap().is_primitive());
        assert_eq!(FieldType::parse("[Ljava/util/List;").unwrap().descriptor(), "[Ljava/util/List;");
    }

    #[test]
    fn test_invalid_field_descriptors() {
        assert!(FieldType::parse("").is_err());
        assert!(FieldType::parse("V").is_err());
        assert!(FieldType::parse("II").is_err());
        assert!(FieldType::parse("Ljava/lang/Object").is_err());
        assert!(FieldType::parse("L;").is_err());
    }

    #[test]
    fn test_method_descriptors() {
        let desc = MethodDescriptor::parse("()I").unwrap();
        assert_eq!(desc.parameter_count(), 0);
        assert_eq!(desc.returns, Some(FieldType::Int));

        let desc = MethodDescriptor::parse("(IJ[Ljava/lang/String;)V").unwrap();
        assert_eq!(desc.parameter_count(), 3);
        assert_eq!(desc.returns, None);

        assert!(MethodDescriptor::parse("I)V").is_err());
        assert!(MethodDescriptor::parse("(I").is_err());
        assert!(MethodDescriptor::parse("()").is_err());
        assert!(MethodDescriptor::parse("()VV").is_err());
    }
}
