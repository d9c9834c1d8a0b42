use crate::descriptor::{FieldType, MethodDescriptor};
use crate::instructions::{Instruction, LabelId};
use crate::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AccessFlags(pub u16);

impl AccessFlags {
    pub const PUBLIC: AccessFlags = AccessFlags(0x0001);
    pub const PRIVATE: AccessFlags = AccessFlags(0x0002);
    pub const PROTECTED: AccessFlags = AccessFlags(0x0004);
    pub const STATIC: AccessFlags = AccessFlags(0x0008);
    pub const FINAL: AccessFlags = AccessFlags(0x0010);
    pub const SYNCHRONIZED: AccessFlags = AccessFlags(0x0020);
    pub const VOLATILE: AccessFlags = AccessFlags(0x0040);
    pub const TRANSIENT: AccessFlags = AccessFlags(0x0080);
    pub const NATIVE: AccessFlags = AccessFlags(0x0100);
    pub const ABSTRACT: AccessFlags = AccessFlags(0x0400);
    pub const SYNTHETIC: AccessFlags = AccessFlags(0x1000);

    pub const NAMED: [(&'static str, AccessFlags); 11] = [
        ("public", AccessFlags::PUBLIC),
        ("private", AccessFlags::PRIVATE),
        ("protected", AccessFlags::PROTECTED),
        ("static", AccessFlags::STATIC),
        ("final", AccessFlags::FINAL),
        ("synchronized", AccessFlags::SYNCHRONIZED),
        ("volatile", AccessFlags::VOLATILE),
        ("transient", AccessFlags::TRANSIENT),
        ("native", AccessFlags::NATIVE),
        ("abstract", AccessFlags::ABSTRACT),
        ("synthetic", AccessFlags::SYNTHETIC),
    ];

    pub fn empty() -> Self {
        AccessFlags(0)
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(name, _)| *name == keyword)
            .map(|(_, flag)| *flag)
    }

    pub fn contains(self, other: AccessFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_private(self) -> bool {
        self.contains(AccessFlags::PRIVATE)
    }

    pub fn is_final(self) -> bool {
        self.contains(AccessFlags::FINAL)
    }

    pub fn is_static(self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    pub fn keywords(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(_, flag)| self.contains(*flag))
            .map(|(name, _)| name)
    }
}

impl BitOr for AccessFlags {
    type Output = AccessFlags;

    fn bitor(self, rhs: AccessFlags) -> AccessFlags {
        AccessFlags(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub descriptor: String,
    pub access: AccessFlags,
}

impl Field {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>, access: AccessFlags) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access,
        }
    }

    pub fn field_type(&self) -> Result<FieldType> {
        FieldType::parse(&self.descriptor)
    }

    /// Private and non-final: the only fields the lazy initialization check looks at.
    pub fn is_candidate(&self) -> bool {
        self.access.is_private() && !self.access.is_final()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryCatchBlock {
    pub start: LabelId,
    pub end: LabelId,
    pub handler: LabelId,
    pub catch_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub descriptor: String,
    pub access: AccessFlags,
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub try_catch_blocks: Vec<TryCatchBlock>,
}

impl Method {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>, access: AccessFlags) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access,
            instructions: Vec::new(),
            try_catch_blocks: Vec::new(),
        }
    }

    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    pub fn is_static_initializer(&self) -> bool {
        self.name == "<clinit>"
    }

    pub fn parameter_count(&self) -> Result<usize> {
        Ok(MethodDescriptor::parse(&self.descriptor)?.parameter_count())
    }

    /// `name` followed by the descriptor, e.g. `compute()I`.
    pub fn signature(&self) -> String {
        format!("{}{}", self.name, self.descriptor)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Position of a method inside [`Class::methods`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodId(pub usize);

impl std::fmt::Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "method{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub name: String,
    #[serde(default)]
    pub super_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_name: None,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn method(&self, id: MethodId) -> Result<&Method> {
        self.methods
            .get(id.0)
            .ok_or_else(|| AnalysisError::MethodNotFound(format!("{}::{}", self.name, id)))
    }

    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<(MethodId, &Method)> {
        self.methods_with_ids()
            .find(|(_, method)| method.name == name && method.descriptor == descriptor)
    }

    pub fn methods_with_ids(&self) -> impl Iterator<Item = (MethodId, &Method)> {
        self.methods
            .iter()
            .enumerate()
            .map(|(index, method)| (MethodId(index), method))
    }

    pub fn candidate_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|field| field.is_candidate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_flags() {
        let flags = AccessFlags::PRIVATE | AccessFlags::STATIC;
        assert!(flags.is_private());
        assert!(flags.is_static());
        assert!(!flags.is_final());
        assert_eq!(flags.keywords().collect::<Vec<_>>(), vec!["private", "static"]);
        assert_eq!(AccessFlags::from_keyword("final"), Some(AccessFlags::FINAL));
        assert_eq!(AccessFlags::from_keyword("sealed"), None);
    }

    #[test]
    fn test_candidate_fields() {
        let mut class = Class::new("com/example/Holder");
        class.fields.push(Field::new("a", "I", AccessFlags::PRIVATE));
        class
            .fields
            .push(Field::new("b", "I", AccessFlags::PRIVATE | AccessFlags::FINAL));
        class.fields.push(Field::new("c", "I", AccessFlags::PUBLIC));

        let names: Vec<_> = class.candidate_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn test_method_lookup() {
        let mut class = Class::new("com/example/Holder");
        class.methods.push(Method::new("<init>", "()V", AccessFlags::PUBLIC));
        class.methods.push(Method::new("get", "(I)J", AccessFlags::PUBLIC));

        let (id, method) = class.find_method("get", "(I)J").unwrap();
        assert_eq!(id, MethodId(1));
        assert_eq!(method.parameter_count().unwrap(), 1);
        assert!(class.method(MethodId(0)).unwrap().is_constructor());
        assert!(class.method(MethodId(2)).is_err());
    }
}
