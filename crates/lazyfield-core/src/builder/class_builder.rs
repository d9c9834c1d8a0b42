use super::MethodBuilder;
use crate::class::{AccessFlags, Class, Field, Method};
use crate::descriptor::{FieldType, MethodDescriptor};
use crate::{AnalysisError, Result};

pub struct ClassBuilder {
    class: Class,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            class: Class::new(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.class.name
    }

    pub fn super_class(&mut self, name: &str) -> &mut Self {
        self.class.super_name = Some(name.to_string());
        self
    }

    pub fn field(&mut self, name: &str, descriptor: &str, access: AccessFlags) -> &mut Self {
        self.class.fields.push(Field::new(name, descriptor, access));
        self
    }

    /// Starts a method owned by this class. Pass the result of [`MethodBuilder::build`] to
    /// [`ClassBuilder::add_method`].
    pub fn method(&self, name: &str, descriptor: &str, access: AccessFlags) -> MethodBuilder {
        MethodBuilder::new(self.class.name.clone(), name, descriptor, access)
    }

    pub fn add_method(&mut self, method: Method) -> &mut Self {
        self.class.methods.push(method);
        self
    }

    pub fn build(&self) -> Result<Class> {
        for (i, field) in self.class.fields.iter().enumerate() {
            FieldType::parse(&field.descriptor)?;
            if self.class.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(AnalysisError::BuilderError(format!(
                    "field {} declared twice in {}",
                    field.name, self.class.name
                )));
            }
        }

        for (i, method) in self.class.methods.iter().enumerate() {
            MethodDescriptor::parse(&method.descriptor)?;
            if self.class.methods[..i]
                .iter()
                .any(|m| m.name == method.name && m.descriptor == method.descriptor)
            {
                return Err(AnalysisError::BuilderError(format!(
                    "method {} declared twice in {}",
                    method.signature(),
                    self.class.name
                )));
            }
        }

        Ok(self.class.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::Opcode;

    #[test]
    fn test_build_class() {
        let mut builder = ClassBuilder::new("com/example/Lazy");
        builder
            .super_class("java/lang/Object")
            .field("x", "I", AccessFlags::PRIVATE);

        let mut init = builder.method("<init>", "()V", AccessFlags::PUBLIC);
        init.aload(0)
            .invoke_constructor("java/lang/Object", "()V")
            .op(Opcode::RETURN);
        let init = init.build().unwrap();
        builder.add_method(init);

        let class = builder.build().unwrap();
        assert_eq!(class.name, "com/example/Lazy");
        assert_eq!(class.methods.len(), 1);
        assert!(class.methods[0].is_constructor());
        assert_eq!(class.super_name.as_deref(), Some("java/lang/Object"));
    }

    #[test]
    fn test_rejects_duplicates_and_bad_descriptors() {
        let mut builder = ClassBuilder::new("A");
        builder
            .field("x", "I", AccessFlags::PRIVATE)
            .field("x", "J", AccessFlags::PRIVATE);
        assert!(builder.build().is_err());

        let mut builder = ClassBuilder::new("A");
        builder.field("x", "Q", AccessFlags::PRIVATE);
        assert!(builder.build().is_err());

        let mut builder = ClassBuilder::new("A");
        builder
            .add_method(Method::new("m", "()V", AccessFlags::PUBLIC))
            .add_method(Method::new("m", "()V", AccessFlags::PUBLIC));
        assert!(builder.build().is_err());
    }
}
