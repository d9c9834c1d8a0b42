use crate::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Call that marks the "compared against another object" guard shape.
    pub equality_method: MethodSignature,
    /// Treat `<clinit>` as the constructor of static fields.
    pub static_initializer_is_constructor: bool,
    /// How many instructions the guard search walks back from a branch looking for the field.
    pub max_guard_operand_depth: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            equality_method: MethodSignature::new("equals", "(Ljava/lang/Object;)Z"),
            static_initializer_is_constructor: true,
            max_guard_operand_depth: 3,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AnalysisConfig =
            serde_json::from_str(json).map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_guard_operand_depth == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_guard_operand_depth must be at least 1".to_string(),
            ));
        }
        if self.equality_method.name.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "equality_method needs a name".to_string(),
            ));
        }
        crate::descriptor::MethodDescriptor::parse(&self.equality_method.descriptor)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub descriptor: String,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalysisConfig::from_json(r#"{ "max_guard_operand_depth": 5 }"#).unwrap();
        assert_eq!(config.max_guard_operand_depth, 5);
        assert!(config.static_initializer_is_constructor);
        assert_eq!(config.equality_method.name, "equals");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            AnalysisConfig::from_json(r#"{ "max_guard_operand_depth": 0 }"#),
            Err(AnalysisError::InvalidConfig(_))
        ));
        assert!(AnalysisConfig::from_json(
            r#"{ "equality_method": { "name": "same", "descriptor": "(Ljava/lang/Object" } }"#
        )
        .is_err());
        assert!(AnalysisConfig::from_json("not json").is_err());
    }
}
