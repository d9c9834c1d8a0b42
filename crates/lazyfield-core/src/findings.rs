use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse verdict a [`Defect`] contributes to the class's overall mutability result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutabilityReason {
    NonFinalField,
    FieldCanBeReassigned,
    MutableTypeToField,
}

impl fmt::Display for MutabilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MutabilityReason::NonFinalField => "non-final field",
            MutabilityReason::FieldCanBeReassigned => "field can be reassigned",
            MutabilityReason::MutableTypeToField => "mutable type assigned to field",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Defect {
    NotProvablyWriteOnce,
    ReassignedInMethod { method: String },
    NonDeterministicPrimitive,
    NonDeterministicReference,
    MultipleGuards,
    MissingGuard,
    AmbiguousInitialValues,
    GuardMismatchesInitialValues,
    GuardShouldCheckNull,
    GuardComparesNonInitialValue,
    ComparedObjectNotInitialValue,
}

impl Defect {
    pub fn reason(&self) -> MutabilityReason {
        match self {
            Defect::NotProvablyWriteOnce => MutabilityReason::NonFinalField,
            Defect::NonDeterministicReference => MutabilityReason::MutableTypeToField,
            Defect::ReassignedInMethod { .. }
            | Defect::NonDeterministicPrimitive
            | Defect::MultipleGuards
            | Defect::MissingGuard
            | Defect::AmbiguousInitialValues
            | Defect::GuardMismatchesInitialValues
            | Defect::GuardShouldCheckNull
            | Defect::GuardComparesNonInitialValue
            | Defect::ComparedObjectNotInitialValue => MutabilityReason::FieldCanBeReassigned,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Defect::NotProvablyWriteOnce => "non-final field, not provably write-once".to_string(),
            Defect::ReassignedInMethod { method } => {
                format!("field can be reassigned within method {}", method)
            }
            Defect::NonDeterministicPrimitive => {
                "field can be reassigned with a non-deterministic value".to_string()
            }
            Defect::NonDeterministicReference => {
                "mutable type assigned to field, written value is not deterministic".to_string()
            }
            Defect::MultipleGuards => "more than one assignment guard in this block".to_string(),
            Defect::MissingGuard => {
                "lazy initialization requires at least one assignment guard".to_string()
            }
            Defect::AmbiguousInitialValues => {
                "field has more than one possible initial value".to_string()
            }
            Defect::GuardMismatchesInitialValues => {
                "guard does not match initial values".to_string()
            }
            Defect::GuardShouldCheckNull => {
                "guard should check against null, field may never initialize".to_string()
            }
            Defect::GuardComparesNonInitialValue => {
                "guard does not check against a possible initial value".to_string()
            }
            Defect::ComparedObjectNotInitialValue => {
                "compared object is not a possible initial value".to_string()
            }
        }
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    pub class_name: String,
    pub field: String,
    pub method: Option<String>,
    /// Index into the method's instruction stream of the offending instruction.
    pub instruction: Option<usize>,
    pub defect: Defect,
}

impl Finding {
    pub fn new(class_name: impl Into<String>, field: impl Into<String>, defect: Defect) -> Self {
        Self {
            class_name: class_name.into(),
            field: field.into(),
            method: None,
            instruction: None,
            defect,
        }
    }

    pub fn in_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn at(mut self, instruction: usize) -> Self {
        self.instruction = Some(instruction);
        self
    }

    pub fn reason(&self) -> MutabilityReason {
        self.defect.reason()
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class_name, self.field)?;
        if let Some(method) = &self.method {
            write!(f, " in {}", method)?;
        }
        if let Some(index) = self.instruction {
            write!(f, " @{}", index)?;
        }
        write!(f, ": {} ({})", self.defect, self.reason())
    }
}

/// Findings for one class, frozen once every check has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReport {
    pub class_name: String,
    pub findings: Vec<Finding>,
}

impl ClassReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.field == field)
    }

    pub fn defects(&self) -> Vec<&Defect> {
        self.findings.iter().map(|f| &f.defect).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
