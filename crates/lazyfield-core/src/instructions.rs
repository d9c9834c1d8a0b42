use crate::config::MethodSignature;
use crate::descriptor::MethodDescriptor;
use crate::opcodes::{self, Category, ConditionalBranch, Opcode};
use crate::values::InitialValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelId(pub u32);

impl std::fmt::Display for LabelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

impl FieldRef {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
    pub interface: bool,
}

impl MethodRef {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
            interface: false,
        }
    }

    pub fn parameter_count(&self) -> Option<usize> {
        MethodDescriptor::parse(&self.descriptor)
            .ok()
            .map(|desc| desc.parameter_count())
    }

    pub fn matches(&self, signature: &MethodSignature) -> bool {
        self.name == signature.name && self.descriptor == signature.descriptor
    }
}

/// Operand of an `ldc` family instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Class(String),
}

/// One entry of a method's instruction stream.
///
/// `Label` and `LineNumber` are pseudo-instructions: they occupy an index but never execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Label(LabelId),
    LineNumber {
        line: u32,
        start: LabelId,
    },
    Simple(Opcode),
    Int {
        opcode: Opcode,
        operand: i32,
    },
    Var {
        opcode: Opcode,
        slot: u16,
    },
    Iinc {
        slot: u16,
        increment: i16,
    },
    Type {
        opcode: Opcode,
        descriptor: String,
    },
    Field {
        opcode: Opcode,
        field: FieldRef,
    },
    Method {
        opcode: Opcode,
        method: MethodRef,
    },
    InvokeDynamic {
        name: String,
        descriptor: String,
    },
    Jump {
        opcode: Opcode,
        target: LabelId,
    },
    Ldc(Constant),
    TableSwitch {
        min: i32,
        max: i32,
        default: LabelId,
        targets: Vec<LabelId>,
    },
    LookupSwitch {
        default: LabelId,
        keys: Vec<i32>,
        targets: Vec<LabelId>,
    },
    MultiANewArray {
        descriptor: String,
        dimensions: u8,
    },
}

impl Instruction {
    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Instruction::Label(_) | Instruction::LineNumber { .. } => None,
            Instruction::Simple(opcode)
            | Instruction::Int { opcode, .. }
            | Instruction::Var { opcode, .. }
            | Instruction::Type { opcode, .. }
            | Instruction::Field { opcode, .. }
            | Instruction::Method { opcode, .. }
            | Instruction::Jump { opcode, .. } => Some(*opcode),
            Instruction::Iinc { .. } => Some(Opcode::IINC),
            Instruction::InvokeDynamic { .. } => Some(Opcode::INVOKEDYNAMIC),
            Instruction::Ldc(Constant::Long(_) | Constant::Double(_)) => Some(Opcode::LDC2_W),
            Instruction::Ldc(_) => Some(Opcode::LDC),
            Instruction::TableSwitch { .. } => Some(Opcode::TABLESWITCH),
            Instruction::LookupSwitch { .. } => Some(Opcode::LOOKUPSWITCH),
            Instruction::MultiANewArray { .. } => Some(Opcode::MULTIANEWARRAY),
        }
    }

    pub fn is_pseudo(&self) -> bool {
        matches!(self, Instruction::Label(_) | Instruction::LineNumber { .. })
    }

    pub fn category(&self) -> Option<Category> {
        self.opcode().map(opcodes::category_of)
    }

    pub fn label(&self) -> Option<LabelId> {
        match self {
            Instruction::Label(label) => Some(*label),
            _ => None,
        }
    }

    pub fn field_read(&self) -> Option<&FieldRef> {
        match self {
            Instruction::Field { opcode, field } if opcode.is_field_read() => Some(field),
            _ => None,
        }
    }

    pub fn field_write(&self) -> Option<&FieldRef> {
        match self {
            Instruction::Field { opcode, field } if opcode.is_field_write() => Some(field),
            _ => None,
        }
    }

    pub fn reads_field(&self, name: &str) -> bool {
        self.field_read().is_some_and(|field| field.name == name)
    }

    pub fn writes_field(&self, name: &str) -> bool {
        self.field_write().is_some_and(|field| field.name == name)
    }

    pub fn load_slot(&self) -> Option<u16> {
        match self {
            Instruction::Var { opcode, slot } if opcode.is_local_load() => Some(*slot),
            Instruction::Simple(opcode) => opcode.implicit_load_slot(),
            _ => None,
        }
    }

    pub fn store_slot(&self) -> Option<u16> {
        match self {
            Instruction::Var { opcode, slot } if opcode.is_local_store() => Some(*slot),
            Instruction::Simple(opcode) => opcode.implicit_store_slot(),
            _ => None,
        }
    }

    /// The literal this instruction pushes, if it is a constant push, `bipush`/`sipush` or `ldc`.
    pub fn pushed_constant(&self) -> Option<InitialValue> {
        match self {
            Instruction::Simple(opcode) => opcodes::canonical_value(*opcode),
            Instruction::Int {
                opcode: Opcode::BIPUSH | Opcode::SIPUSH,
                operand,
            } => Some(InitialValue::Int(*operand)),
            Instruction::Ldc(constant) => Some(InitialValue::from_constant(constant)),
            _ => None,
        }
    }

    pub fn invoked(&self) -> Option<(Opcode, &MethodRef)> {
        match self {
            Instruction::Method { opcode, method } => Some((*opcode, method)),
            _ => None,
        }
    }

    pub fn is_call_to(&self, signature: &MethodSignature) -> bool {
        self.invoked()
            .is_some_and(|(_, method)| method.matches(signature))
    }

    pub fn conditional_branch(&self) -> Option<(ConditionalBranch, LabelId)> {
        match self {
            Instruction::Jump { opcode, target } => {
                ConditionalBranch::from_opcode(*opcode).map(|branch| (branch, *target))
            }
            _ => None,
        }
    }

    pub fn is_numeric_comparison(&self) -> bool {
        matches!(self, Instruction::Simple(opcode)
            if opcodes::NumericComparison::from_opcode(*opcode).is_some())
    }

    /// Labels this instruction may transfer control to, excluding fall-through.
    pub fn jump_targets(&self) -> Vec<LabelId> {
        match self {
            Instruction::Jump { target, .. } => vec![*target],
            Instruction::TableSwitch {
                default, targets, ..
            }
            | Instruction::LookupSwitch {
                default, targets, ..
            } => {
                let mut labels = vec![*default];
                for target in targets {
                    if !labels.contains(target) {
                        labels.push(*target);
                    }
                }
                labels
            }
            _ => Vec::new(),
        }
    }

    /// Whether control may continue with the next instruction.
    pub fn falls_through(&self) -> bool {
        self.opcode().map_or(true, |opcode| !opcode.ends_flow())
    }
}
