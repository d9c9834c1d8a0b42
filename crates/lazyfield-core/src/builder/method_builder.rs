use crate::class::{AccessFlags, Method, TryCatchBlock};
use crate::instructions::{Constant, FieldRef, Instruction, LabelId, MethodRef};
use crate::opcodes::{Opcode, OperandForm};
use crate::{AnalysisError, Result};
use std::collections::HashSet;

pub struct MethodBuilder {
    owner: String,
    method: Method,
    next_label: u32,
    placed: HashSet<LabelId>,
    error: Option<AnalysisError>,
}

impl MethodBuilder {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        descriptor: impl Into<String>,
        access: AccessFlags,
    ) -> Self {
        Self {
            owner: owner.into(),
            method: Method::new(name, descriptor, access),
            next_label: 0,
            placed: HashSet::new(),
            error: None,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Index the next emitted instruction will occupy.
    pub fn position(&self) -> usize {
        self.method.instructions.len()
    }

    pub fn new_label(&mut self) -> LabelId {
        let label = LabelId(self.next_label);
        self.next_label += 1;
        label
    }

    pub fn place(&mut self, label: LabelId) -> &mut Self {
        if !self.placed.insert(label) {
            self.fail(AnalysisError::BuilderError(format!(
                "label {} placed twice in {}",
                label,
                self.method.name
            )));
            return self;
        }
        self.next_label = self.next_label.max(label.0 + 1);
        self.push(Instruction::Label(label))
    }

    /// Creates a label and places it at the current position.
    pub fn mark(&mut self) -> LabelId {
        let label = self.new_label();
        self.place(label);
        label
    }

    pub fn line(&mut self, line: u32, start: LabelId) -> &mut Self {
        self.push(Instruction::LineNumber { line, start })
    }

    pub fn op(&mut self, opcode: Opcode) -> &mut Self {
        if self.expect_form(opcode, OperandForm::Simple) {
            self.push(Instruction::Simple(opcode));
        }
        self
    }

    pub fn int(&mut self, opcode: Opcode, operand: i32) -> &mut Self {
        if self.expect_form(opcode, OperandForm::Int) {
            self.push(Instruction::Int { opcode, operand });
        }
        self
    }

    pub fn var(&mut self, opcode: Opcode, slot: u16) -> &mut Self {
        if self.expect_form(opcode, OperandForm::Var) {
            self.push(Instruction::Var { opcode, slot });
        }
        self
    }

    pub fn iinc(&mut self, slot: u16, increment: i16) -> &mut Self {
        self.push(Instruction::Iinc { slot, increment })
    }

    pub fn type_insn(&mut self, opcode: Opcode, descriptor: &str) -> &mut Self {
        if self.expect_form(opcode, OperandForm::Type) {
            self.push(Instruction::Type {
                opcode,
                descriptor: descriptor.to_string(),
            });
        }
        self
    }

    pub fn field(&mut self, opcode: Opcode, owner: &str, name: &str, descriptor: &str) -> &mut Self {
        if self.expect_form(opcode, OperandForm::Field) {
            self.push(Instruction::Field {
                opcode,
                field: FieldRef::new(owner, name, descriptor),
            });
        }
        self
    }

    pub fn invoke(
        &mut self,
        opcode: Opcode,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> &mut Self {
        if self.expect_form(opcode, OperandForm::Method) {
            let mut method = MethodRef::new(owner, name, descriptor);
            method.interface = opcode == Opcode::INVOKEINTERFACE;
            self.push(Instruction::Method { opcode, method });
        }
        self
    }

    pub fn invoke_dynamic(&mut self, name: &str, descriptor: &str) -> &mut Self {
        self.push(Instruction::InvokeDynamic {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        })
    }

    pub fn jump(&mut self, opcode: Opcode, target: LabelId) -> &mut Self {
        if self.expect_form(opcode, OperandForm::Jump) {
            self.push(Instruction::Jump { opcode, target });
        }
        self
    }

    pub fn ldc(&mut self, constant: Constant) -> &mut Self {
        self.push(Instruction::Ldc(constant))
    }

    pub fn table_switch(
        &mut self,
        min: i32,
        max: i32,
        default: LabelId,
        targets: Vec<LabelId>,
    ) -> &mut Self {
        let expected = i64::from(max) - i64::from(min) + 1;
        if expected != targets.len() as i64 {
            self.fail(AnalysisError::BuilderError(format!(
                "tableswitch {}..={} needs {} targets, got {}",
                min,
                max,
                expected,
                targets.len()
            )));
            return self;
        }
        self.push(Instruction::TableSwitch {
            min,
            max,
            default,
            targets,
        })
    }

    pub fn lookup_switch(&mut self, default: LabelId, cases: Vec<(i32, LabelId)>) -> &mut Self {
        let (keys, targets) = cases.into_iter().unzip();
        self.push(Instruction::LookupSwitch {
            default,
            keys,
            targets,
        })
    }

    pub fn multi_anew_array(&mut self, descriptor: &str, dimensions: u8) -> &mut Self {
        self.push(Instruction::MultiANewArray {
            descriptor: descriptor.to_string(),
            dimensions,
        })
    }

    pub fn try_catch(
        &mut self,
        start: LabelId,
        end: LabelId,
        handler: LabelId,
        catch_type: Option<&str>,
    ) -> &mut Self {
        self.method.try_catch_blocks.push(TryCatchBlock {
            start,
            end,
            handler,
            catch_type: catch_type.map(str::to_string),
        });
        self
    }

    pub fn instruction(&mut self, instruction: Instruction) -> &mut Self {
        if let Instruction::Label(label) = instruction {
            return self.place(label);
        }
        self.push(instruction)
    }

    pub fn iconst(&mut self, value: i32) -> &mut Self {
        match value {
            -1..=5 => match Opcode::from_u8((Opcode::ICONST_0.code() as i32 + value) as u8) {
                Some(opcode) => self.op(opcode),
                None => self.ldc(Constant::Int(value)),
            },
            -128..=127 => self.int(Opcode::BIPUSH, value),
            -32768..=32767 => self.int(Opcode::SIPUSH, value),
            _ => self.ldc(Constant::Int(value)),
        }
    }

    pub fn aconst_null(&mut self) -> &mut Self {
        self.op(Opcode::ACONST_NULL)
    }

    pub fn iload(&mut self, slot: u16) -> &mut Self {
        self.local(Opcode::ILOAD, Opcode::ILOAD_0, slot)
    }

    pub fn lload(&mut self, slot: u16) -> &mut Self {
        self.local(Opcode::LLOAD, Opcode::LLOAD_0, slot)
    }

    pub fn aload(&mut self, slot: u16) -> &mut Self {
        self.local(Opcode::ALOAD, Opcode::ALOAD_0, slot)
    }

    pub fn istore(&mut self, slot: u16) -> &mut Self {
        self.local(Opcode::ISTORE, Opcode::ISTORE_0, slot)
    }

    pub fn lstore(&mut self, slot: u16) -> &mut Self {
        self.local(Opcode::LSTORE, Opcode::LSTORE_0, slot)
    }

    pub fn astore(&mut self, slot: u16) -> &mut Self {
        self.local(Opcode::ASTORE, Opcode::ASTORE_0, slot)
    }

    pub fn getfield(&mut self, name: &str, descriptor: &str) -> &mut Self {
        let owner = self.owner.clone();
        self.field(Opcode::GETFIELD, &owner, name, descriptor)
    }

    pub fn putfield(&mut self, name: &str, descriptor: &str) -> &mut Self {
        let owner = self.owner.clone();
        self.field(Opcode::PUTFIELD, &owner, name, descriptor)
    }

    pub fn getstatic(&mut self, name: &str, descriptor: &str) -> &mut Self {
        let owner = self.owner.clone();
        self.field(Opcode::GETSTATIC, &owner, name, descriptor)
    }

    pub fn putstatic(&mut self, name: &str, descriptor: &str) -> &mut Self {
        let owner = self.owner.clone();
        self.field(Opcode::PUTSTATIC, &owner, name, descriptor)
    }

    /// `invokevirtual` on the class being built.
    pub fn invoke_self(&mut self, name: &str, descriptor: &str) -> &mut Self {
        let owner = self.owner.clone();
        self.invoke(Opcode::INVOKEVIRTUAL, &owner, name, descriptor)
    }

    /// `invokespecial <owner>.<init>`, the call every constructor makes first.
    pub fn invoke_constructor(&mut self, owner: &str, descriptor: &str) -> &mut Self {
        self.invoke(Opcode::INVOKESPECIAL, owner, "<init>", descriptor)
    }

    pub fn build(self) -> Result<Method> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut referenced: Vec<LabelId> = self
            .method
            .instructions
            .iter()
            .flat_map(|inst| inst.jump_targets())
            .collect();
        for block in &self.method.try_catch_blocks {
            referenced.extend([block.start, block.end, block.handler]);
        }
        if let Some(missing) = referenced
            .into_iter()
            .find(|label| !self.placed.contains(label))
        {
            return Err(AnalysisError::BuilderError(format!(
                "label {} is referenced in {} but never placed",
                missing, self.method.name
            )));
        }

        Ok(self.method)
    }

    fn local(&mut self, long_form: Opcode, short_base: Opcode, slot: u16) -> &mut Self {
        let short = (slot < 4)
            .then(|| Opcode::from_u8(short_base.code() + slot as u8))
            .flatten();
        match short {
            Some(opcode) => self.op(opcode),
            None => self.var(long_form, slot),
        }
    }

    fn push(&mut self, instruction: Instruction) -> &mut Self {
        self.method.instructions.push(instruction);
        self
    }

    fn expect_form(&mut self, opcode: Opcode, form: OperandForm) -> bool {
        if opcode.form() == form {
            return true;
        }
        self.fail(AnalysisError::OperandMismatch { opcode, form });
        false
    }

    fn fail(&mut self, error: AnalysisError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}
