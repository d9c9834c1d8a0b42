use crate::analysis::cfg::{BlockLabel, ControlFlowGraph};
use crate::class::{Class, Field, Method};
use crate::instructions::{Constant, Instruction};
use std::fmt::{self, Write};

pub fn format_class(class: &Class) -> String {
    class.to_string()
}

pub fn format_method(method: &Method) -> String {
    method.to_string()
}

pub fn format_graph(cfg: &ControlFlowGraph) -> String {
    cfg.to_string()
}

fn write_access(f: &mut fmt::Formatter<'_>, access: crate::class::AccessFlags) -> fmt::Result {
    for keyword in access.keywords() {
        write!(f, " {}", keyword)?;
    }
    Ok(())
}

fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{{{:04x}}}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{}", v),
            Constant::Long(v) => write!(f, "{}L", v),
            Constant::Float(v) => write!(f, "{:?}F", v),
            Constant::Double(v) => write!(f, "{:?}D", v),
            Constant::String(s) => write_string(f, s),
            Constant::Class(name) => write!(f, "{}.class", name),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Label(label) => write!(f, "{}:", label),
            Instruction::LineNumber { line, start } => write!(f, "line {} {}", line, start),
            Instruction::Simple(opcode) => write!(f, "{}", opcode),
            Instruction::Int { opcode, operand } => write!(f, "{} {}", opcode, operand),
            Instruction::Var { opcode, slot } => write!(f, "{} {}", opcode, slot),
            Instruction::Iinc { slot, increment } => write!(f, "iinc {} {}", slot, increment),
            Instruction::Type { opcode, descriptor } => write!(f, "{} {}", opcode, descriptor),
            Instruction::Field { opcode, field } => write!(
                f,
                "{} {}.{} {}",
                opcode, field.owner, field.name, field.descriptor
            ),
            Instruction::Method { opcode, method } => write!(
                f,
                "{} {}.{} {}",
                opcode, method.owner, method.name, method.descriptor
            ),
            Instruction::InvokeDynamic { name, descriptor } => {
                write!(f, "invokedynamic {} {}", name, descriptor)
            }
            Instruction::Jump { opcode, target } => write!(f, "{} {}", opcode, target),
            Instruction::Ldc(constant) => write!(f, "ldc {}", constant),
            Instruction::TableSwitch {
                min,
                max,
                default,
                targets,
            } => {
                write!(f, "tableswitch {} {}", min, max)?;
                for target in targets {
                    write!(f, " {}", target)?;
                }
                write!(f, " default {}", default)
            }
            Instruction::LookupSwitch {
                default,
                keys,
                targets,
            } => {
                write!(f, "lookupswitch")?;
                for (key, target) in keys.iter().zip(targets) {
                    write!(f, " {} {}", key, target)?;
                }
                write!(f, " default {}", default)
            }
            Instruction::MultiANewArray {
                descriptor,
                dimensions,
            } => write!(f, "multianewarray {} {}", descriptor, dimensions),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field")?;
        write_access(f, self.access)?;
        write!(f, " {} {}", self.name, self.descriptor)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method")?;
        write_access(f, self.access)?;
        writeln!(f, " {} {} {{", self.name, self.descriptor)?;
        for inst in &self.instructions {
            match inst {
                Instruction::Label(_) => writeln!(f, "{}", inst)?,
                _ => writeln!(f, "    {}", inst)?,
            }
        }
        for block in &self.try_catch_blocks {
            write!(f, "    catch {} {} {}", block.start, block.end, block.handler)?;
            if let Some(catch_type) = &block.catch_type {
                write!(f, " {}", catch_type)?;
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.name)?;
        if let Some(super_name) = &self.super_name {
            write!(f, " extends {}", super_name)?;
        }
        writeln!(f)?;
        if !self.fields.is_empty() {
            writeln!(f)?;
        }
        for field in &self.fields {
            writeln!(f, "{}", field)?;
        }
        for method in &self.methods {
            writeln!(f)?;
            writeln!(f, "{}", method)?;
        }
        Ok(())
    }
}

impl fmt::Display for ControlFlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; {}", self.method_name())?;
        if let Some(error) = self.flow_error() {
            writeln!(f, "; no edges: {}", error)?;
        }
        for block in self.partition() {
            write!(f, "{}", block.id)?;
            match block.label {
                BlockLabel::Label(label) => write!(f, " ({})", label)?,
                BlockLabel::Pseudo => write!(f, " (entry)")?,
            }
            write!(f, " [{}..{})", block.start(), block.end())?;
            if block.is_label_only() {
                write!(f, " label-only")?;
            }
            if !block.predecessors.is_empty() {
                write!(f, " preds:")?;
                for pred in &block.predecessors {
                    write!(f, " {}", pred)?;
                }
            }
            if !block.successors.is_empty() {
                write!(f, " succs:")?;
                for succ in &block.successors {
                    write!(f, " {}", succ)?;
                }
            }
            writeln!(f)?;
            for (index, inst) in self.block_instructions(block.id) {
                writeln!(f, "    {:>4}: {}", index, inst)?;
            }
        }
        Ok(())
    }
}
