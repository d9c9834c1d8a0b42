/*! Bytecode model and analyses for verifying lazily initialized fields.
 *
 * A private, non-final field that is written after construction can still be effectively
 * immutable when the write is guarded so that it happens at most once and always stores an
 * equivalent value. This crate models a class's methods as flat JVM instruction streams, builds
 * control-flow graphs over them, and runs the checks that decide whether such a field follows the
 * lazy initialization idiom.
 */

pub mod analysis;
pub mod builder;
pub mod class;
pub mod config;
pub mod descriptor;
pub mod findings;
pub mod format;
pub mod instructions;
pub mod opcodes;
pub mod values;

pub use analysis::{
    AnalysisSession, CheckRunner, ClassCheck, ControlFlowGraph, LazyInitializationCheck,
};
pub use builder::{ClassBuilder, MethodBuilder};
pub use class::{AccessFlags, Class, Field, Method, MethodId, TryCatchBlock};
pub use config::AnalysisConfig;
pub use descriptor::{FieldType, MethodDescriptor};
pub use findings::{ClassReport, Defect, Finding, MutabilityReason};
pub use instructions::{Constant, FieldRef, Instruction, LabelId, MethodRef};
pub use opcodes::{Category, ConditionalBranch, NumericComparison, Opcode, OperandForm};
pub use values::InitialValue;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid descriptor `{descriptor}`: {reason}")]
    InvalidDescriptor { descriptor: String, reason: String },
    #[error("Unknown opcode: {0}")]
    UnknownOpcode(String),
    #[error("Opcode `{opcode}` does not take {form} operands")]
    OperandMismatch { opcode: Opcode, form: OperandForm },
    #[error("Builder error: {0}")]
    BuilderError(String),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests;
