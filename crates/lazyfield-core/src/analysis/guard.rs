/*! Find and verify the conditional branch that keeps a lazy write from running twice.
 *
 * A guard is a conditional branch whose operand is the field itself (or the local it was copied
 * into). Its shape decides what it tests: against zero, against null, against a second operand,
 * or against another object through an `equals` call. Verification compares that test with the
 * values the field may hold before initialization.
 */

use super::alias::Alias;
use super::cfg::{BlockId, ControlFlowGraph};
use super::effective_write::EffectiveWrite;
use crate::config::AnalysisConfig;
use crate::descriptor::FieldType;
use crate::findings::Defect;
use crate::instructions::LabelId;
use crate::opcodes::{BranchOperands, ConditionalBranch, Opcode};
use crate::values::InitialValue;
use indexmap::IndexSet;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardShape {
    /// `ifeq`/`ifne`/... on the field value.
    AgainstZero,
    /// `ifnull`/`ifnonnull` on the field value.
    AgainstNull,
    /// Two-operand comparison, or a zero test on the result of `lcmp`/`fcmp`/`dcmp`.
    AgainstOperand,
    /// Zero test on the result of an `equals` call involving the field.
    AgainstOtherObject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    pub index: usize,
    pub block: BlockId,
    pub branch: ConditionalBranch,
    pub target: LabelId,
    pub shape: GuardShape,
    /// Instruction producing the value the field is compared with, when there is one.
    pub operand: Option<usize>,
    /// The write sits at the branch target rather than on the fall-through path.
    pub write_on_jump: bool,
}

impl Guard {
    /// Whether the write runs when the tested value is zero. Only defined for the zero family.
    pub fn writes_on_zero(&self) -> Option<bool> {
        self.branch
            .continues_on_zero()
            .map(|falls_through| falls_through != self.write_on_jump)
    }

    pub fn writes_on_null(&self) -> Option<bool> {
        self.branch
            .continues_on_null()
            .map(|falls_through| falls_through != self.write_on_jump)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("found {} assignment guards in {}", .indices.len(), .block)]
pub struct GuardConflict {
    pub block: BlockId,
    pub indices: Vec<usize>,
}

pub struct GuardResolver<'g> {
    cfg: &'g ControlFlowGraph,
    config: &'g AnalysisConfig,
}

impl<'g> GuardResolver<'g> {
    pub fn new(cfg: &'g ControlFlowGraph, config: &'g AnalysisConfig) -> Self {
        Self { cfg, config }
    }

    /// The guard of `write`.
    ///
    /// Branches before the write in its own block are considered first. When none of them tests
    /// the field, the immediate predecessors are searched, which covers a write that starts its
    /// own block behind a line number label or at a branch target. More than one accepted branch
    /// is a conflict.
    pub fn find_guard(
        &self,
        field: &str,
        alias: Option<&Alias>,
        write: &EffectiveWrite,
    ) -> Result<Option<Guard>, GuardConflict> {
        let own: Vec<Guard> = self
            .guards_in(field, alias, write.block)
            .into_iter()
            .filter(|guard| guard.index < write.index)
            .collect();
        if !own.is_empty() {
            return single(own);
        }

        let preds: Vec<BlockId> = self
            .cfg
            .predecessors(write.block)
            .filter(|&pred| pred != write.block)
            .collect();
        let mut guards = Vec::new();
        for pred in preds {
            for mut guard in self.guards_in(field, alias, pred) {
                guard.write_on_jump = self.cfg.label_block(guard.target) == Some(write.block);
                guards.push(guard);
            }
        }
        single(guards)
    }

    fn guards_in(&self, field: &str, alias: Option<&Alias>, block: BlockId) -> Vec<Guard> {
        self.cfg
            .block_instructions(block)
            .filter_map(|(index, inst)| {
                let (branch, target) = inst.conditional_branch()?;
                self.classify(field, alias, index, block, branch, target)
            })
            .collect()
    }

    fn classify(
        &self,
        field: &str,
        alias: Option<&Alias>,
        index: usize,
        block: BlockId,
        branch: ConditionalBranch,
        target: LabelId,
    ) -> Option<Guard> {
        let is_field_value = |i: usize| {
            self.cfg.instruction(i).is_some_and(|inst| {
                inst.reads_field(field)
                    || alias.is_some_and(|alias| inst.load_slot() == Some(alias.slot))
            })
        };
        let guard = |shape, operand| Guard {
            index,
            block,
            branch,
            target,
            shape,
            operand,
            write_on_jump: false,
        };

        let before = self.cfg.previous_real(index)?;
        let before_inst = self.cfg.instruction(before)?;

        if before_inst.is_call_to(&self.config.equality_method) {
            let argument = self.cfg.previous_real(before)?;
            let compared = if is_field_value(argument) {
                self.operand_before(argument)?
            } else if is_field_value(self.operand_before(argument)?) {
                argument
            } else {
                return None;
            };
            return Some(guard(GuardShape::AgainstOtherObject, Some(compared)));
        }

        let mut cursor = before;
        let mut constant = None;
        let mut compared_numerically = false;
        let mut field_value = None;
        for _ in 0..self.config.max_guard_operand_depth {
            let inst = self.cfg.instruction(cursor)?;
            if is_field_value(cursor) {
                field_value = Some(cursor);
                break;
            }
            if inst.is_call_to(&self.config.equality_method) {
                return None;
            }
            if inst.pushed_constant().is_some() {
                constant.get_or_insert(cursor);
            } else if inst.is_numeric_comparison() {
                compared_numerically = true;
            } else {
                return None;
            }
            cursor = self.cfg.previous_real(cursor)?;
        }
        let field_value = field_value?;

        let shape = match branch.operands() {
            BranchOperands::AgainstNull => GuardShape::AgainstNull,
            BranchOperands::AgainstZero if !compared_numerically => GuardShape::AgainstZero,
            BranchOperands::AgainstZero | BranchOperands::TwoOperands => GuardShape::AgainstOperand,
        };
        let operand = match shape {
            GuardShape::AgainstOperand => constant.or_else(|| self.operand_before(field_value)),
            _ => None,
        };

        Some(guard(shape, operand))
    }

    /// Real instruction that pushed the value below the one produced at `index`.
    ///
    /// `getfield` consumes its receiver, so that is skipped as well.
    fn operand_before(&self, index: usize) -> Option<usize> {
        let inst = self.cfg.instruction(index)?;
        let previous = self.cfg.previous_real(index)?;
        if inst.opcode() == Some(Opcode::GETFIELD) {
            self.cfg.previous_real(previous)
        } else {
            Some(previous)
        }
    }
}

fn single(mut guards: Vec<Guard>) -> Result<Option<Guard>, GuardConflict> {
    match guards.len() {
        0 => Ok(None),
        1 => Ok(guards.pop()),
        _ => Err(GuardConflict {
            block: guards[1].block,
            indices: guards.iter().map(|guard| guard.index).collect(),
        }),
    }
}

/// Checks that `guard` lets the write through exactly when the field still holds its initial
/// value.
pub fn verify_guard(
    guard: &Guard,
    cfg: &ControlFlowGraph,
    field_type: &FieldType,
    values: &IndexSet<InitialValue>,
) -> Option<Defect> {
    if values.len() > 1 {
        return Some(Defect::AmbiguousInitialValues);
    }

    let compared_value = || {
        guard
            .operand
            .and_then(|index| cfg.instruction(index))
            .and_then(|inst| inst.pushed_constant())
            .map(|value| value.coerce_to(field_type))
    };

    match guard.shape {
        GuardShape::AgainstZero => {
            let valid = match guard.writes_on_zero() {
                Some(true) => values.iter().all(InitialValue::is_zero),
                Some(false) => values.iter().all(|v| v.is_known() && !v.is_zero()),
                None => false,
            };
            (!valid).then_some(Defect::GuardMismatchesInitialValues)
        }
        GuardShape::AgainstNull => {
            let valid =
                guard.writes_on_null() == Some(true) && values.contains(&InitialValue::Null);
            (!valid).then_some(Defect::GuardShouldCheckNull)
        }
        GuardShape::AgainstOperand => {
            let valid = compared_value().is_some_and(|value| values.contains(&value));
            (!valid).then_some(Defect::GuardComparesNonInitialValue)
        }
        GuardShape::AgainstOtherObject => {
            let valid = compared_value().is_some_and(|value| values.contains(&value));
            (!valid).then_some(Defect::ComparedObjectNotInitialValue)
        }
    }
}
