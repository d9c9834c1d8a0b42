use crate::class::Method;
use crate::instructions::LabelId;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Instruction {index} refers to undefined label {label}")]
    UndefinedLabel { index: usize, label: LabelId },
    #[error("Label {label} is defined twice (at {first} and {second})")]
    DuplicateLabel {
        label: LabelId,
        first: usize,
        second: usize,
    },
    #[error("Execution falls off the end of the code after instruction {index}")]
    FallsOffEnd { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    FallThrough,
    Jump,
    Exception,
}

/// A possible transfer of control between two instruction indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub kind: EdgeKind,
}

pub fn label_positions(method: &Method) -> Result<HashMap<LabelId, usize>, FlowError> {
    let mut positions = HashMap::new();
    for (index, inst) in method.instructions.iter().enumerate() {
        if let Some(label) = inst.label() {
            if let Some(first) = positions.insert(label, index) {
                return Err(FlowError::DuplicateLabel {
                    label,
                    first,
                    second: index,
                });
            }
        }
    }
    Ok(positions)
}

/// Walks every instruction reachable from the first one and reports each control transfer.
///
/// Unreachable instructions produce no edges.
pub fn control_flow_edges(method: &Method) -> Result<Vec<Edge>, FlowError> {
    let len = method.instructions.len();
    if len == 0 {
        return Ok(Vec::new());
    }

    let labels = label_positions(method)?;
    let resolve = |index: usize, label: LabelId| {
        labels
            .get(&label)
            .copied()
            .ok_or(FlowError::UndefinedLabel { index, label })
    };

    let mut handlers = Vec::with_capacity(method.try_catch_blocks.len());
    for block in &method.try_catch_blocks {
        let start = resolve(0, block.start)?;
        let end = resolve(0, block.end)?;
        let handler = resolve(0, block.handler)?;
        handlers.push((start..end, handler));
    }

    let mut edges = Vec::new();
    let mut visited = vec![false; len];
    let mut worklist = vec![0usize];

    while let Some(index) = worklist.pop() {
        if visited[index] {
            continue;
        }
        visited[index] = true;

        let inst = &method.instructions[index];
        let mut successors = Vec::new();

        if inst.falls_through() {
            if index + 1 >= len {
                return Err(FlowError::FallsOffEnd { index });
            }
            successors.push((index + 1, EdgeKind::FallThrough));
        }
        for label in inst.jump_targets() {
            successors.push((resolve(index, label)?, EdgeKind::Jump));
        }
        for (range, handler) in &handlers {
            if range.contains(&index) {
                successors.push((*handler, EdgeKind::Exception));
            }
        }

        for (to, kind) in successors {
            edges.push(Edge {
                from: index,
                to,
                kind,
            });
            if !visited[to] {
                worklist.push(to);
            }
        }
    }

    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MethodBuilder;
    use crate::class::AccessFlags;
    use crate::instructions::Instruction;
    use crate::opcodes::Opcode;

    #[test]
    fn test_branch_edges() {
        let mut b = MethodBuilder::new("A", "m", "(I)V", AccessFlags::PUBLIC);
        let done = b.new_label();
        b.iload(1).jump(Opcode::IFEQ, done).op(Opcode::NOP);
        b.place(done).op(Opcode::RETURN);
        let method = b.build().unwrap();

        let mut edges = control_flow_edges(&method).unwrap();
        edges.sort_by_key(|e| (e.from, e.to));
        assert_eq!(
            edges,
            vec![
                Edge { from: 0, to: 1, kind: EdgeKind::FallThrough },
                Edge { from: 1, to: 2, kind: EdgeKind::FallThrough },
                Edge { from: 1, to: 3, kind: EdgeKind::Jump },
                Edge { from: 2, to: 3, kind: EdgeKind::FallThrough },
                Edge { from: 3, to: 4, kind: EdgeKind::FallThrough },
            ]
        );
    }

    #[test]
    fn test_unreachable_code_has_no_edges() {
        let mut method = Method::new("m", "()V", AccessFlags::PUBLIC);
        method.instructions = vec![
            Instruction::Simple(Opcode::RETURN),
            Instruction::Simple(Opcode::NOP),
            Instruction::Simple(Opcode::RETURN),
        ];
        assert!(control_flow_edges(&method).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_bodies() {
        let mut method = Method::new("m", "()V", AccessFlags::PUBLIC);
        method.instructions = vec![Instruction::Simple(Opcode::NOP)];
        assert_eq!(
            control_flow_edges(&method),
            Err(FlowError::FallsOffEnd { index: 0 })
        );

        method.instructions = vec![Instruction::Jump {
            opcode: Opcode::GOTO,
            target: LabelId(9),
        }];
        assert_eq!(
            control_flow_edges(&method),
            Err(FlowError::UndefinedLabel {
                index: 0,
                label: LabelId(9)
            })
        );

        method.instructions = vec![
            Instruction::Label(LabelId(1)),
            Instruction::Label(LabelId(1)),
            Instruction::Simple(Opcode::RETURN),
        ];
        assert!(matches!(
            control_flow_edges(&method),
            Err(FlowError::DuplicateLabel { .. })
        ));
    }
}
