use super::flow::{self, EdgeKind, FlowError};
use crate::class::Method;
use crate::instructions::{Instruction, LabelId};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "block{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockLabel {
    Label(LabelId),
    /// The method does not begin with a label.
    Pseudo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    pub id: BlockId,
    pub label: BlockLabel,
    pub range: Range<usize>,
    pub predecessors: IndexSet<BlockId>,
    pub successors: IndexSet<BlockId>,
    has_code: bool,
}

impl BasicBlock {
    fn new(id: BlockId, label: BlockLabel, start: usize) -> Self {
        Self {
            id,
            label,
            range: start..start,
            predecessors: IndexSet::new(),
            successors: IndexSet::new(),
            has_code: false,
        }
    }

    pub fn covers(&self, index: usize) -> bool {
        self.range.contains(&index)
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// True when the block holds only labels and line numbers.
    pub fn is_label_only(&self) -> bool {
        !self.has_code
    }

    pub fn indices(&self) -> Range<usize> {
        self.range.clone()
    }
}

/// Basic blocks of one method plus the edges between them.
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    method_name: String,
    instructions: Vec<Instruction>,
    partition: Vec<BasicBlock>,
    block_of: Vec<BlockId>,
    flow_error: Option<FlowError>,
}

impl ControlFlowGraph {
    /// Partitions `method` into blocks and links them.
    ///
    /// A body the flow pass cannot follow yields the blocks without any edges.
    pub fn build(class_name: &str, method: &Method) -> Self {
        let (mut partition, block_of) = partition(&method.instructions);

        let flow_error = match flow::control_flow_edges(method) {
            Ok(edges) => {
                for edge in edges {
                    let from = block_of[edge.from];
                    let to = block_of[edge.to];
                    if from != to || edge.kind != EdgeKind::FallThrough {
                        partition[from.0 as usize].successors.insert(to);
                        partition[to.0 as usize].predecessors.insert(from);
                    }
                }
                None
            }
            Err(error) => {
                warn!(
                    class = class_name,
                    method = %method.signature(),
                    %error,
                    "control flow analysis failed, continuing without edges"
                );
                Some(error)
            }
        };

        let dropped: Vec<BlockId> = partition
            .iter()
            .filter(|block| block.is_label_only())
            .map(|block| block.id)
            .collect();
        for block in &mut partition {
            for id in &dropped {
                block.predecessors.shift_remove(id);
                block.successors.shift_remove(id);
            }
        }

        debug!(
            class = class_name,
            method = %method.signature(),
            blocks = partition.len() - dropped.len(),
            label_only = dropped.len(),
            "built control flow graph"
        );

        Self {
            method_name: method.name.clone(),
            instructions: method.instructions.clone(),
            partition,
            block_of,
            flow_error,
        }
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Every block, including label-only ones. The ranges cover the instruction stream exactly.
    pub fn partition(&self) -> &[BasicBlock] {
        &self.partition
    }

    /// Blocks that contain at least one real instruction.
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> + '_ {
        self.partition.iter().filter(|block| !block.is_label_only())
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.partition.get(id.0 as usize)
    }

    pub fn block_for(&self, index: usize) -> Option<BlockId> {
        self.block_of.get(index).copied()
    }

    pub fn entry(&self) -> Option<BlockId> {
        self.block_for(0)
    }

    pub fn predecessors(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.block(id)
            .into_iter()
            .flat_map(|block| block.predecessors.iter().copied())
    }

    pub fn successors(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.block(id)
            .into_iter()
            .flat_map(|block| block.successors.iter().copied())
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn instruction(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Instructions of a block paired with their method-wide index.
    pub fn block_instructions(
        &self,
        id: BlockId,
    ) -> impl DoubleEndedIterator<Item = (usize, &Instruction)> + '_ {
        let range = self.block(id).map(BasicBlock::indices).unwrap_or(0..0);
        range.map(move |index| (index, &self.instructions[index]))
    }

    /// Block holding the position of `label`.
    pub fn label_block(&self, label: LabelId) -> Option<BlockId> {
        let index = self
            .instructions
            .iter()
            .position(|inst| matches!(inst, Instruction::Label(l) if *l == label))?;
        self.block_for(index)
    }

    /// Nearest real instruction before `index` in the same block.
    pub fn previous_real(&self, index: usize) -> Option<usize> {
        let block = self.block(self.block_for(index)?)?;
        (block.start()..index)
            .rev()
            .find(|&i| !self.instructions[i].is_pseudo())
    }

    /// Nearest real instruction after `index` in the same block.
    pub fn next_real(&self, index: usize) -> Option<usize> {
        let block = self.block(self.block_for(index)?)?;
        (index + 1..block.end()).find(|&i| !self.instructions[i].is_pseudo())
    }

    pub fn flow_error(&self) -> Option<&FlowError> {
        self.flow_error.as_ref()
    }

    pub fn has_edges(&self) -> bool {
        self.partition
            .iter()
            .any(|block| !block.successors.is_empty())
    }
}

/// Splits the stream at labels. A run of labels and line numbers opens a single block.
fn partition(instructions: &[Instruction]) -> (Vec<BasicBlock>, Vec<BlockId>) {
    let mut blocks: Vec<BasicBlock> = Vec::new();
    let mut block_of = Vec::with_capacity(instructions.len());

    for (index, inst) in instructions.iter().enumerate() {
        let opens_block = match (blocks.last_mut(), inst) {
            (None, Instruction::Label(label)) => Some(BlockLabel::Label(*label)),
            (None, _) => Some(BlockLabel::Pseudo),
            (Some(current), Instruction::Label(label)) if current.has_code => {
                Some(BlockLabel::Label(*label))
            }
            // A line number ahead of the first label still leaves that label naming the block.
            (Some(current), Instruction::Label(label)) if current.label == BlockLabel::Pseudo => {
                current.label = BlockLabel::Label(*label);
                None
            }
            _ => None,
        };

        if let Some(label) = opens_block {
            let id = BlockId(blocks.len() as u32);
            blocks.push(BasicBlock::new(id, label, index));
        }

        if let Some(current) = blocks.last_mut() {
            current.range.end = index + 1;
            current.has_code |= !inst.is_pseudo();
            block_of.push(current.id);
        }
    }

    (blocks, block_of)
}
