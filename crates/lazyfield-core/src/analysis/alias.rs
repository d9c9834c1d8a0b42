use super::cfg::{BlockId, ControlFlowGraph};
use std::collections::HashSet;

/// A local variable slot holding a copy of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Alias {
    pub slot: u16,
    pub block: BlockId,
    /// Index of the field read that produced the value.
    pub read_index: usize,
    /// Index of the store into `slot`.
    pub store_index: usize,
}

/// Finds the local a field was copied into, searching a block and then its predecessors.
pub struct AliasResolver<'g> {
    cfg: &'g ControlFlowGraph,
    visited: HashSet<BlockId>,
    visit_order: Vec<BlockId>,
}

impl<'g> AliasResolver<'g> {
    pub fn new(cfg: &'g ControlFlowGraph) -> Self {
        Self {
            cfg,
            visited: HashSet::new(),
            visit_order: Vec::new(),
        }
    }

    /// Looks for `getfield/getstatic <field>` immediately followed by a local store.
    ///
    /// The first predecessor path that yields an alias wins. Each block is scanned at most once
    /// per call, so cyclic graphs terminate.
    pub fn find_alias(&mut self, field: &str, start: BlockId) -> Option<Alias> {
        self.visited.clear();
        self.visit_order.clear();

        let mut stack = vec![start];
        while let Some(block) = stack.pop() {
            if !self.visited.insert(block) {
                continue;
            }
            self.visit_order.push(block);

            if let Some(alias) = self.scan_block(field, block) {
                return Some(alias);
            }

            let preds: Vec<BlockId> = self.cfg.predecessors(block).collect();
            for pred in preds.into_iter().rev() {
                if !self.visited.contains(&pred) {
                    stack.push(pred);
                }
            }
        }

        None
    }

    /// Blocks scanned by the last call to [`AliasResolver::find_alias`], in order.
    pub fn visited(&self) -> &[BlockId] {
        &self.visit_order
    }

    fn scan_block(&self, field: &str, block: BlockId) -> Option<Alias> {
        self.cfg
            .block_instructions(block)
            .filter(|(_, inst)| inst.reads_field(field))
            .find_map(|(read_index, _)| {
                let store_index = self.cfg.next_real(read_index)?;
                let slot = self.cfg.instruction(store_index)?.store_slot()?;
                Some(Alias {
                    slot,
                    block,
                    read_index,
                    store_index,
                })
            })
    }
}
