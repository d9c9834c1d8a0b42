use super::alias::Alias;
use super::cfg::{BlockId, ControlFlowGraph};
use crate::instructions::FieldRef;
use crate::opcodes::Opcode;
use std::collections::HashSet;

/// The program-order-last write to a field within one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveWrite {
    pub index: usize,
    pub block: BlockId,
    pub field: FieldRef,
}

pub fn effective_write(field: &str, cfg: &ControlFlowGraph) -> Option<EffectiveWrite> {
    cfg.blocks()
        .flat_map(|block| {
            cfg.block_instructions(block.id)
                .filter_map(move |(index, inst)| {
                    inst.field_write()
                        .filter(|write| write.name == field)
                        .map(|write| (index, block.id, write))
                })
        })
        .max_by_key(|(index, _, _)| *index)
        .map(|(index, block, write)| EffectiveWrite {
            index,
            block,
            field: write.clone(),
        })
}

/// Checks that the value stored by a write is deterministic.
pub struct WriteVerifier<'g> {
    cfg: &'g ControlFlowGraph,
    class_name: &'g str,
}

impl<'g> WriteVerifier<'g> {
    pub fn new(cfg: &'g ControlFlowGraph, class_name: &'g str) -> Self {
        Self { cfg, class_name }
    }

    /// Returns the indices of the instructions that produce a non-deterministic value.
    ///
    /// When the written value comes from the alias slot, the stores into that slot are checked
    /// instead of the load. The store that copies the field itself is not a new value and is
    /// skipped.
    pub fn verify(&self, write: &EffectiveWrite, alias: Option<&Alias>) -> Vec<usize> {
        let Some(source) = self.cfg.previous_real(write.index) else {
            return vec![write.index];
        };

        let alias = alias.filter(|alias| {
            self.cfg.instruction(source).and_then(|inst| inst.load_slot()) == Some(alias.slot)
        });
        let Some(alias) = alias else {
            return self.check_source(source, write.index).into_iter().collect();
        };

        let stores = self.stores_reaching(alias.slot, write.index, write.block);
        if stores.is_empty() {
            return vec![source];
        }

        stores
            .into_iter()
            .filter(|&store| store != alias.store_index)
            .filter_map(|store| {
                let origin = self.cfg.previous_real(store);
                match origin {
                    Some(origin) => self.check_source(origin, store),
                    None => Some(store),
                }
            })
            .collect()
    }

    /// `Some(index)` of the offending instruction when `source` does not push a deterministic
    /// value for the instruction at `consumer`.
    fn check_source(&self, source: usize, consumer: usize) -> Option<usize> {
        let Some(inst) = self.cfg.instruction(source) else {
            return Some(consumer);
        };
        if inst.pushed_constant().is_some() {
            return None;
        }
        if let Some((opcode, method)) = inst.invoked() {
            let dispatch_ok = matches!(
                opcode,
                Opcode::INVOKEVIRTUAL | Opcode::INVOKESPECIAL | Opcode::INVOKESTATIC
            );
            if dispatch_ok && method.owner == self.class_name && method.parameter_count() == Some(0)
            {
                return None;
            }
        }
        Some(source)
    }

    /// Nearest store to `slot` before `before` in `block`, otherwise the last store in each
    /// predecessor path.
    fn stores_reaching(&self, slot: u16, before: usize, block: BlockId) -> Vec<usize> {
        if let Some(store) = self.last_store(slot, block, Some(before)) {
            return vec![store];
        }

        let mut found = Vec::new();
        let mut visited = HashSet::from([block]);
        let mut stack: Vec<BlockId> = self.cfg.predecessors(block).collect();
        while let Some(pred) = stack.pop() {
            if !visited.insert(pred) {
                continue;
            }
            match self.last_store(slot, pred, None) {
                Some(store) => found.push(store),
                None => stack.extend(self.cfg.predecessors(pred)),
            }
        }
        found.sort_unstable();
        found
    }

    fn last_store(&self, slot: u16, block: BlockId, before: Option<usize>) -> Option<usize> {
        self.cfg
            .block_instructions(block)
            .rev()
            .filter(|(index, _)| before.map_or(true, |limit| *index < limit))
            .find(|(_, inst)| inst.store_slot() == Some(slot))
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::alias::AliasResolver;
    use crate::builder::MethodBuilder;
    use crate::class::AccessFlags;
    use crate::class::Method;

    fn graph(method: &Method) -> ControlFlowGraph {
        ControlFlowGraph::build("A", method)
    }

    #[test]
    fn test_last_write_wins() {
        let mut b = MethodBuilder::new("A", "m", "()V", AccessFlags::PUBLIC);
        let next = b.new_label();
        b.aload(0).iconst(1).putfield("x", "I");
        b.place(next)
            .aload(0)
            .iconst(2)
            .putfield("x", "I")
            .aload(0)
            .iconst(3)
            .putfield("y", "I")
            .op(Opcode::RETURN);
        let cfg = graph(&b.build().unwrap());

        let write = effective_write("x", &cfg).unwrap();
        assert_eq!(write.index, 6);
        assert_eq!(write.block, BlockId(1));
        assert!(effective_write("z", &cfg).is_none());
    }

    #[test]
    fn test_deterministic_sources() {
        let mut b = MethodBuilder::new("A", "m", "()V", AccessFlags::PUBLIC);
        b.aload(0)
            .aload(0)
            .invoke_self("compute", "()I")
            .putfield("x", "I")
            .aload(0)
            .aload(0)
            .invoke_self("scaled", "(I)I")
            .putfield("y", "I")
            .aload(0)
            .invoke(Opcode::INVOKESTATIC, "java/lang/System", "nanoTime", "()J")
            .putfield("z", "J")
            .aload(0)
            .int(Opcode::BIPUSH, 42)
            .putfield("w", "I")
            .op(Opcode::RETURN);
        let cfg = graph(&b.build().unwrap());
        let verifier = WriteVerifier::new(&cfg, "A");

        let check = |field: &str| verifier.verify(&effective_write(field, &cfg).unwrap(), None);
        assert!(check("x").is_empty());
        assert_eq!(check("y"), vec![6]);
        assert_eq!(check("z"), vec![9]);
        assert!(check("w").is_empty());
    }

    #[test]
    fn test_value_through_alias_is_traced_to_its_store() {
        let mut b = MethodBuilder::new("A", "get", "()I", AccessFlags::PUBLIC);
        let done = b.new_label();
        b.aload(0)
            .getfield("x", "I")
            .istore(1)
            .iload(1)
            .jump(Opcode::IFNE, done)
            .invoke(Opcode::INVOKESTATIC, "other/Clock", "now", "()I")
            .istore(1)
            .aload(0)
            .iload(1)
            .putfield("x", "I");
        b.place(done).iload(1).op(Opcode::IRETURN);
        let cfg = graph(&b.build().unwrap());

        let write = effective_write("x", &cfg).unwrap();
        let alias = AliasResolver::new(&cfg).find_alias("x", write.block).unwrap();
        let verifier = WriteVerifier::new(&cfg, "A");
        assert_eq!(verifier.verify(&write, Some(&alias)), vec![5]);
    }

    #[test]
    fn test_write_back_of_alias_is_not_a_new_value() {
        let mut b = MethodBuilder::new("A", "m", "()V", AccessFlags::PUBLIC);
        b.aload(0)
            .getfield("x", "I")
            .istore(1)
            .aload(0)
            .iload(1)
            .putfield("x", "I")
            .op(Opcode::RETURN);
        let cfg = graph(&b.build().unwrap());
        let write = effective_write("x", &cfg).unwrap();
        let alias = AliasResolver::new(&cfg).find_alias("x", write.block);
        assert!(WriteVerifier::new(&cfg, "A")
            .verify(&write, alias.as_ref())
            .is_empty());
    }

    #[test]
    fn test_write_at_block_start_is_unverifiable() {
        let mut b = MethodBuilder::new("A", "m", "(Z)V", AccessFlags::PUBLIC);
        let other = b.new_label();
        let join = b.new_label();
        b.aload(0)
            .iload(1)
            .jump(Opcode::IFEQ, other)
            .iconst(1)
            .jump(Opcode::GOTO, join);
        b.place(other).iconst(2);
        b.place(join).putfield("x", "I").op(Opcode::RETURN);
        let cfg = graph(&b.build().unwrap());
        let write = effective_write("x", &cfg).unwrap();
        assert_eq!(WriteVerifier::new(&cfg, "A").verify(&write, None), vec![write.index]);
    }
}
