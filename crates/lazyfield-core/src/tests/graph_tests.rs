use crate::analysis::{AliasResolver, BlockId, ControlFlowGraph};
use crate::builder::MethodBuilder;
use crate::class::{AccessFlags, Method};
use crate::instructions::{Instruction, LabelId};
use crate::opcodes::Opcode;
use pretty_assertions::assert_eq;

fn assert_partition_covers(method: &Method) {
    let cfg = ControlFlowGraph::build("Shapes", method);
    let mut next = 0;
    for block in cfg.partition() {
        assert_eq!(block.start(), next, "gap or overlap before {}", block.id);
        assert!(!block.is_empty());
        for index in block.indices() {
            assert_eq!(cfg.block_for(index), Some(block.id));
        }
        next = block.end();
    }
    assert_eq!(next, method.instructions.len());
}

fn switch_method() -> Method {
    let mut b = MethodBuilder::new("Shapes", "pick", "(I)I", AccessFlags::PUBLIC);
    let (one, two, other) = (b.new_label(), b.new_label(), b.new_label());
    b.iload(1).table_switch(1, 2, other, vec![one, two]);
    b.place(one).iconst(10).op(Opcode::IRETURN);
    b.place(two).iconst(20).op(Opcode::IRETURN);
    b.place(other).iconst(0).op(Opcode::IRETURN);
    b.build().unwrap()
}

fn try_catch_method() -> Method {
    let mut b = MethodBuilder::new("Shapes", "safe", "()I", AccessFlags::PUBLIC);
    let start = b.mark();
    let end = b.new_label();
    let handler = b.new_label();
    b.aload(0).invoke_self("risky", "()I").op(Opcode::IRETURN);
    b.place(end);
    b.place(handler).op(Opcode::POP).iconst(-1).op(Opcode::IRETURN);
    b.try_catch(start, end, handler, Some("java/lang/Exception"));
    b.build().unwrap()
}

fn loop_method() -> Method {
    let mut b = MethodBuilder::new("Shapes", "count", "(I)I", AccessFlags::PUBLIC);
    let head = b.new_label();
    let exit = b.new_label();
    b.iconst(0).istore(2);
    b.place(head)
        .iload(2)
        .iload(1)
        .jump(Opcode::IF_ICMPGE, exit)
        .iinc(2, 1)
        .jump(Opcode::GOTO, head);
    b.place(exit).iload(2).op(Opcode::IRETURN);
    b.build().unwrap()
}

#[test]
fn test_partition_invariant() {
    for method in [switch_method(), try_catch_method(), loop_method()] {
        assert_partition_covers(&method);
    }

    let mut labels_only = Method::new("m", "()V", AccessFlags::PUBLIC);
    labels_only.instructions = vec![
        Instruction::Label(LabelId(0)),
        Instruction::Label(LabelId(1)),
        Instruction::LineNumber {
            line: 1,
            start: LabelId(1),
        },
        Instruction::Label(LabelId(2)),
        Instruction::Simple(Opcode::RETURN),
        Instruction::Label(LabelId(3)),
    ];
    assert_partition_covers(&labels_only);
    let cfg = ControlFlowGraph::build("m", &labels_only);
    assert_eq!(cfg.partition().len(), 2);
    assert_eq!(cfg.blocks().count(), 1);
}

#[test]
fn test_switch_edges() {
    let cfg = ControlFlowGraph::build("Shapes", &switch_method());
    let mut succs: Vec<_> = cfg.successors(BlockId(0)).collect();
    succs.sort();
    assert_eq!(succs, vec![BlockId(1), BlockId(2), BlockId(3)]);
    for target in 1..=3 {
        assert_eq!(
            cfg.predecessors(BlockId(target)).collect::<Vec<_>>(),
            vec![BlockId(0)]
        );
    }
}

#[test]
fn test_exception_handler_is_reachable() {
    let cfg = ControlFlowGraph::build("Shapes", &try_catch_method());
    let handler_block = cfg.block_for(6).unwrap();
    assert!(cfg.predecessors(handler_block).any(|pred| pred == BlockId(0)));
    assert!(cfg.flow_error().is_none());
}

#[test]
fn test_loop_back_edge_and_alias_termination() {
    let cfg = ControlFlowGraph::build("Shapes", &loop_method());
    let head = cfg.block_for(3).unwrap();
    let preds: Vec<_> = cfg.predecessors(head).collect();
    assert_eq!(preds, vec![BlockId(0), head]);

    let mut resolver = AliasResolver::new(&cfg);
    for block in cfg.blocks() {
        assert!(resolver.find_alias("missing", block.id).is_none());
        let visited = resolver.visited();
        for (i, id) in visited.iter().enumerate() {
            assert!(!visited[..i].contains(id));
        }
    }
}

#[test]
fn test_building_twice_gives_identical_graphs() {
    let method = loop_method();
    let first = ControlFlowGraph::build("Shapes", &method);
    let second = ControlFlowGraph::build("Shapes", &method);
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(first.partition(), second.partition());
}
