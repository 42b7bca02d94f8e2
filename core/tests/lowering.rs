use javelin_core::ast::{AstNode, AstNodeKind, BinaryOperator, ClassKind, Flags, Param, build};
use javelin_core::ir::lower::translate_unit;
use javelin_core::ir::op::{BinOpcode, Instr, Terminator};
use javelin_core::ir::value::{BlockId, IrType};
use javelin_core::ir::{Function, IrModule, verify_module};
use javelin_core::{ClassTable, Lang, Options, Type};

fn lower_static_method(name: &str, params: Vec<Param>, ret: Type, body: Vec<AstNode>) -> IrModule {
    let method = build::method_decl(name, Flags::statik(), params, ret, build::block(body));
    let class = build::class_decl("demo.T", ClassKind::Class, Flags::none(), None, vec![method]);
    let unit = AstNode::synthetic(AstNodeKind::CompilationUnit { package: None, decls: vec![class] });
    let ts = ClassTable::bootstrap();
    let module = translate_unit(&unit, "T", &Lang::new(), &ts, &Options::default()).unwrap();
    verify_module(&module).unwrap();
    module
}

fn only_function<'m>(module: &'m IrModule, prefix: &str) -> &'m Function {
    module
        .functions
        .iter()
        .find(|f| f.name.starts_with(prefix))
        .unwrap_or_else(|| panic!("no function {}", prefix))
}

fn cond_br(func: &Function, block: BlockId) -> (BlockId, BlockId) {
    match &func.blocks[block.0].terminator {
        Some(Terminator::CondBr { if_true, if_false, .. }) => (*if_true, *if_false),
        other => panic!("block {} ends with {:?}", func.blocks[block.0].label, other),
    }
}

fn label(func: &Function, block: BlockId) -> &str {
    &func.blocks[block.0].label
}

fn bools(names: &[&str]) -> Vec<Param> {
    names.iter().map(|n| Param::new(*n, Type::boolean())).collect()
}

fn ret(value: AstNode) -> AstNode {
    AstNode::synthetic(AstNodeKind::Return { value: Some(Box::new(value)) })
}

#[test]
fn nested_and_or_condition_branches_without_evaluating_eagerly() {
    let b = |n: &str| build::local(n, Type::boolean());
    let inner = build::binary(b("b"), BinaryOperator::CondOr, b("c"), Type::boolean());
    let cond = build::binary(b("a"), BinaryOperator::CondAnd, inner, Type::boolean());
    let branch = AstNode::synthetic(AstNodeKind::If {
        condition: Box::new(cond),
        then_branch: Box::new(ret(build::int_lit(1))),
        else_branch: None,
    });
    let module = lower_static_method("f", bools(&["a", "b", "c"]), Type::int(), vec![branch, ret(build::int_lit(0))]);
    let f = only_function(&module, "demo.T.f(");

    // a: true -> test b, false -> skip the branch
    let (a_true, a_false) = cond_br(f, BlockId(0));
    assert!(label(f, a_true).starts_with("and.rhs"));
    assert!(label(f, a_false).starts_with("if.end"));

    // b: true -> branch taken, false -> test c
    let (b_true, b_false) = cond_br(f, a_true);
    assert!(label(f, b_true).starts_with("if.then"));
    assert!(label(f, b_false).starts_with("or.rhs"));

    // c decides between the same two targets
    assert_eq!(cond_br(f, b_false), (b_true, a_false));

    let eager = f.instructions().any(|i| {
        matches!(i, Instr::BinOp { op: BinOpcode::And | BinOpcode::Or, .. })
    });
    assert!(!eager);
}

#[test]
fn logical_operator_as_value_goes_through_a_slot() {
    let b = |n: &str| build::local(n, Type::boolean());
    let either = build::binary(b("a"), BinaryOperator::CondOr, b("b"), Type::boolean());
    let module = lower_static_method("g", bools(&["a", "b"]), Type::boolean(), vec![ret(either)]);
    let g = only_function(&module, "demo.T.g(");

    let labels: Vec<_> = g.blocks.iter().map(|b| b.label.as_str()).collect();
    assert!(labels.iter().any(|l| l.starts_with("cond.true")));
    assert!(labels.iter().any(|l| l.starts_with("cond.false")));
    let end = g.blocks.iter().find(|b| b.label.starts_with("cond.end")).unwrap();
    assert!(matches!(end.instrs.last(), Some(Instr::Load { ty: IrType::I1, .. })));
    assert!(matches!(end.terminator, Some(Terminator::Ret { value: Some((IrType::I1, _)) })));
}

#[test]
fn constant_condition_jumps_directly() {
    let branch = AstNode::synthetic(AstNodeKind::If {
        condition: Box::new(build::bool_lit(true)),
        then_branch: Box::new(ret(build::int_lit(1))),
        else_branch: None,
    });
    let module = lower_static_method("k", vec![], Type::int(), vec![branch, ret(build::int_lit(0))]);
    let k = only_function(&module, "demo.T.k(");
    match &k.blocks[0].terminator {
        Some(Terminator::Br { target }) => assert!(label(k, *target).starts_with("if.then")),
        other => panic!("expected an unconditional branch, got {:?}", other),
    }
}

#[test]
fn comparison_selects_signed_predicate_for_int() {
    let lt = build::binary(build::local("x", Type::int()), BinaryOperator::Lt, build::local("y", Type::int()), Type::boolean());
    let params = vec![Param::new("x", Type::int()), Param::new("y", Type::int())];
    let module = lower_static_method("lt", params, Type::boolean(), vec![ret(lt)]);
    let text = module.to_string();
    assert!(text.contains("icmp slt i32"), "{}", text);
}

#[test]
fn static_fields_become_globals() {
    let field = build::field_decl("count", Flags::statik(), Type::long(), None);
    let class = build::class_decl("demo.G", ClassKind::Class, Flags::none(), None, vec![field]);
    let unit = AstNode::synthetic(AstNodeKind::CompilationUnit { package: None, decls: vec![class] });
    let ts = ClassTable::bootstrap();
    let module = translate_unit(&unit, "G", &Lang::new(), &ts, &Options::default()).unwrap();
    let global = module.global("demo.G.count").unwrap();
    assert_eq!(global.ty, IrType::I64);
    assert!(module.class("demo.G").unwrap().fields.is_empty());
}
