use javelin_core::ast::visit::walk;
use javelin_core::ast::{AstNode, AstNodeKind, BinaryOperator, NodeTag, build};
use javelin_core::dispatch::NodeBehavior;
use javelin_core::{Lang, Type};

#[test]
fn string_concatenation_becomes_concat_call() {
    let lang = Lang::new();
    let expr = build::binary(build::string_lit("n = "), BinaryOperator::Add, build::int_lit(4), Type::string());
    let out = lang.remove_string_literals(expr);

    let AstNodeKind::Call { target: Some(target), owner, name, args, .. } = &out.kind else {
        panic!("expected a call, got {:?}", out.kind);
    };
    assert_eq!(owner, "java.lang.String");
    assert_eq!(name, "concat");
    assert!(matches!(&target.kind, AstNodeKind::New { class, .. } if class == "java.lang.String"));
    assert!(matches!(&args[0].kind, AstNodeKind::Call { name, target: None, .. } if name == "valueOf"));
    assert_eq!(out.ty, Some(Type::string()));

    let mut literals = 0;
    walk(&out, &mut |n| {
        if matches!(n.kind, AstNodeKind::StringLit { .. }) {
            literals += 1;
        }
    });
    assert_eq!(literals, 0);
}

#[test]
fn string_literal_becomes_char_array_construction() {
    let lang = Lang::new();
    let out = lang.remove_string_literals(build::string_lit("hi"));
    let AstNodeKind::New { class, args, .. } = &out.kind else {
        panic!("expected a new expression");
    };
    assert_eq!(class, "java.lang.String");
    let AstNodeKind::ArrayInit { elements, .. } = &args[0].kind else {
        panic!("expected a char array");
    };
    let units: Vec<_> = elements
        .iter()
        .map(|e| match e.kind {
            AstNodeKind::CharLit { value } => value,
            _ => panic!("not a char"),
        })
        .collect();
    assert_eq!(units, vec![u16::from(b'h'), u16::from(b'i')]);
}

#[test]
fn numeric_addition_widens_the_narrower_operand() {
    let lang = Lang::new();
    let sum = build::binary(
        build::local("x", Type::long()),
        BinaryOperator::Add,
        build::local("y", Type::int()),
        Type::long(),
    );
    let out = lang.add_primitive_widening_casts(sum);
    let AstNodeKind::Binary { left, right, .. } = &out.kind else {
        panic!("expected a binary node");
    };
    assert!(matches!(left.kind, AstNodeKind::Local { .. }));
    assert!(matches!(&right.kind, AstNodeKind::Cast { target, .. } if *target == Type::long()));
}

#[test]
fn matching_operands_are_left_alone() {
    let lang = Lang::new();
    let sum = build::binary(build::local("a", Type::int()), BinaryOperator::Mul, build::local("b", Type::int()), Type::int());
    let id = sum.id();
    assert_eq!(lang.add_primitive_widening_casts(sum).id(), id);
}

struct BumpIntegers;

impl NodeBehavior for BumpIntegers {
    fn remove_string_literals(&self, node: AstNode) -> AstNode {
        match node.kind {
            AstNodeKind::IntLit { value } => build::int_lit(value + 1),
            _ => node,
        }
    }
}

#[test]
fn overridden_behavior_replaces_the_hook() {
    let mut lang = Lang::new();
    let previous = lang.override_behavior(NodeTag::IntLit, Box::new(BumpIntegers));
    assert!(previous.is_some());

    let out = lang.remove_string_literals(build::expr_stmt(build::int_lit(41)));
    let AstNodeKind::ExprStmt { expr } = &out.kind else {
        panic!("expected an expression statement");
    };
    assert!(matches!(expr.kind, AstNodeKind::IntLit { value: 42 }));

    if let Some(original) = previous {
        lang.override_behavior(NodeTag::IntLit, original);
    }
    let out = lang.remove_string_literals(build::int_lit(1));
    assert!(matches!(out.kind, AstNodeKind::IntLit { value: 1 }));
}
