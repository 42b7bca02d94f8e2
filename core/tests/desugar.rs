use std::path::PathBuf;

use javelin_core::ast::visit::walk;
use javelin_core::ast::{AstNode, AstNodeKind, ClassKind, CtorCallKind, Flags, Param, build};
use javelin_core::desugar::DesugarPipeline;
use javelin_core::error::{ErrorCode, JavelinErrorExt};
use javelin_core::types::{ClassInfo, OBJECT_CLASS, TypeSystem};
use javelin_core::{ClassTable, JobId, Job, Lang, Type};

fn job_with(decls: Vec<AstNode>) -> Job {
    let mut job = Job::new(JobId(0), PathBuf::from("demo/A.java"));
    job.ast = Some(AstNode::synthetic(AstNodeKind::CompilationUnit { package: Some("demo".into()), decls }));
    job
}

fn desugar(decls: Vec<AstNode>) -> Vec<AstNode> {
    let mut job = job_with(decls);
    let mut ts = ClassTable::bootstrap();
    DesugarPipeline::new().run(&mut job, &mut ts, &Lang::new()).unwrap();
    match job.ast.map(|a| a.kind) {
        Some(AstNodeKind::CompilationUnit { decls, .. }) => decls,
        other => panic!("expected a compilation unit, got {:?}", other),
    }
}

fn class_named<'a>(decls: &'a [AstNode], name: &str) -> &'a AstNode {
    decls
        .iter()
        .find(|d| d.kind.class_name() == Some(name))
        .unwrap_or_else(|| panic!("no class {}", name))
}

fn members(class: &AstNode) -> &[AstNode] {
    match &class.kind {
        AstNodeKind::ClassDecl { members, .. } => members,
        _ => panic!("not a class"),
    }
}

fn field_names(class: &AstNode) -> Vec<&str> {
    members(class)
        .iter()
        .filter_map(|m| match &m.kind {
            AstNodeKind::FieldDecl { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect()
}

fn ctor(class: &AstNode) -> (&[Param], &[AstNode]) {
    members(class)
        .iter()
        .find_map(|m| match &m.kind {
            AstNodeKind::ConstructorDecl { params, body, .. } => match &body.kind {
                AstNodeKind::Block { statements } => Some((params.as_slice(), statements.as_slice())),
                _ => None,
            },
            _ => None,
        })
        .expect("class has a constructor")
}

fn method<'a>(class: &'a AstNode, wanted: &str) -> &'a AstNode {
    members(class)
        .iter()
        .find(|m| matches!(&m.kind, AstNodeKind::MethodDecl { name, .. } if name == wanted))
        .unwrap_or_else(|| panic!("no method {}", wanted))
}

fn simple_class() -> AstNode {
    build::class_decl("demo.A", ClassKind::Class, Flags::none(), None, vec![])
}

#[test]
fn pipeline_runs_at_most_once_per_job() {
    let mut job = job_with(vec![simple_class()]);
    let mut ts = ClassTable::bootstrap();
    let lang = Lang::new();
    let mut pipeline = DesugarPipeline::new();

    pipeline.run(&mut job, &mut ts, &lang).unwrap();
    assert!(pipeline.has_run("A"));
    let err = pipeline.run(&mut job, &mut ts, &lang).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NonIdempotentRerun);
    assert!(job.ast.is_some());
}

#[test]
fn missing_library_type_fails_before_any_rewrite() {
    let mut job = job_with(vec![simple_class()]);
    let before = job.ast.as_ref().map(AstNode::id);
    let mut ts = ClassTable::bootstrap();
    ts.remove_class("support.Helper");
    let lang = Lang::new();
    let mut pipeline = DesugarPipeline::new();

    let err = pipeline.run(&mut job, &mut ts, &lang).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingLibraryType);
    assert!(err.message().contains("support.Helper"));
    assert_eq!(job.ast.as_ref().map(AstNode::id), before);
    assert!(!pipeline.has_run("A"));

    // Nothing was consumed, so the job can still be desugared.
    ts.declare_class(ClassInfo::new("support.Helper", Some(OBJECT_CLASS)));
    pipeline.run(&mut job, &mut ts, &lang).unwrap();
}

#[test]
fn library_type_with_missing_superclass_counts_as_missing() {
    let mut job = job_with(vec![simple_class()]);
    let mut ts = ClassTable::bootstrap();
    ts.remove_class("java.lang.Throwable");
    let err = DesugarPipeline::new().run(&mut job, &mut ts, &Lang::new()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingLibraryType);
}

#[test]
fn field_initializers_move_into_constructor_and_clinit() {
    let class = build::class_decl(
        "demo.A",
        ClassKind::Class,
        Flags::none(),
        None,
        vec![
            build::field_decl("x", Flags::none(), Type::int(), Some(build::int_lit(1))),
            build::field_decl("count", Flags::statik(), Type::int(), Some(build::int_lit(2))),
        ],
    );
    let decls = desugar(vec![class]);
    let a = class_named(&decls, "demo.A");

    let (params, body) = ctor(a);
    assert!(params.is_empty());
    assert!(matches!(
        &body[0].kind,
        AstNodeKind::ConstructorCall { call_kind: CtorCallKind::Super, owner, .. } if owner == OBJECT_CLASS
    ));
    assert!(matches!(&body[1].kind, AstNodeKind::ExprStmt { .. }));
    assert_eq!(body.len(), 2);

    for m in members(a) {
        if let AstNodeKind::FieldDecl { init, .. } = &m.kind {
            assert!(init.is_none());
        }
    }
    let clinit = method(a, "$clinit");
    match &clinit.kind {
        AstNodeKind::MethodDecl { flags, body: Some(body), .. } => {
            assert!(flags.is_static);
            assert!(matches!(&body.kind, AstNodeKind::Block { statements } if statements.len() == 1));
        }
        _ => panic!("bad $clinit"),
    }
    assert_eq!(field_names(a), vec!["x", "count", "class$"]);
}

#[test]
fn inner_class_gets_outer_instance_and_is_flattened() {
    let outer_ty = Type::class("demo.Outer");
    let inner_ty = Type::class("demo.Outer$Inner");
    let outer_this = AstNode::synthetic(AstNodeKind::Special { qualifier: Some("demo.Outer".into()) })
        .typed(outer_ty.clone());
    let get = build::method_decl(
        "get",
        Flags::none(),
        vec![],
        outer_ty.clone(),
        build::block(vec![AstNode::synthetic(AstNodeKind::Return { value: Some(Box::new(outer_this)) })]),
    );
    let inner = build::class_decl("demo.Outer$Inner", ClassKind::Class, Flags::none(), None, vec![get]);
    let make = build::method_decl(
        "make",
        Flags::none(),
        vec![],
        inner_ty,
        build::block(vec![AstNode::synthetic(AstNodeKind::Return {
            value: Some(Box::new(build::new_object("demo.Outer$Inner", vec![], vec![]))),
        })]),
    );
    let outer = build::class_decl("demo.Outer", ClassKind::Class, Flags::none(), None, vec![inner, make]);

    let decls = desugar(vec![outer]);
    let names: Vec<_> = decls.iter().filter_map(|d| d.kind.class_name()).collect();
    assert_eq!(names, vec!["demo.Outer", "demo.Outer$Inner"]);

    let outer = class_named(&decls, "demo.Outer");
    assert!(members(outer).iter().all(|m| m.kind.class_name().is_none()));

    let inner = class_named(&decls, "demo.Outer$Inner");
    assert!(field_names(inner).contains(&"this$0"));
    let (params, body) = ctor(inner);
    assert_eq!(params[0].name, "this$0");
    assert_eq!(params[0].ty, outer_ty);
    assert!(matches!(&body[0].kind, AstNodeKind::ConstructorCall { call_kind: CtorCallKind::Super, .. }));
    assert!(matches!(&body[1].kind, AstNodeKind::ExprStmt { .. }));

    // `Outer.this` inside the inner class reads the field.
    let mut reads = Vec::new();
    walk(method(inner, "get"), &mut |n| {
        if let AstNodeKind::Field { name, .. } = &n.kind {
            reads.push(name.clone());
        }
    });
    assert_eq!(reads, vec!["this$0".to_string()]);

    // `new Inner()` inside the outer class passes `this`.
    let mut creations = Vec::new();
    walk(method(outer, "make"), &mut |n| {
        if let AstNodeKind::New { ctor_params, args, .. } = &n.kind {
            creations.push((ctor_params.clone(), args.iter().map(|a| a.kind.clone()).collect::<Vec<_>>()));
        }
    });
    assert_eq!(creations.len(), 1);
    assert_eq!(creations[0].0, vec![outer_ty]);
    assert!(matches!(&creations[0].1[..], [AstNodeKind::Special { qualifier: None }]));
}

#[test]
fn anonymous_class_is_named_hoisted_and_captures_locals() {
    let n = || build::local("n", Type::int());
    let f = build::method_decl(
        "f",
        Flags::none(),
        vec![],
        Type::int(),
        build::block(vec![AstNode::synthetic(AstNodeKind::Return { value: Some(Box::new(n())) })]),
    );
    let body = build::class_decl("", ClassKind::Class, Flags::none(), None, vec![f]);
    let created = AstNode::synthetic(AstNodeKind::New {
        class: OBJECT_CLASS.into(),
        ctor_params: vec![],
        args: vec![],
        body: Some(Box::new(body)),
    })
    .typed(Type::class(OBJECT_CLASS));
    let run = build::method_decl(
        "run",
        Flags::none(),
        vec![Param::new("n", Type::int())],
        Type::Void,
        build::block(vec![AstNode::synthetic(AstNodeKind::LocalDecl {
            name: "r".into(),
            var_ty: Type::class(OBJECT_CLASS),
            init: Some(Box::new(created)),
        })]),
    );
    let a = build::class_decl("demo.A", ClassKind::Class, Flags::none(), None, vec![run]);

    let decls = desugar(vec![a]);
    let names: Vec<_> = decls.iter().filter_map(|d| d.kind.class_name()).collect();
    assert_eq!(names, vec!["demo.A", "demo.A$1"]);

    let anon = class_named(&decls, "demo.A$1");
    match &anon.kind {
        AstNodeKind::ClassDecl { superclass, flags, .. } => {
            assert_eq!(superclass.as_deref(), Some(OBJECT_CLASS));
            assert!(!flags.is_static);
        }
        _ => unreachable!(),
    }
    let fields = field_names(anon);
    assert!(fields.contains(&"this$0"));
    assert!(fields.contains(&"capture$n"));
    assert!(fields.contains(&"class$"));
    let (params, _) = ctor(anon);
    let param_names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(param_names, vec!["this$0", "capture$n"]);

    let mut creations = Vec::new();
    walk(method(class_named(&decls, "demo.A"), "run"), &mut |node| {
        if let AstNodeKind::New { class, args, body, .. } = &node.kind {
            assert!(body.is_none());
            creations.push((class.clone(), args.len()));
        }
    });
    assert_eq!(creations, vec![("demo.A$1".to_string(), 2)]);

    // The captured local is read from the field inside the class body.
    let mut locals = Vec::new();
    walk(method(anon, "f"), &mut |node| {
        if let AstNodeKind::Local { name } = &node.kind {
            locals.push(name.clone());
        }
    });
    assert!(locals.is_empty());
}

#[test]
fn enums_become_final_classes_with_values() {
    let constant = |name: &str| {
        AstNode::synthetic(AstNodeKind::EnumConstant { name: name.into(), ctor_params: vec![], args: vec![] })
    };
    let color = build::class_decl(
        "demo.Color",
        ClassKind::Enum,
        Flags::none(),
        None,
        vec![constant("RED"), constant("GREEN")],
    );
    let decls = desugar(vec![color]);
    let color = class_named(&decls, "demo.Color");
    match &color.kind {
        AstNodeKind::ClassDecl { class_kind, flags, superclass, .. } => {
            assert_eq!(*class_kind, ClassKind::Class);
            assert!(flags.is_final);
            assert_eq!(superclass.as_deref(), Some("java.lang.Enum"));
        }
        _ => unreachable!(),
    }
    assert_eq!(field_names(color), vec!["RED", "GREEN", "$VALUES", "class$"]);

    let (params, body) = ctor(color);
    let param_names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(param_names, vec!["$name", "$ordinal"]);
    assert!(matches!(
        &body[0].kind,
        AstNodeKind::ConstructorCall { call_kind: CtorCallKind::Super, owner, args, .. }
            if owner == "java.lang.Enum" && args.len() == 2
    ));

    match &method(color, "$clinit").kind {
        AstNodeKind::MethodDecl { body: Some(body), .. } => match &body.kind {
            AstNodeKind::Block { statements } => assert_eq!(statements.len(), 3),
            _ => panic!("$clinit body is not a block"),
        },
        _ => panic!("bad $clinit"),
    }
}

#[test]
fn desugared_classes_are_declared_in_the_type_system() {
    let inner = build::class_decl("demo.Outer$Inner", ClassKind::Class, Flags::none(), None, vec![]);
    let outer = build::class_decl("demo.Outer", ClassKind::Class, Flags::none(), None, vec![inner]);
    let mut job = job_with(vec![outer]);
    let mut ts = ClassTable::bootstrap();
    DesugarPipeline::new().run(&mut job, &mut ts, &Lang::new()).unwrap();

    let info = ts.type_for_name("demo.Outer$Inner").unwrap();
    assert!(info.fields.iter().any(|f| f.name == "this$0"));
    let ctor = info.methods.iter().find(|m| m.name == "<init>").unwrap();
    assert_eq!(ctor.params, vec![Type::class("demo.Outer")]);
}

#[test]
fn broken_qualified_this_chain_is_reported() {
    let bogus = AstNode::synthetic(AstNodeKind::Special { qualifier: Some("demo.Elsewhere".into()) })
        .typed(Type::class("demo.Elsewhere"));
    let m = build::method_decl("m", Flags::none(), vec![], Type::Void, build::block(vec![build::expr_stmt(bogus)]));
    let a = build::class_decl("demo.A", ClassKind::Class, Flags::none(), None, vec![m]);
    let mut job = job_with(vec![a]);
    let mut ts = ClassTable::bootstrap();
    assert!(DesugarPipeline::new().run(&mut job, &mut ts, &Lang::new()).is_err());
}
