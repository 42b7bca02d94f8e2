use std::fs;
use std::path::PathBuf;

use javelin_core::ast::{AstNode, AstNodeKind, BinaryOperator, ClassKind, Flags, Param, build};
use javelin_core::error::{ErrorCode, JavelinErrorExt};
use javelin_core::frontend::CompilationUnitFile;
use javelin_core::ir::op::{BinOpcode, CastOp, Instr};
use javelin_core::ir::value::IrType;
use javelin_core::ir::{IrModule, MemoryEmitter};
use javelin_core::scheduler::{GoalKey, GoalKind, GoalStatus};
use javelin_core::{ClassTable, Compiler, MemoryFrontend, Options, Scheduler, Type, generate_error_report};

fn unit(decls: Vec<AstNode>) -> CompilationUnitFile {
    CompilationUnitFile {
        source: None,
        classes: vec![],
        ast: AstNode::synthetic(AstNodeKind::CompilationUnit { package: Some("demo".into()), decls }),
    }
}

fn ret(value: AstNode) -> AstNode {
    AstNode::synthetic(AstNodeKind::Return { value: Some(Box::new(value)) })
}

/// `class Calc { static long sum(long x, int y) { return x + y; } }`
fn calc_unit() -> CompilationUnitFile {
    let sum = build::binary(build::local("x", Type::long()), BinaryOperator::Add, build::local("y", Type::int()), Type::long());
    let method = build::method_decl(
        "sum",
        Flags::statik(),
        vec![Param::new("x", Type::long()), Param::new("y", Type::int())],
        Type::long(),
        build::block(vec![ret(sum)]),
    );
    unit(vec![build::class_decl("demo.Calc", ClassKind::Class, Flags::none(), None, vec![method])])
}

fn scheduler_with(units: Vec<(&str, CompilationUnitFile)>, options: Options) -> Scheduler {
    let mut frontend = MemoryFrontend::new();
    for (path, unit) in units {
        frontend.add_unit(path, unit);
    }
    Scheduler::new(Box::new(ClassTable::bootstrap()), Box::new(frontend), Box::new(MemoryEmitter::default()), options)
}

fn module_of(s: &Scheduler, job: javelin_core::JobId) -> &IrModule {
    s.job(job).and_then(|j| j.module.as_ref()).expect("job has a module")
}

#[test]
fn long_plus_int_sign_extends_then_adds_i64() {
    let mut s = scheduler_with(vec![("demo/Calc.java", calc_unit())], Options::default());
    let job = s.add_job("demo/Calc.java");
    let out = s.compile_job(job).unwrap();
    assert_eq!(out, PathBuf::from("demo/Calc.ll"));

    let module = module_of(&s, job);
    let sum = module.function("demo.Calc.sum(long,int)").expect("sum is lowered");
    let instrs: Vec<&Instr> = sum.instructions().collect();
    let cast = instrs
        .iter()
        .position(|i| matches!(i, Instr::Cast { op: CastOp::SExt, from: IrType::I32, to: IrType::I64, .. }))
        .expect("int operand is sign-extended");
    let add = instrs
        .iter()
        .position(|i| matches!(i, Instr::BinOp { op: BinOpcode::Add, ty: IrType::I64, .. }))
        .expect("add is done in i64");
    assert!(cast < add);

    for kind in [GoalKind::Parsed, GoalKind::TypeChecked, GoalKind::Serialized, GoalKind::Desugared, GoalKind::CodeGenerated, GoalKind::Emitted] {
        let id = s.lookup(&GoalKey::new(job, kind)).unwrap();
        assert_eq!(s.status(id), Some(GoalStatus::Succeeded));
    }
}

#[test]
fn compiling_twice_reuses_succeeded_goals() {
    let mut s = scheduler_with(vec![("demo/Calc.java", calc_unit())], Options::default());
    let job = s.add_job("demo/Calc.java");
    s.compile_job(job).unwrap();
    s.compile_job(job).unwrap();
    let desugared = s.lookup(&GoalKey::new(job, GoalKind::Desugared)).unwrap();
    assert_eq!(s.goal(desugared).unwrap().attempts, 1);
}

#[test]
fn entry_point_gets_a_main_shim() {
    let main = build::method_decl(
        "main",
        Flags::statik(),
        vec![Param::new("args", Type::array_of(Type::string()))],
        Type::Void,
        build::block(vec![]),
    );
    let app = unit(vec![build::class_decl("demo.App", ClassKind::Class, Flags::none(), None, vec![main])]);
    let options = Options { entry_point: Some("demo.App".into()), ..Options::default() };
    let mut s = scheduler_with(vec![("demo/App.java", app)], options);
    let job = s.add_job("demo/App.java");
    s.compile_job(job).unwrap();

    let shim = module_of(&s, job).function("main").expect("main shim");
    assert_eq!(shim.ret, IrType::I32);
    let callees: Vec<&str> = shim
        .instructions()
        .filter_map(|i| match i {
            Instr::Call { callee, .. } => Some(callee.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(callees.last(), Some(&"demo.App.main(java.lang.String[])"));
}

#[test]
fn class_declared_by_another_job_is_parsed_on_demand() {
    let a = unit(vec![build::class_decl("demo.A", ClassKind::Class, Flags::none(), None, vec![])]);
    let use_a = build::method_decl(
        "take",
        Flags::statik(),
        vec![Param::new("a", Type::class("demo.A"))],
        Type::Void,
        build::block(vec![build::expr_stmt(build::local("a", Type::class("demo.A")))]),
    );
    let b = unit(vec![build::class_decl("demo.B", ClassKind::Class, Flags::none(), None, vec![use_a])]);

    let mut s = scheduler_with(vec![("demo/A.java", a), ("demo/B.java", b)], Options::default());
    let job_a = s.add_job("demo/A.java");
    let job_b = s.add_job("demo/B.java");
    s.compile_job(job_b).unwrap();

    let checked = s.lookup(&GoalKey::new(job_b, GoalKind::TypeChecked)).unwrap();
    let parsed_a = s.lookup(&GoalKey::new(job_a, GoalKind::Parsed)).unwrap();
    assert_eq!(s.goal(checked).unwrap().attempts, 2);
    assert!(s.goal(checked).unwrap().prerequisites.contains(&parsed_a));
    assert_eq!(s.status(parsed_a), Some(GoalStatus::Succeeded));
    assert!(s.lookup(&GoalKey::new(job_a, GoalKind::Emitted)).is_none());
}

#[test]
fn unresolvable_class_fails_the_job() {
    let broken = build::method_decl(
        "m",
        Flags::statik(),
        vec![],
        Type::Void,
        build::block(vec![build::expr_stmt(AstNode::synthetic(AstNodeKind::NullLit).typed(Type::class("demo.Nowhere")))]),
    );
    let u = unit(vec![build::class_decl("demo.C", ClassKind::Class, Flags::none(), None, vec![broken])]);
    let mut s = scheduler_with(vec![("demo/C.java", u)], Options::default());
    let job = s.add_job("demo/C.java");
    let err = s.compile_job(job).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Frontend);
    assert!(err.message().contains("demo.Nowhere"), "{}", err.message());

    let checked_key = GoalKey::new(job, GoalKind::TypeChecked);
    assert_eq!(err.root.as_ref(), Some(&checked_key));
    assert_eq!(err.goal, Some(GoalKey::new(job, GoalKind::Emitted)));
    let checked = s.lookup(&checked_key).unwrap();
    assert_eq!(s.status(checked), Some(GoalStatus::Failed));
}

#[test]
fn missing_library_type_is_reported_with_its_goal() {
    let mut ts = ClassTable::bootstrap();
    ts.remove_class("support.Helper");
    let mut frontend = MemoryFrontend::new();
    frontend.add_unit("demo/Calc.java", calc_unit());
    let mut s = Scheduler::new(Box::new(ts), Box::new(frontend), Box::new(MemoryEmitter::default()), Options::default());
    let job = s.add_job("demo/Calc.java");

    let err = s.compile_job(job).unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingLibraryType);
    let report = generate_error_report(&err);
    assert!(report.contains("support.Helper"), "{}", report);
    assert!(report.contains("Desugared"), "{}", report);

    // A later attempt reports the same cause.
    let again = s.compile_job(job).unwrap_err();
    assert_eq!(again.code(), ErrorCode::MissingLibraryType);
    assert!(again.message().contains("support.Helper"));
}

#[test]
fn json_units_are_compiled_to_text_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("Calc.json");
    fs::write(&input, serde_json::to_string(&calc_unit()).unwrap()).unwrap();

    let out_dir = dir.path().join("out");
    let options = Options { output_dir: Some(out_dir.clone()), ..Options::default() };
    let mut compiler = Compiler::new(options);
    compiler.add_input(&input);
    let results = compiler.compile_all();
    assert_eq!(results.len(), 1);
    let written = results[0].1.as_ref().unwrap();
    assert_eq!(written, &out_dir.join("Calc.json.ll"));

    let text = fs::read_to_string(written).unwrap();
    assert!(text.contains("add i64"), "{}", text);
    assert!(text.contains("sext i32"), "{}", text);
}

#[test]
fn missing_input_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut compiler = Compiler::new(Options::default());
    compiler.add_input(dir.path().join("Missing.json"));
    let results = compiler.compile_all();
    assert!(results[0].1.is_err());
    assert!(compiler.report().iter().any(|r| r.status == GoalStatus::Failed));
}
