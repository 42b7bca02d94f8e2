//! Java-like source rendering of an AST, used by `--dump-desugared` and by
//! `{:?}` on nodes.

use std::fmt::{self, Write};

use super::kind::{AstNodeKind, ClassKind, CtorCallKind, Flags, Param, UnaryOperator};
use super::node::AstNode;

struct Printer<'a, 'b> {
    out: &'a mut fmt::Formatter<'b>,
    indent: usize,
}

impl Printer<'_, '_> {
    fn line(&mut self, text: &str) -> fmt::Result {
        for _ in 0..self.indent {
            self.out.write_str("    ")?;
        }
        self.out.write_str(text)?;
        self.out.write_char('\n')
    }

    fn flags(flags: &Flags) -> String {
        let mut s = String::new();
        if flags.is_public {
            s.push_str("public ");
        }
        if flags.is_static {
            s.push_str("static ");
        }
        if flags.is_final {
            s.push_str("final ");
        }
        s
    }

    fn params(params: &[Param]) -> String {
        params.iter().map(|p| format!("{} {}", p.ty, p.name)).collect::<Vec<_>>().join(", ")
    }

    fn body(&mut self, header: &str, body: &AstNode) -> fmt::Result {
        self.line(&format!("{} {{", header))?;
        self.indent += 1;
        match &body.kind {
            AstNodeKind::Block { statements } => {
                for s in statements {
                    self.stmt(s)?;
                }
            }
            _ => self.stmt(body)?,
        }
        self.indent -= 1;
        self.line("}")
    }

    fn stmt(&mut self, node: &AstNode) -> fmt::Result {
        match &node.kind {
            AstNodeKind::CompilationUnit { package, decls } => {
                if let Some(p) = package {
                    self.line(&format!("package {};", p))?;
                }
                for d in decls {
                    self.stmt(d)?;
                }
                Ok(())
            }
            AstNodeKind::ClassDecl { name, class_kind, flags, superclass, interfaces, members } => {
                let keyword = match class_kind {
                    ClassKind::Class => "class",
                    ClassKind::Interface => "interface",
                    ClassKind::Enum => "enum",
                };
                let mut header = format!("{}{} {}", Self::flags(flags), keyword, name);
                if let Some(sup) = superclass {
                    header.push_str(&format!(" extends {}", sup));
                }
                if !interfaces.is_empty() {
                    header.push_str(&format!(" implements {}", interfaces.join(", ")));
                }
                self.line(&format!("{} {{", header))?;
                self.indent += 1;
                for m in members {
                    self.stmt(m)?;
                }
                self.indent -= 1;
                self.line("}")
            }
            AstNodeKind::FieldDecl { name, flags, field_ty, init } => match init {
                Some(init) => self.line(&format!("{}{} {} = {};", Self::flags(flags), field_ty, name, expr(init))),
                None => self.line(&format!("{}{} {};", Self::flags(flags), field_ty, name)),
            },
            AstNodeKind::MethodDecl { name, flags, params, ret, body } => {
                let header = format!("{}{} {}({})", Self::flags(flags), ret, name, Self::params(params));
                match body {
                    Some(body) => self.body(&header, body),
                    None => self.line(&format!("{};", header)),
                }
            }
            AstNodeKind::ConstructorDecl { flags, params, body } => {
                self.body(&format!("{}<init>({})", Self::flags(flags), Self::params(params)), body)
            }
            AstNodeKind::Initializer { is_static, body } => {
                self.body(if *is_static { "static" } else { "" }, body)
            }
            AstNodeKind::EnumConstant { name, args, .. } => self.line(&format!("{}({}),", name, exprs(args))),
            AstNodeKind::LocalClassDecl { class } => self.stmt(class),
            AstNodeKind::Block { .. } => self.body("", node),
            AstNodeKind::LocalDecl { name, var_ty, init } => match init {
                Some(init) => self.line(&format!("{} {} = {};", var_ty, name, expr(init))),
                None => self.line(&format!("{} {};", var_ty, name)),
            },
            AstNodeKind::If { condition, then_branch, else_branch } => {
                self.body(&format!("if ({})", expr(condition)), then_branch)?;
                if let Some(e) = else_branch {
                    self.body("else", e)?;
                }
                Ok(())
            }
            AstNodeKind::While { condition, body } => self.body(&format!("while ({})", expr(condition)), body),
            AstNodeKind::Return { value } => match value {
                Some(v) => self.line(&format!("return {};", expr(v))),
                None => self.line("return;"),
            },
            AstNodeKind::ExprStmt { expr: e } => self.line(&format!("{};", expr(e))),
            AstNodeKind::ConstructorCall { call_kind, args, .. } => {
                let kw = match call_kind {
                    CtorCallKind::Super => "super",
                    CtorCallKind::This => "this",
                };
                self.line(&format!("{}({});", kw, exprs(args)))
            }
            _ => self.line(&format!("{};", expr(node))),
        }
    }
}

fn exprs(nodes: &[AstNode]) -> String {
    nodes.iter().map(expr).collect::<Vec<_>>().join(", ")
}

fn expr(node: &AstNode) -> String {
    match &node.kind {
        AstNodeKind::Binary { left, op, right } => format!("({} {} {})", expr(left), op.symbol(), expr(right)),
        AstNodeKind::Unary { op, expr: e } => {
            let sym = match op {
                UnaryOperator::Neg => "-",
                UnaryOperator::Plus => "+",
                UnaryOperator::Not => "!",
                UnaryOperator::BitNot => "~",
            };
            format!("{}{}", sym, expr(e))
        }
        AstNodeKind::Cast { target, expr: e } => format!("(({}) {})", target, expr(e)),
        AstNodeKind::Assign { target, value } => format!("{} = {}", expr(target), expr(value)),
        AstNodeKind::Local { name } => name.clone(),
        AstNodeKind::Field { target, owner, name } => match target {
            Some(t) => format!("{}.{}", expr(t), name),
            None => format!("{}.{}", owner, name),
        },
        AstNodeKind::Call { target, owner, name, args, .. } => match target {
            Some(t) => format!("{}.{}({})", expr(t), name, exprs(args)),
            None => format!("{}.{}({})", owner, name, exprs(args)),
        },
        AstNodeKind::New { class, args, body, .. } => match body {
            Some(_) => format!("new {}({}) {{ ... }}", class, exprs(args)),
            None => format!("new {}({})", class, exprs(args)),
        },
        AstNodeKind::Special { qualifier: Some(q) } => format!("{}.this", q),
        AstNodeKind::Special { qualifier: None } => "this".to_string(),
        AstNodeKind::ArrayInit { elem_ty, elements } => format!("new {}[] {{ {} }}", elem_ty, exprs(elements)),
        AstNodeKind::IntLit { value } => value.to_string(),
        AstNodeKind::LongLit { value } => format!("{}L", value),
        AstNodeKind::FloatLit { value } => format!("{:?}f", value),
        AstNodeKind::DoubleLit { value } => format!("{:?}", value),
        AstNodeKind::CharLit { value } => match char::from_u32(u32::from(*value)) {
            Some(c) if !c.is_control() => format!("'{}'", c),
            _ => format!("'\\u{:04x}'", value),
        },
        AstNodeKind::BoolLit { value } => value.to_string(),
        AstNodeKind::StringLit { value } => format!("{:?}", value),
        AstNodeKind::NullLit => "null".to_string(),
        other => format!("<{}>", other.tag()),
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_expression() {
            return f.write_str(&expr(self));
        }
        let mut p = Printer { out: f, indent: 0 };
        p.stmt(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::build;
    use crate::ast::kind::BinaryOperator;
    use crate::types::Type;

    #[test]
    fn prints_expressions_inline() {
        let e = build::binary(build::local("x", Type::long()), BinaryOperator::Add, build::int_lit(1), Type::long());
        assert_eq!(e.to_string(), "(x + 1)");
    }

    #[test]
    fn prints_statements_with_indentation() {
        let b = build::block(vec![build::expr_stmt(build::assign(build::local("x", Type::int()), build::int_lit(2)))]);
        assert_eq!(b.to_string(), " {\n    x = 2;\n}\n");
    }
}
